//! Graph data acquisition from the backend.
//!
//! [`GraphSource`] tracks one opaque context identifier and keeps the last
//! successfully fetched [`GraphDocument`] alongside loading/error status.
//! Requests carry a generation ticket; a response whose ticket is not the
//! latest issued generation is discarded, so state always reflects the order
//! requests were issued in, never the order responses arrived.
//!
//! The WASM transport uses gloo-net plus a shared result queue polled each
//! frame. Native builds have no transport: an issued request resolves to a
//! failure on the next poll. The state machine itself is transport-free and
//! fully testable off the wire.

use lemma_graph_core::GraphDocument;
use thiserror::Error;
use tracing::debug;

/// Why a fetch failed. All variants recover into [`GraphSource`]'s error
/// state; none abort the renderer.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered outside the 2xx range.
    #[error("server returned HTTP {0}")]
    Status(u16),
    /// The body did not match the graph document schema.
    #[error("malformed graph document: {0}")]
    Malformed(String),
}

/// Observable request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No request in flight; data (if any) is current.
    #[default]
    Idle,
    /// A request is in flight; prior data is retained meanwhile.
    Loading,
    /// The latest request failed; prior data is retained.
    Error,
}

/// Generation token for one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Result of one finished request, tagged with its ticket.
pub type FetchOutcome = (FetchTicket, Result<GraphDocument, FetchError>);

/// Shared arrival queue for finished fetch results.
pub type SharedOutcomes = std::rc::Rc<std::cell::RefCell<Vec<FetchOutcome>>>;

/// Context-driven graph document source.
pub struct GraphSource {
    context_id: Option<String>,
    data: Option<GraphDocument>,
    status: FetchStatus,
    error: Option<String>,
    /// Latest issued request generation; the stale-response guard.
    generation: u64,
    /// Bumped on every successful data replacement. Document identity for
    /// the renderer.
    revision: u64,
    outcomes: SharedOutcomes,
}

impl Default for GraphSource {
    fn default() -> Self {
        Self {
            context_id: None,
            data: None,
            status: FetchStatus::Idle,
            error: None,
            generation: 0,
            revision: 0,
            outcomes: std::rc::Rc::new(std::cell::RefCell::new(Vec::new())),
        }
    }
}

impl GraphSource {
    /// Create a source with no target context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The context currently observed, if any.
    pub fn context_id(&self) -> Option<&str> {
        self.context_id.as_deref()
    }

    /// The last successfully fetched document. Retained across loading and
    /// failed requests so the host never flickers back to an empty surface.
    pub fn data(&self) -> Option<&GraphDocument> {
        self.data.as_ref()
    }

    /// Current request state.
    pub fn status(&self) -> FetchStatus {
        self.status
    }

    /// Human-readable description of the last failure, if status is Error.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// Monotonic counter identifying the current document. Changes exactly
    /// when the data is replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Observe a (possibly unchanged) context identifier.
    ///
    /// A transition to a new non-null value issues exactly one request and
    /// returns its ticket. Re-setting the current value is a no-op. Setting
    /// `None` issues nothing and supersedes anything in flight; retained
    /// data stays available.
    pub fn set_context(&mut self, context_id: Option<&str>) -> Option<FetchTicket> {
        match context_id {
            Some(id) if self.context_id.as_deref() == Some(id) => None,
            Some(id) => {
                self.context_id = Some(id.to_string());
                Some(self.issue())
            }
            None => {
                if self.context_id.take().is_some() {
                    // invalidate any in-flight response for the old context
                    self.generation += 1;
                    self.status = FetchStatus::Idle;
                    self.error = None;
                }
                None
            }
        }
    }

    /// Manually re-issue the request for the current context. No-op when no
    /// context is set.
    pub fn refetch(&mut self) -> Option<FetchTicket> {
        self.context_id.is_some().then(|| self.issue())
    }

    /// Apply the outcome of a finished request.
    ///
    /// Returns false (discarding the outcome) when the ticket has been
    /// superseded by a newer request or a context change. On success the
    /// document is replaced and the revision bumped; on failure prior data
    /// is kept and only status/error change.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        result: Result<GraphDocument, FetchError>,
    ) -> bool {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "discarding stale fetch response"
            );
            return false;
        }
        match result {
            Ok(document) => {
                self.data = Some(document);
                self.revision += 1;
                self.status = FetchStatus::Idle;
                self.error = None;
            }
            Err(err) => {
                self.status = FetchStatus::Error;
                self.error = Some(err.to_string());
            }
        }
        true
    }

    fn issue(&mut self) -> FetchTicket {
        self.generation += 1;
        self.status = FetchStatus::Loading;
        self.error = None;
        let ticket = FetchTicket(self.generation);
        debug!(ticket = ticket.0, context = ?self.context_id, "issuing graph fetch");
        #[cfg(target_arch = "wasm32")]
        self.spawn_fetch(ticket);
        // No transport natively: the request resolves to an immediate
        // failure on the next poll instead of loading forever.
        #[cfg(not(target_arch = "wasm32"))]
        self.outcomes.borrow_mut().push((
            ticket,
            Err(FetchError::Network(
                "fetch not available in native mode".to_string(),
            )),
        ));
        ticket
    }

    /// Drain arrived responses and apply them in arrival order. Returns true
    /// if any outcome was accepted (the host should re-render).
    pub fn poll(&mut self) -> bool {
        let arrived: Vec<FetchOutcome> = self.outcomes.borrow_mut().drain(..).collect();
        let mut changed = false;
        for (ticket, result) in arrived {
            changed |= self.apply(ticket, result);
        }
        changed
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn_fetch(&self, ticket: FetchTicket) {
        let Some(context_id) = self.context_id.clone() else {
            return;
        };
        let outcomes = self.outcomes.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = fetch_document(&context_id).await;
            outcomes.borrow_mut().push((ticket, result));
        });
    }
}

/// Fetch and parse one graph document from the backend.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_document(context_id: &str) -> Result<GraphDocument, FetchError> {
    use gloo_net::http::Request;

    let url = format!("/api/v1/viz/graph/{context_id}");
    let resp = Request::get(&url)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))
}

/// Fetch one graph document (native stub).
#[cfg(not(target_arch = "wasm32"))]
pub async fn fetch_document(_context_id: &str) -> Result<GraphDocument, FetchError> {
    Err(FetchError::Network(
        "fetch not available in native mode".to_string(),
    ))
}

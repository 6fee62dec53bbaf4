//! WASM-compatible egui renderer for Lemma-Graph knowledge graphs.
//!
//! Turns a fetched [`lemma_graph_core::GraphDocument`] into pixels with a
//! fixed visual encoding (centrality-scaled sizes, threshold-gated labels,
//! log-scaled edge thickness) and runs:
//! - Natively (via eframe)
//! - In the browser (via WASM)

mod app;
pub mod encode;
pub mod sample;
pub mod session;
pub mod source;

pub use app::LemmaGraphApp;
pub use encode::{EdgeVisuals, NodeVisuals, ScatterRng};
pub use session::{RenderSession, SessionSlot};
pub use source::{FetchError, FetchStatus, FetchTicket, GraphSource};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Start the visualization app in WASM context.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    // Better panic messages in the browser console
    console_error_panic_hook::set_once();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        eframe::WebRunner::new()
            .start(
                "lemma-graph-canvas",
                web_options,
                Box::new(|cc| Ok(Box::new(LemmaGraphApp::new(cc)))),
            )
            .await
            .expect("Failed to start eframe");
    });
}

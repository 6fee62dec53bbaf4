//! Main application state and frame loop.
//!
//! The app wires the two engine halves together: a [`GraphSource`] feeding
//! documents and a [`SessionSlot`] holding the one live render session for
//! the central panel surface. The session is rebuilt exactly when the
//! document revision changes and torn down when the document goes away.

use eframe::{App, CreationContext};
use egui::{CollapsingHeader, Color32, Context, RichText};

use crate::encode::ScatterRng;
use crate::session::SessionSlot;
use crate::source::{FetchStatus, GraphSource};

/// The knowledge-graph viewer application.
pub struct LemmaGraphApp {
    /// Backend document source.
    source: GraphSource,
    /// The single render-session handle for the central surface.
    slot: SessionSlot,
    /// Coordinate source for nodes without supplied positions.
    rng: ScatterRng,
    /// Last document revision committed to the slot.
    seen_revision: u64,
    /// Context identifier being edited in the sidebar.
    context_input: String,
    /// Whether to show the sidebar.
    show_sidebar: bool,
    /// Current dark mode state.
    dark_mode: bool,
}

impl LemmaGraphApp {
    /// Create the app. In the browser an initial context id may be supplied
    /// through a window global; natively a sample document is shown until a
    /// backend is available.
    pub fn new(cc: &CreationContext<'_>) -> Self {
        let dark_mode = cc.egui_ctx.style().visuals.dark_mode;
        let mut app = Self {
            source: GraphSource::new(),
            slot: SessionSlot::default(),
            rng: ScatterRng::default(),
            seen_revision: 0,
            context_input: String::new(),
            show_sidebar: true,
            dark_mode,
        };

        #[cfg(target_arch = "wasm32")]
        if let Some(context_id) = Self::initial_context_from_window() {
            app.context_input = context_id.clone();
            app.source.set_context(Some(&context_id));
        }

        #[cfg(not(target_arch = "wasm32"))]
        app.slot
            .rebuild(&crate::sample::create_sample_document(), &mut app.rng);

        app
    }

    #[cfg(target_arch = "wasm32")]
    fn initial_context_from_window() -> Option<String> {
        let window = web_sys::window()?;
        let value = js_sys::Reflect::get(&window, &"LEMMA_GRAPH_CONTEXT".into()).ok()?;
        value.as_string()
    }

    /// Commit source changes to the render slot.
    fn sync_session(&mut self) {
        if self.source.revision() == self.seen_revision {
            return;
        }
        self.seen_revision = self.source.revision();
        match self.source.data() {
            Some(document) => self.slot.rebuild(document, &mut self.rng),
            None => self.slot.clear(),
        }
    }
}

// =============================================================================
// Sidebar Panel UI
// =============================================================================

impl LemmaGraphApp {
    fn info_icon(ui: &mut egui::Ui, tip: &str) {
        ui.add_space(4.0);
        ui.small_button("ℹ").on_hover_text(tip);
    }

    fn ui_context(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Context")
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label("id:");
                    ui.text_edit_singleline(&mut self.context_input);
                    Self::info_icon(ui, "Identifier of the analyzed text to load");
                });

                ui.horizontal(|ui| {
                    if ui.button("Load").clicked() {
                        let trimmed = self.context_input.trim().to_string();
                        if trimmed.is_empty() {
                            self.source.set_context(None);
                        } else {
                            self.source.set_context(Some(&trimmed));
                        }
                    }

                    let can_refetch = self.source.context_id().is_some();
                    ui.add_enabled_ui(can_refetch, |ui| {
                        if ui.button("Refetch").clicked() {
                            self.source.refetch();
                        }
                    });
                });

                ui.separator();
                match self.source.status() {
                    FetchStatus::Loading => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("loading…");
                        });
                    }
                    FetchStatus::Error => {
                        let message = self.source.error_message().unwrap_or("fetch failed");
                        ui.label(
                            RichText::new(format!("⚠ {message}"))
                                .color(Color32::from_rgb(255, 100, 100)),
                        );
                    }
                    FetchStatus::Idle => match self.source.context_id() {
                        Some(id) => {
                            ui.label(format!("context: {id}"));
                        }
                        None => {
                            ui.label(RichText::new("no context set").color(Color32::GRAY));
                        }
                    },
                }
            });
    }

    fn ui_info(&self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Graph Info")
            .default_open(true)
            .show(ui, |ui| match self.slot.active() {
                Some(session) => {
                    ui.label(format!("Nodes: {}", session.node_count()));
                    ui.label(format!("Edges: {}", session.edge_count()));

                    let report = session.sanitize_report();
                    if !report.is_clean() {
                        ui.label(
                            RichText::new(format!(
                                "⚠ dropped {} nodes, {} edges (malformed)",
                                report.dropped_nodes, report.dropped_edges
                            ))
                            .small()
                            .color(Color32::from_rgb(255, 200, 50)),
                        );
                    }
                }
                None => {
                    ui.label(RichText::new("no graph loaded").color(Color32::GRAY));
                }
            });
    }

    fn ui_style(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Style").show(ui, |ui| {
            ui.horizontal(|ui| {
                let mut dark = ui.ctx().style().visuals.dark_mode;
                if ui.checkbox(&mut dark, "dark mode").changed() {
                    if dark {
                        ui.ctx().set_visuals(egui::Visuals::dark());
                    } else {
                        ui.ctx().set_visuals(egui::Visuals::light());
                    }
                    self.dark_mode = dark;
                }
            });
        });
    }

    /// Error banner drawn over the retained graph: a stale graph plus a
    /// visible error beats a blank surface.
    fn draw_error_banner(&self, ui: &mut egui::Ui) {
        let Some(message) = self.source.error_message() else {
            return;
        };
        let rect = ui.max_rect();
        let pos = egui::pos2(rect.left() + 10.0, rect.top() + 10.0);

        egui::Area::new(egui::Id::new("fetch_error_banner"))
            .order(egui::Order::Foreground)
            .fixed_pos(pos)
            .movable(false)
            .show(ui.ctx(), |ui| {
                egui::Frame::new()
                    .fill(Color32::from_rgba_unmultiplied(80, 0, 0, 200))
                    .corner_radius(4.0)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(format!("⚠ {message}"))
                                .color(Color32::from_rgb(255, 180, 180)),
                        );
                    });
            });
    }
}

// =============================================================================
// Main Update Loop
// =============================================================================

impl App for LemmaGraphApp {
    fn update(&mut self, ctx: &Context, _: &mut eframe::Frame) {
        self.source.poll();
        self.sync_session();

        // Keep polling while a request is in flight
        if self.source.is_loading() {
            ctx.request_repaint();
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Tab) {
                self.show_sidebar = !self.show_sidebar;
            }
        });

        if self.show_sidebar {
            egui::SidePanel::right("right_panel")
                .default_width(260.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.heading("Lemma Graph");
                        ui.separator();

                        self.ui_context(ui);
                        ui.separator();

                        self.ui_info(ui);
                        ui.separator();

                        self.ui_style(ui);
                    });
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            match self.slot.active() {
                Some(session) => session.draw(ui, self.dark_mode),
                None => {
                    ui.centered_and_justified(|ui| {
                        let hint = if self.source.is_loading() {
                            "loading graph…"
                        } else {
                            "no graph loaded: set a context id"
                        };
                        ui.label(RichText::new(hint).color(Color32::GRAY));
                    });
                }
            }

            if self.source.status() == FetchStatus::Error {
                self.draw_error_banner(ui);
            }
        });
    }
}

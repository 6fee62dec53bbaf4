//! Native desktop runner for lemma-graph-viz development.
//!
//! Run with: cargo run --example native --features native
//!
//! Shows a bundled sample document; the backend fetch path is exercised in
//! browser builds.

use eframe::{run_native, NativeOptions};
use lemma_graph_viz::LemmaGraphApp;

fn main() -> eframe::Result<()> {
    // Initialize tracing for native development
    #[cfg(debug_assertions)]
    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(
                EnvFilter::from_default_env()
                    .add_directive("lemma_graph_viz=debug".parse().unwrap()),
            )
            .init();
    }

    if std::env::args().any(|a| a == "--help" || a == "-h") {
        println!("Lemma Graph Viz - Native Development Runner");
        println!();
        println!("Usage: native");
        println!();
        println!("Keyboard Shortcuts:");
        println!("  Tab         Toggle sidebar");
        return Ok(());
    }

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Lemma Graph Viz - Development"),
        ..Default::default()
    };

    run_native(
        "Lemma Graph Viz",
        options,
        Box::new(|cc| Ok(Box::new(LemmaGraphApp::new(cc)))),
    )
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use tickline_core::{Tickline, TicklineConfig};
    use tickline_ui::TicklineApp;

    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {path}"))?;
            TicklineConfig::from_json(&json).with_context(|| format!("parsing {path}"))?
        }
        None => TicklineConfig::demo()?,
    };
    let tickline = Tickline::new(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 240.0]),
        ..Default::default()
    };
    eframe::run_native(
        "tickline",
        options,
        Box::new(|cc| Ok(Box::new(TicklineApp::new(cc, tickline)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe: {e}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {}

mod renderer;

use anyhow::{Context, Result};
use tickline_core::{Tickline, TicklineConfig};

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json =
                std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            TicklineConfig::from_json(&json).with_context(|| format!("parsing {path}"))?
        }
        None => TicklineConfig::demo()?,
    };
    let tickline = Tickline::new(config)?;

    renderer::render_tui(tickline)
}

//! Console runner for the grid ecosystem.
//!
//! Usage: `eco-sim [config.json]`

mod console;
mod telemetry;

use anyhow::{Context, Result};
use eco_core::SimulationConfig;
use eco_world::{Simulation, SimulationView};
use tracing::info;

fn load_config() -> Result<SimulationConfig> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "Loading configuration");
            SimulationConfig::load(&path)
                .with_context(|| format!("failed to load config from {}", path))?
        }
        None => SimulationConfig::default(),
    };

    if let Ok(seed) = std::env::var("ECO_SEED") {
        config.seed = Some(
            seed.parse()
                .with_context(|| format!("ECO_SEED must be an unsigned integer, got {:?}", seed))?,
        );
    }
    Ok(config)
}

fn main() -> Result<()> {
    telemetry::init_logging()?;

    let config = load_config()?;
    let steps = config.max_steps;
    let mut view = console::ConsoleView::from_env(config.summary_interval);

    let mut simulation = Simulation::new(config)?;
    info!(
        depth = simulation.config().depth,
        width = simulation.config().width,
        seed = ?simulation.config().seed,
        steps,
        "Starting ecosystem run"
    );

    view.show_status(&simulation.snapshot());
    let summary = simulation.run(steps, &mut view);

    for (cause, count) in &summary.stats.deaths {
        info!(cause = ?cause, count, "Deaths");
    }
    info!(summary = %serde_json::to_string(&summary)?, "Run summary");
    Ok(())
}

//! heartrisk: Heart disease risk predictor
//!
//! Main entry point for the terminal application.

use anyhow::Result;

use heartrisk::config::AppConfig;
use heartrisk::logging::{self, LogSink};
use heartrisk::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    let _guard = logging::init(LogSink::for_tui(&config))?;

    tracing::info!("Starting heartrisk...");

    let mut app = App::from_config(&config)?;
    app.run()?;

    tracing::info!("heartrisk shutdown complete.");
    Ok(())
}

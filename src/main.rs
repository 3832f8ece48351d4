#![windows_subsystem = "windows"]

use anyhow::Result;
use tipjar::{config::Config, gui};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    // missing ids are reported but the window still opens in its "unable to load" state
    config.warn_if_incomplete();
    gui::launch(config)?;

    Ok(())
}

// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(
    all(feature = "desktop", not(debug_assertions)),
    windows_subsystem = "windows"
)]

use clap::Parser;
use color_eyre::eyre::Result;
use rag_kb_lib::config::{init_tracing, AppConfig, Cli};

fn setup() -> Result<AppConfig> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);
    Ok(AppConfig::from_cli(&cli))
}

#[cfg(not(feature = "desktop"))]
#[tokio::main]
async fn main() -> Result<()> {
    let config = setup()?;
    let session = rag_kb_lib::session::Session::from_config(&config);
    rag_kb_lib::console::run(session).await?;
    Ok(())
}

#[cfg(feature = "desktop")]
fn main() -> Result<()> {
    let config = setup()?;
    rag_kb_lib::run(config)?;
    Ok(())
}

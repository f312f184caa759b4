mod app;
mod components;
mod config;
mod data;
mod events;
mod theme;
mod utils;

use std::fs::File;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::sync::mpsc;
use tracing::info;

use crate::app::App;
use crate::config::Config;
use crate::data::rpc::{HttpWalletRpc, WalletRpc};
use crate::data::{CoffeeService, ErrorSink};
use crate::events::AppEvent;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::parse();

    // The terminal belongs to ratatui, so diagnostics go to a file.
    let log_file = File::create(&config.log_file)
        .wrap_err_with(|| format!("cannot open log file {}", config.log_file))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    info!(wallet_url = %config.wallet_url, "starting coffee-tui");

    let rpc: Arc<dyn WalletRpc> = Arc::new(HttpWalletRpc::new(&config.wallet_url));

    // Create event channel
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Swallowed failures are logged and, additively, surfaced on the status
    // bar; no caller ever sees them as errors.
    let log = data::log_sink();
    let sink_tx = event_tx.clone();
    let on_error: ErrorSink = Arc::new(move |message: String| {
        log(message.clone());
        let _ = sink_tx.send(AppEvent::Error(message));
    });

    let service = Arc::new(CoffeeService::new(
        rpc,
        event_tx,
        Duration::from_secs(config.poll_interval_secs),
        on_error,
    ));

    let mut app = App::with_service(service, event_rx, config.tick_rate_ms);

    // Initialize terminal
    let terminal = ratatui::init();
    let result = app.run(terminal).await;

    // Restore terminal
    ratatui::restore();

    result
}

//! poptimizer-bus service entry point.
//!
//! Builds the event bus, registers handlers, starts the HTTP server and
//! runs until a termination signal arrives, then drains the bus.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use poptimizer_bus::app_state::AppState;
use poptimizer_bus::bus::EventBus;
use poptimizer_bus::config::{AppConfig, LogFormat};
use poptimizer_bus::handlers::EventJournal;
use poptimizer_bus::notify::{LogNotifier, Notifier, TelegramNotifier};
use poptimizer_bus::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting poptimizer-bus");

    // Build escalation sink
    let notifier: Arc<dyn Notifier> = match &config.telegram {
        Some(telegram) => {
            let client = reqwest::Client::builder()
                .timeout(config.bus.escalation_timeout)
                .build()?;
            Arc::new(TelegramNotifier::new(client, telegram, "EventBus"))
        }
        None => {
            tracing::warn!("telegram is not configured, alerts go to the log only");
            Arc::new(LogNotifier::new())
        }
    };

    // Build the bus and register handlers
    let mut bus = EventBus::new(config.bus.clone(), notifier);
    let journal = EventJournal::default();
    bus.subscribe(journal.clone());

    let app_state = AppState {
        publisher: bus.publisher(),
        journal,
        handlers: bus.handler_names().into(),
    };

    // Start bus and server
    let shutdown = CancellationToken::new();
    let bus_task = tokio::spawn(bus.run(shutdown.clone()));

    let listener = TcpListener::bind(config.listen_addr).await?;
    let app = server::build_app(app_state, config.request_timeout);
    let server_task = tokio::spawn(server::serve(listener, app, shutdown.clone()));

    server::wait_for_shutdown_signal().await?;
    tracing::info!("shutdown signal received");
    shutdown.cancel();

    server::join_shutdown(server_task, bus_task).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

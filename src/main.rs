//! Timer Board - a local multi-timer service
//!
//! This is the main entry point for the timer-board application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use timer_board::{
    api::create_router,
    config::Config,
    services::{AlertBoard, CommandAlarm},
    state::{AppState, ExpiryNotifier, TimerStore},
    storage::{FileStore, KeyValueStore, MemoryStore, TimerRepository},
    tasks::ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timer_board={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timer-board v{}", env!("CARGO_PKG_VERSION"));

    let kv: Arc<dyn KeyValueStore> = if config.ephemeral {
        info!("Storage: in memory only");
        Arc::new(MemoryStore::new())
    } else {
        let dir = config.data_dir();
        info!("Storage: {}", dir.display());
        Arc::new(FileStore::new(dir))
    };

    // Create application state
    let store = TimerStore::load(TimerRepository::new(kv));
    let alerts = Arc::new(AlertBoard::new());
    let alarm = Arc::new(CommandAlarm::new(config.alarm_command.clone()));
    let notifier = ExpiryNotifier::new(alarm, alerts.clone());
    let state = Arc::new(AppState::new(
        store,
        notifier,
        alerts,
        config.port,
        config.host.clone(),
        config.tick_millis,
    ));

    // Start the countdown drivers
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        ticker_task(ticker_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timers                    - List timers");
    info!("  POST   /timers                    - Create a timer");
    info!("  PATCH  /timers/:id                - Edit a timer");
    info!("  DELETE /timers/:id                - Delete a timer");
    info!("  POST   /timers/:id/toggle         - Start or pause");
    info!("  POST   /timers/:id/restart        - Reset to full duration");
    info!("  POST   /timers/:id/dismiss        - Dismiss the timer's alert");
    info!("  GET    /alerts                    - Outstanding alerts");
    info!("  POST   /alerts/:alert_id/dismiss  - Dismiss an alert");
    info!("  GET    /status                    - Board status");
    info!("  GET    /health                    - Health check");

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

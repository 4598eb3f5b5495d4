//! Pomodoro Clock - a local Pomodoro countdown daemon
//!
//! This is the main entry point for the pomodoro-clock application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use pomodoro_clock::{
    api::create_router,
    config::Config,
    services::check_player_available,
    state::AppState,
    tasks::{alarm_task, countdown_task},
    utils::shutdown_signal,
};

// Handlers, the countdown and the alarm share one event loop
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_clock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-clock v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, presets={}/{}/{}min, initial={}",
        config.host, config.port, config.pomodoro, config.short_break, config.long_break, config.preset
    );

    // A missing player only silences the alarm; the timer still works
    let player = config.alarm_player();
    match &player {
        Some(player) => {
            if let Err(e) = check_player_available(player).await {
                warn!("{}", e);
            }
        }
        None => info!("Alarm playback disabled"),
    }

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.presets(),
        config.preset,
    ));

    tokio::spawn(countdown_task(Arc::clone(&state)));
    tokio::spawn(alarm_task(Arc::clone(&state), player));

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /preset/:key          - Select pomodoro, shortBreak or longBreak");
    info!("  POST /start-stop           - Start, pause or acknowledge the alarm");
    info!("  POST /reset                - Reset to the preset duration");
    info!("  POST /increment/:seconds   - Add time");
    info!("  POST /edit[/digit/:d|/backspace|/submit|/cancel] - Manual time entry");
    info!("  POST /key/:key             - Deliver a key press");
    info!("  GET  /status | /presets | /events | /health");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            match signal {
                Ok(_) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to install signal handler: {}", e),
            }
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

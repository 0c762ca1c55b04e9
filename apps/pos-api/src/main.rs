//! # Atlas POS API
//!
//! HTTP JSON server for cashier terminals.
//!
//! ```text
//! Till ───► HTTP (8080) ───► Routes ───► SQLite
//!                               │
//!                               ├──► Stripe gateway (card charges)
//!                               └──► SMTP relay (receipt emails)
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;

use atlas_db::{Database, DbConfig};
use atlas_pos_api::routes::router;
use atlas_pos_api::{ApiConfig, AppState, Mailer, StripeClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Atlas POS API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    // Outbound integrations
    let stripe = StripeClient::new(config.stripe_base_url.clone());
    let mailer = Mailer::from_config(&config.smtp)?;

    let state = AppState {
        db,
        config: config.clone(),
        stripe,
        mailer,
    };

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

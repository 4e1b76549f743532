//! CourseHub Server
//!
//! Main entry point that wires the crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use coursehub_api::AppState;
use coursehub_core::config::AppConfig;
use coursehub_core::error::AppError;
use coursehub_database::{DatabasePool, Stores};

#[tokio::main]
async fn main() {
    let env = std::env::var("COURSEHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        "Starting CourseHub v{} (env: {})",
        env!("CARGO_PKG_VERSION"),
        config.app.environment
    );

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    coursehub_database::migration::run_migrations(db_pool.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Services and shared state ────────────────────────
    let stores = Stores::postgres(db_pool.pool().clone());
    let state = AppState::new(config, stores, Some(db_pool.clone()));

    // ── Step 3: Serve until shutdown ─────────────────────────────
    let result = coursehub_api::serve(state).await;

    db_pool.close().await;
    tracing::info!("CourseHub server shut down");
    result
}

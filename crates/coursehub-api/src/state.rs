//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use coursehub_auth::jwt::JwtDecoder;
use coursehub_core::config::AppConfig;
use coursehub_core::traits::Mailer;
use coursehub_database::DatabasePool;
use coursehub_database::store::Stores;
use coursehub_realtime::RealtimeEngine;
use coursehub_service::{EnrollmentService, LogMailer, ProgressService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool; absent when running over the in-memory store
    pub db_pool: Option<DatabasePool>,
    /// Realtime engine
    pub realtime: Arc<RealtimeEngine>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token verifier
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Lesson progress workflow and readers
    pub progress_service: Arc<ProgressService>,
    /// Enrollment lifecycle
    pub enrollment_service: Arc<EnrollmentService>,
}

impl AppState {
    /// Wire every service over `stores`, mailing through the log.
    pub fn new(config: AppConfig, stores: Stores, db_pool: Option<DatabasePool>) -> Self {
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(config.email.clone()));
        Self::with_mailer(config, stores, db_pool, mailer)
    }

    /// Wire every service over `stores` with an explicit mailer.
    pub fn with_mailer(
        config: AppConfig,
        stores: Stores,
        db_pool: Option<DatabasePool>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone()));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        let progress_service = Arc::new(ProgressService::new(
            stores.clone(),
            Arc::clone(&realtime) as _,
            Arc::clone(&mailer),
            config.app.clone(),
        ));
        let enrollment_service = Arc::new(EnrollmentService::new(stores, mailer));

        Self {
            config: Arc::new(config),
            db_pool,
            realtime,
            jwt_decoder,
            progress_service,
            enrollment_service,
        }
    }
}

// Library exports for binaries and tests
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use config::Config;
use services::{advice::AdviceService, plans::PlanService};

/// Application state shared across all handlers. Clients are built once by
/// the composition root and injected here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub plans: Arc<PlanService>,
    pub advice: Arc<AdviceService>,
}

impl AppState {
    /// Wire the configured plan store and advice client.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let store = db::build_store(&config)?;
        Ok(Self {
            plans: Arc::new(PlanService::new(store)),
            advice: Arc::new(AdviceService::from_config(&config)),
            config: Arc::new(config),
        })
    }
}

/// All API routes with request tracing. CORS is layered on by `main`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // BMI
        .route("/bmi", post(routes::bmi::calculate))
        // Weekly plans
        .route("/plans", get(routes::plans::list_plans).post(routes::plans::create_plan))
        .route("/plans/validate", post(routes::plans::validate_plan))
        .route(
            "/plans/{id}",
            get(routes::plans::get_plan)
                .put(routes::plans::update_plan)
                .delete(routes::plans::delete_plan),
        )
        // Advice
        .route("/advice", post(routes::advice::ask))
        .route("/chat", get(routes::chat::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::outreach::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Form page
        .route("/", get(handlers::handle_index).post(handlers::handle_submit))
        // JSON API
        .route("/api/v1/emails", post(handlers::handle_generate_emails))
        .route("/api/v1/portfolio", get(handlers::handle_portfolio_status))
        .route(
            "/api/v1/portfolio/sync",
            post(handlers::handle_portfolio_sync),
        )
        .with_state(state)
}

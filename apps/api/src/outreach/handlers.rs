//! Axum route handlers for the form page and the JSON API.

use axum::{extract::State, response::Html, Form, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::outreach::page::render_page;
use crate::outreach::pipeline::JobEmail;
use crate::portfolio::store::SyncReport;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateEmailsRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateEmailsResponse {
    pub jobs: Vec<JobEmail>,
}

#[derive(Debug, Serialize)]
pub struct PortfolioStatusResponse {
    pub collection: String,
    pub indexed_entries: u64,
    pub source_rows: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_index() -> Html<String> {
    Html(render_page("", None))
}

/// POST /
///
/// Runs the pipeline for the submitted URL and renders either every job's
/// result or a single error message into the page.
pub async fn handle_submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> Html<String> {
    let outcome = state.outreach().run(&form.url).await;
    if let Err(e) = &outcome {
        e.log();
    }
    Html(render_page(&form.url, Some(&outcome)))
}

/// POST /api/v1/emails
pub async fn handle_generate_emails(
    State(state): State<AppState>,
    Json(request): Json<GenerateEmailsRequest>,
) -> Result<Json<GenerateEmailsResponse>, AppError> {
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }

    let jobs = state.outreach().run(&request.url).await?;
    Ok(Json(GenerateEmailsResponse { jobs }))
}

/// GET /api/v1/portfolio
pub async fn handle_portfolio_status(
    State(state): State<AppState>,
) -> Result<Json<PortfolioStatusResponse>, AppError> {
    Ok(Json(PortfolioStatusResponse {
        collection: state.store.collection().to_string(),
        indexed_entries: state.store.count().await?,
        source_rows: state.store.source_len(),
    }))
}

/// POST /api/v1/portfolio/sync
///
/// Reconciles the index with the source table by content hash.
pub async fn handle_portfolio_sync(
    State(state): State<AppState>,
) -> Result<Json<SyncReport>, AppError> {
    Ok(Json(state.store.sync_source().await?))
}

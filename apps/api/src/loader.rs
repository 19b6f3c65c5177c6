//! Page loader: fetches a careers page and returns its visible text.

use std::time::Duration;

use reqwest::{header, Client, Url};
use scraper::Html;
use tracing::{debug, info};

use crate::errors::AppError;

/// Elements whose text content never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

#[derive(Clone)]
pub struct PageLoader {
    client: Client,
}

impl PageLoader {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the page's text content.
    pub async fn load(&self, url: &str) -> Result<String, AppError> {
        let url = parse_url(url)?;
        info!("Fetching {url}");

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| AppError::FetchFailure(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchFailure(format!("{url} returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::FetchFailure(format!("{url}: {e}")))?;
        debug!("Fetched {} bytes from {url}", body.len());

        Ok(html_to_text(&body))
    }
}

fn parse_url(raw: &str) -> Result<Url, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::FetchFailure("no URL given".to_string()));
    }
    let url = Url::parse(trimmed)
        .map_err(|e| AppError::FetchFailure(format!("invalid URL '{trimmed}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::FetchFailure(format!(
            "unsupported URL scheme '{other}'"
        ))),
    }
}

/// Collects the document's text nodes, skipping script-like elements.
/// Nodes are joined with a single space.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()));
        if hidden {
            continue;
        }
        let text = text.trim();
        if !text.is_empty() {
            pieces.push(text);
        }
    }

    pieces.join(" ")
}

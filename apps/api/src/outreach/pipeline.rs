//! Outreach pipeline: orchestrates a single form submission.
//!
//! Flow: fetch page → normalize → ensure portfolio indexed → extract jobs →
//!       for each job in order: match links → draft email.
//!
//! Fetch, indexing and extraction failures abort the submission. Once jobs are
//! extracted, a failure while matching or drafting one job is recorded on that
//! job's result and the remaining jobs are still drafted.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Persona;
use crate::errors::AppError;
use crate::llm_client::ChatModel;
use crate::loader::PageLoader;
use crate::models::job::JobRecord;
use crate::normalize::normalize;
use crate::outreach::drafter::write_mail;
use crate::outreach::extractor::extract_jobs;
use crate::portfolio::store::PortfolioStore;

/// Result for one extracted job. Exactly one of `email` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct JobEmail {
    pub job: JobRecord,
    pub links: Vec<String>,
    pub email: Option<String>,
    pub error: Option<String>,
}

/// The collaborators one submission runs against.
pub struct Outreach<'a> {
    pub loader: &'a PageLoader,
    pub store: &'a PortfolioStore,
    pub llm: &'a dyn ChatModel,
    pub persona: &'a Persona,
}

impl Outreach<'_> {
    /// Runs the full pipeline for `url`.
    pub async fn run(&self, url: &str) -> Result<Vec<JobEmail>, AppError> {
        let raw = self.loader.load(url).await?;
        self.process_page(&raw).await
    }

    /// Everything after the fetch: normalize, extract, match and draft.
    pub async fn process_page(&self, raw_text: &str) -> Result<Vec<JobEmail>, AppError> {
        let page_text = normalize(raw_text);
        info!(
            "Normalized page text: {} -> {} chars",
            raw_text.len(),
            page_text.len()
        );

        self.store.load_if_empty().await?;

        let jobs = extract_jobs(&page_text, self.llm).await?;

        let total = jobs.len();
        let mut results = Vec::with_capacity(total);
        for (i, job) in jobs.into_iter().enumerate() {
            info!("Drafting email {}/{total} for '{}'", i + 1, job.role);
            results.push(self.draft_for_job(job).await);
        }
        Ok(results)
    }

    async fn draft_for_job(&self, job: JobRecord) -> JobEmail {
        let links = match self.store.query_links(Some(&job.skills_query())).await {
            Ok(links) => links,
            Err(e) => {
                warn!("Portfolio lookup failed for '{}': {e}", job.role);
                return JobEmail {
                    job,
                    links: Vec::new(),
                    email: None,
                    error: Some(e.user_message()),
                };
            }
        };

        let outcome = write_mail(&job, &links, self.persona, self.llm).await;
        let links = links.into_iter().map(|m| m.link).collect();
        match outcome {
            Ok(email) => JobEmail {
                job,
                links,
                email: Some(email),
                error: None,
            },
            Err(e) => {
                warn!("Drafting failed for '{}': {e}", job.role);
                JobEmail {
                    job,
                    links,
                    email: None,
                    error: Some(e.user_message()),
                }
            }
        }
    }
}

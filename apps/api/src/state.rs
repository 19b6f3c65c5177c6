use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatModel;
use crate::loader::PageLoader;
use crate::outreach::pipeline::Outreach;
use crate::portfolio::store::PortfolioStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub loader: PageLoader,
    /// Owns the persisted portfolio index. Closed on shutdown.
    pub store: Arc<PortfolioStore>,
    /// Extraction and drafting model. Default: `LlmClient`.
    pub llm: Arc<dyn ChatModel>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Borrows the collaborators for one submission.
    pub fn outreach(&self) -> Outreach<'_> {
        Outreach {
            loader: &self.loader,
            store: self.store.as_ref(),
            llm: self.llm.as_ref(),
            persona: &self.config.persona,
        }
    }
}

// Outreach pipeline: fetch a careers page, extract job postings, match each
// job against the portfolio and draft a cold email per job.
// All LLM calls go through llm_client::ChatModel.

pub mod drafter;
pub mod extractor;
pub mod handlers;
pub mod page;
pub mod pipeline;
pub mod prompts;

//! Job extraction: turns cleaned careers-page text into structured job records.

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, ChatModel};
use crate::models::job::JobRecord;
use crate::outreach::prompts::EXTRACT_PROMPT_TEMPLATE;

/// Asks the LLM for the postings in `page_text` and parses its answer.
pub async fn extract_jobs(page_text: &str, llm: &dyn ChatModel) -> Result<Vec<JobRecord>, AppError> {
    let prompt = EXTRACT_PROMPT_TEMPLATE.replace("{page_data}", page_text);
    let raw = llm
        .complete(&prompt, JSON_ONLY_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Job extraction failed: {e}")))?;

    let jobs = parse_jobs(&raw)?;
    info!("Extracted {} job posting(s)", jobs.len());
    Ok(jobs)
}

/// Parses the extraction output: one job object or an array of them.
///
/// Anything that is not valid JSON of that shape usually means the page text
/// overflowed the model's context and the answer was cut off.
pub fn parse_jobs(raw: &str) -> Result<Vec<JobRecord>, AppError> {
    let value: Value = serde_json::from_str(strip_json_fences(raw)).map_err(|e| {
        warn!("Extraction output is not valid JSON: {e}");
        AppError::ContextTooLarge
    })?;

    let items = match value {
        Value::Object(_) => vec![value],
        Value::Array(items) => items,
        other => {
            warn!("Extraction output is JSON but not a job object: {other}");
            return Err(AppError::ContextTooLarge);
        }
    };

    items
        .into_iter()
        .map(|item| {
            if !item.is_object() {
                warn!("Extraction array holds a non-object element: {item}");
                return Err(AppError::ContextTooLarge);
            }
            serde_json::from_value::<JobRecord>(item).map_err(|e| {
                warn!("Extraction element does not match the job shape: {e}");
                AppError::ContextTooLarge
            })
        })
        .collect()
}

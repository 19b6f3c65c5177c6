use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the portfolio source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    #[serde(rename = "Techstack")]
    pub tech_stack: String,
    #[serde(rename = "Links")]
    pub link: String,
}

/// Metadata returned for a matched portfolio entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    pub link: String,
}

/// The columns of an indexed entry needed to score a query.
#[derive(Debug, Clone, FromRow)]
pub struct IndexedEntryRow {
    pub document: String,
    pub link: String,
    pub embedding: Vec<u8>,
}

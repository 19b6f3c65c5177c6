//! PortfolioStore: the persisted similarity index over portfolio tech stacks.
//!
//! Entries live in a named collection inside a SQLite file. Each entry keeps the
//! tech-stack text, its embedding and the `link` metadata returned on a match.
//!
//! Two ways to populate a collection:
//! - [`PortfolioStore::load_if_empty`] inserts every source row, but only when the
//!   collection holds no entries at all. It never revisits a populated collection,
//!   so edits to the CSV are not picked up. The count check and the inserts are
//!   not atomic: two first-time loads racing on an empty store can both insert.
//!   A single writer is assumed.
//! - [`PortfolioStore::sync_source`] reconciles the collection with the CSV by
//!   content hash in one transaction.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PortfolioConfig;
use crate::db;
use crate::errors::AppError;
use crate::models::job::SkillsQuery;
use crate::models::portfolio::{IndexedEntryRow, LinkMetadata, PortfolioEntry};
use crate::portfolio::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, Embedder};
use crate::portfolio::source::load_source;

/// Upper bound on links returned per query.
pub const MAX_RESULTS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub inserted: usize,
    pub removed: usize,
    pub unchanged: usize,
}

pub struct PortfolioStore {
    pool: SqlitePool,
    collection: String,
    source: Vec<PortfolioEntry>,
    embedder: Arc<dyn Embedder>,
}

impl PortfolioStore {
    /// Reads the source table and opens the persisted index.
    pub async fn open(
        config: &PortfolioConfig,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, AppError> {
        let source = load_source(&config.csv_path)?;
        info!(
            "Loaded {} portfolio rows from {}",
            source.len(),
            config.csv_path.display()
        );

        let pool = db::create_pool(&config.store_path).await.map_err(|e| {
            AppError::StoreUnavailable(format!("{}: {e:#}", config.store_path.display()))
        })?;

        Self::with_pool(pool, &config.collection, source, embedder).await
    }

    /// Opens `collection` on an existing pool, creating tables as needed.
    pub async fn with_pool(
        pool: SqlitePool,
        collection: &str,
        source: Vec<PortfolioEntry>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, AppError> {
        migrate(&pool).await?;
        ensure_collection(&pool, collection, embedder.model_name()).await?;

        Ok(Self {
            pool,
            collection: collection.to_string(),
            source,
            embedder,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Number of indexed entries in this collection.
    pub async fn count(&self) -> Result<u64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM portfolio_entries WHERE collection = ?")
                .bind(&self.collection)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u64)
    }

    /// Indexes every source row if the collection is empty. Returns how many were inserted.
    pub async fn load_if_empty(&self) -> Result<usize, AppError> {
        let existing = self.count().await?;
        if existing > 0 {
            debug!(
                "Collection '{}' already holds {existing} entries; skipping load",
                self.collection
            );
            return Ok(0);
        }

        let documents: Vec<String> = self.source.iter().map(|e| e.tech_stack.clone()).collect();
        let embeddings = self.embed(&documents).await?;

        let mut tx = self.pool.begin().await?;
        for (position, (entry, embedding)) in self.source.iter().zip(&embeddings).enumerate() {
            insert_entry(
                &mut tx,
                &self.collection,
                position,
                entry,
                embedding,
                OnDuplicate::Insert,
            )
            .await?;
        }
        tx.commit().await?;

        info!(
            "Indexed {} portfolio entries into '{}'",
            self.source.len(),
            self.collection
        );
        Ok(self.source.len())
    }

    /// Reconciles the collection with the source table by content hash.
    ///
    /// Rows whose hash is not yet indexed are inserted, indexed rows whose hash no
    /// longer appears in the source are removed, and the rest keep their ids.
    /// Duplicate source rows collapse into a single entry.
    pub async fn sync_source(&self) -> Result<SyncReport, AppError> {
        let indexed: Vec<String> = sqlx::query_scalar(
            "SELECT content_hash FROM portfolio_entries WHERE collection = ?",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;
        let indexed: HashSet<String> = indexed.into_iter().collect();

        let mut seen = HashSet::new();
        let mut wanted: Vec<(usize, &PortfolioEntry, String)> = Vec::new();
        for (position, entry) in self.source.iter().enumerate() {
            let hash = content_hash(entry);
            if seen.insert(hash.clone()) {
                wanted.push((position, entry, hash));
            }
        }

        let fresh: Vec<&(usize, &PortfolioEntry, String)> = wanted
            .iter()
            .filter(|(_, _, hash)| !indexed.contains(hash))
            .collect();
        let documents: Vec<String> = fresh.iter().map(|(_, e, _)| e.tech_stack.clone()).collect();
        let embeddings = self.embed(&documents).await?;

        let mut report = SyncReport::default();
        let mut tx = self.pool.begin().await?;

        for stale in indexed.iter().filter(|hash| !seen.contains(*hash)) {
            let result = sqlx::query(
                "DELETE FROM portfolio_entries WHERE collection = ? AND content_hash = ?",
            )
            .bind(&self.collection)
            .bind(stale)
            .execute(&mut *tx)
            .await?;
            report.removed += result.rows_affected() as usize;
        }

        for ((position, entry, _), embedding) in fresh.iter().zip(&embeddings) {
            let written = insert_entry(
                &mut tx,
                &self.collection,
                *position,
                entry,
                embedding,
                OnDuplicate::Skip,
            )
            .await?;
            if written {
                report.inserted += 1;
            }
        }

        for (position, _, hash) in &wanted {
            sqlx::query(
                "UPDATE portfolio_entries SET position = ? WHERE collection = ? AND content_hash = ?",
            )
            .bind(*position as i64)
            .bind(&self.collection)
            .bind(hash)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        report.unchanged = wanted.len() - report.inserted;
        info!(
            "Synced '{}': {} inserted, {} removed, {} unchanged",
            self.collection, report.inserted, report.removed, report.unchanged
        );
        Ok(report)
    }

    /// Returns metadata for the best-matching entries, best first, at most [`MAX_RESULTS`].
    ///
    /// Missing or blank skills return an empty list without touching the index.
    pub async fn query_links(
        &self,
        skills: Option<&SkillsQuery>,
    ) -> Result<Vec<LinkMetadata>, AppError> {
        let Some(text) = skills.and_then(SkillsQuery::query_text) else {
            debug!("No usable skills to match; returning no links");
            return Ok(Vec::new());
        };

        let query = self
            .embed(std::slice::from_ref(&text))
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        let rows = sqlx::query_as::<_, IndexedEntryRow>(
            "SELECT document, link, embedding \
             FROM portfolio_entries WHERE collection = ? ORDER BY position, id",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        let mut scored: Vec<(f32, IndexedEntryRow)> = rows
            .into_iter()
            .map(|row| (cosine_similarity(&query, &blob_to_vec(&row.embedding)), row))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(MAX_RESULTS);

        debug!(
            "Matched '{text}' to {:?}",
            scored
                .iter()
                .map(|(score, row)| format!("{} ({score:.3})", row.document))
                .collect::<Vec<_>>()
        );

        Ok(scored
            .into_iter()
            .map(|(_, row)| LinkMetadata { link: row.link })
            .collect())
    }

    /// Closes the underlying pool. Further calls fail with `StoreUnavailable`.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Vector store closed");
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embedder
            .embed(texts)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("embedding failed: {e}")))
    }
}

async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            embedding_model TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS portfolio_entries (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL REFERENCES collections(name),
            position INTEGER NOT NULL,
            document TEXT NOT NULL,
            link TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            embedding BLOB NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_portfolio_entries_hash \
         ON portfolio_entries(collection, content_hash)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Registers the collection, refusing to reuse one built with another embedding model.
async fn ensure_collection(pool: &SqlitePool, name: &str, model: &str) -> Result<(), AppError> {
    sqlx::query(
        "INSERT OR IGNORE INTO collections (name, embedding_model, created_at) VALUES (?, ?, ?)",
    )
    .bind(name)
    .bind(model)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    let stored: String =
        sqlx::query_scalar("SELECT embedding_model FROM collections WHERE name = ?")
            .bind(name)
            .fetch_one(pool)
            .await?;

    if stored != model {
        return Err(AppError::StoreUnavailable(format!(
            "collection '{name}' was built with embedding model '{stored}', \
             but '{model}' is configured"
        )));
    }
    Ok(())
}

/// How an insert treats a content hash that is already indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnDuplicate {
    Insert,
    Skip,
}

/// Inserts one entry with a fresh id. Returns whether a row was written.
async fn insert_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    collection: &str,
    position: usize,
    entry: &PortfolioEntry,
    embedding: &[f32],
    on_duplicate: OnDuplicate,
) -> Result<bool, AppError> {
    let hash = content_hash(entry);
    let result = sqlx::query(
        "INSERT INTO portfolio_entries
            (id, collection, position, document, link, content_hash, embedding, created_at)
         SELECT ?, ?, ?, ?, ?, ?, ?, ?
         WHERE ? OR NOT EXISTS (
            SELECT 1 FROM portfolio_entries WHERE collection = ? AND content_hash = ?
         )",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(collection)
    .bind(position as i64)
    .bind(&entry.tech_stack)
    .bind(&entry.link)
    .bind(&hash)
    .bind(vec_to_blob(embedding))
    .bind(Utc::now().to_rfc3339())
    .bind(on_duplicate == OnDuplicate::Insert)
    .bind(collection)
    .bind(&hash)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// SHA-256 over the row's tech stack and link.
pub fn content_hash(entry: &PortfolioEntry) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entry.tech_stack.as_bytes());
    hasher.update([0x1f]);
    hasher.update(entry.link.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::portfolio::embedding::testing::CountingEmbedder;
    use crate::portfolio::embedding::HashingEmbedder;

    fn entry(tech_stack: &str, link: &str) -> PortfolioEntry {
        PortfolioEntry {
            tech_stack: tech_stack.to_string(),
            link: link.to_string(),
        }
    }

    fn sample_source() -> Vec<PortfolioEntry> {
        vec![
            entry("React, Node.js", "a.com"),
            entry("Python, Django", "b.com"),
        ]
    }

    async fn open_at(
        path: &Path,
        source: Vec<PortfolioEntry>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<PortfolioStore, AppError> {
        let pool = db::create_pool(path).await.unwrap();
        PortfolioStore::with_pool(pool, "portfolio", source, embedder).await
    }

    async fn open_temp(source: Vec<PortfolioEntry>) -> (TempDir, PortfolioStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = open_at(
            &dir.path().join("index.sqlite"),
            source,
            Arc::new(HashingEmbedder::new(384)),
        )
        .await
        .unwrap();
        (dir, store)
    }

    fn links(results: &[LinkMetadata]) -> Vec<&str> {
        results.iter().map(|m| m.link.as_str()).collect()
    }

    #[tokio::test]
    async fn test_load_if_empty_twice_indexes_each_row_once() {
        let (_dir, store) = open_temp(sample_source()).await;

        assert_eq!(store.load_if_empty().await.unwrap(), 2);
        assert_eq!(store.load_if_empty().await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_load_if_empty_keeps_duplicate_rows() {
        let source = vec![entry("Rust", "r.dev"), entry("Rust", "r.dev"), entry("Go", "g.dev")];
        let (_dir, store) = open_temp(source).await;

        store.load_if_empty().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_load_if_empty_skips_populated_store_even_if_source_changed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.sqlite");
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(384));

        let first = open_at(&path, sample_source(), embedder.clone()).await.unwrap();
        first.load_if_empty().await.unwrap();
        first.close().await;

        let mut changed = sample_source();
        changed.push(entry("Kotlin, Android", "c.com"));
        let second = open_at(&path, changed, embedder).await.unwrap();
        assert_eq!(second.load_if_empty().await.unwrap(), 0);
        assert_eq!(second.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_query_links_ranks_best_match_first() {
        let (_dir, store) = open_temp(sample_source()).await;
        store.load_if_empty().await.unwrap();

        let results = store
            .query_links(Some(&SkillsQuery::Text("Django".into())))
            .await
            .unwrap();
        assert_eq!(results[0].link, "b.com");
    }

    #[tokio::test]
    async fn test_query_links_accepts_skill_lists() {
        let (_dir, store) = open_temp(sample_source()).await;
        store.load_if_empty().await.unwrap();

        let skills = SkillsQuery::List(vec!["React".into(), "Node.js".into()]);
        let results = store.query_links(Some(&skills)).await.unwrap();
        assert_eq!(results[0].link, "a.com");
    }

    #[tokio::test]
    async fn test_query_links_never_exceeds_two() {
        let source = vec![
            entry("Python, Django", "1.com"),
            entry("Python, Flask", "2.com"),
            entry("Python, FastAPI", "3.com"),
            entry("Python, Pandas", "4.com"),
        ];
        let (_dir, store) = open_temp(source).await;
        store.load_if_empty().await.unwrap();

        let results = store
            .query_links(Some(&SkillsQuery::Text("Python".into())))
            .await
            .unwrap();
        assert_eq!(results.len(), MAX_RESULTS);
    }

    #[tokio::test]
    async fn test_query_links_returns_fewer_when_index_is_small() {
        let (_dir, store) = open_temp(vec![entry("Rust", "r.dev")]).await;
        store.load_if_empty().await.unwrap();

        let results = store
            .query_links(Some(&SkillsQuery::Text("Go".into())))
            .await
            .unwrap();
        assert_eq!(links(&results), vec!["r.dev"]);
    }

    #[tokio::test]
    async fn test_query_links_empty_inputs_skip_the_index() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(CountingEmbedder::new());
        let store = open_at(&dir.path().join("i.sqlite"), sample_source(), embedder.clone())
            .await
            .unwrap();
        store.load_if_empty().await.unwrap();
        let calls_after_load = embedder.call_count();

        for skills in [
            None,
            Some(SkillsQuery::Text(String::new())),
            Some(SkillsQuery::Text("  ".into())),
            Some(SkillsQuery::List(vec![])),
        ] {
            assert!(store.query_links(skills.as_ref()).await.unwrap().is_empty());
        }
        assert_eq!(embedder.call_count(), calls_after_load);
    }

    #[tokio::test]
    async fn test_query_on_empty_index_returns_nothing() {
        let (_dir, store) = open_temp(sample_source()).await;
        let results = store
            .query_links(Some(&SkillsQuery::Text("Django".into())))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_index_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.sqlite");
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(384));

        let store = open_at(&path, sample_source(), embedder.clone()).await.unwrap();
        store.load_if_empty().await.unwrap();
        store.close().await;

        let reopened = open_at(&path, sample_source(), embedder).await.unwrap();
        let results = reopened
            .query_links(Some(&SkillsQuery::Text("Django".into())))
            .await
            .unwrap();
        assert_eq!(results[0].link, "b.com");
    }

    #[tokio::test]
    async fn test_reopen_with_other_embedding_model_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.sqlite");

        let store = open_at(&path, sample_source(), Arc::new(HashingEmbedder::new(384)))
            .await
            .unwrap();
        store.close().await;

        let err = open_at(&path, sample_source(), Arc::new(HashingEmbedder::new(16)))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let (_dir, store) = open_temp(sample_source()).await;
        store.close().await;
        assert!(matches!(
            store.count().await,
            Err(AppError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_sync_source_inserts_removes_and_keeps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.sqlite");
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(384));

        let store = open_at(&path, sample_source(), embedder.clone()).await.unwrap();
        store.load_if_empty().await.unwrap();
        store.close().await;

        let updated = vec![
            entry("Python, Django", "b.com"),
            entry("Kotlin, Android", "c.com"),
            entry("Kotlin, Android", "c.com"),
        ];
        let store = open_at(&path, updated, embedder).await.unwrap();
        let report = store.sync_source().await.unwrap();
        assert_eq!(
            report,
            SyncReport {
                inserted: 1,
                removed: 1,
                unchanged: 1
            }
        );
        assert_eq!(store.count().await.unwrap(), 2);

        let again = store.sync_source().await.unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(again.removed, 0);

        let results = store
            .query_links(Some(&SkillsQuery::Text("Android".into())))
            .await
            .unwrap();
        assert_eq!(results[0].link, "c.com");
    }

    #[test]
    fn test_content_hash_depends_on_both_columns() {
        let a = content_hash(&entry("Rust", "a.com"));
        assert_eq!(a, content_hash(&entry("Rust", "a.com")));
        assert_ne!(a, content_hash(&entry("Rust", "b.com")));
        assert_ne!(a, content_hash(&entry("Rusta", ".com")));
        assert_eq!(a.len(), 64);
    }
}

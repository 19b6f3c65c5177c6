//! Embedding providers and vector helpers for the portfolio index.
//!
//! - [`HashingEmbedder`]: offline and deterministic. Each token is hashed into a
//!   fixed number of buckets and the vector is L2-normalised, so texts sharing
//!   tokens score high under cosine similarity.
//! - [`OpenAiEmbedder`]: calls the hosted `POST /v1/embeddings` endpoint.
//!
//! Vectors are stored in SQLite as little-endian `f32` BLOBs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::{EmbeddingConfig, EmbeddingProviderKind};

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
pub const HASHING_DIMS: usize = 384;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

/// Turns texts into vectors. Implementations must return one vector per input, in order.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier recorded with a collection so vectors from different models never mix.
    fn model_name(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Builds the embedder selected by configuration.
pub fn create_embedder(
    config: &EmbeddingConfig,
    timeout: Option<Duration>,
) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match config.provider {
        EmbeddingProviderKind::Hashing => Ok(Arc::new(HashingEmbedder::new(HASHING_DIMS))),
        EmbeddingProviderKind::OpenAi => Ok(Arc::new(OpenAiEmbedder::new(
            config.openai_api_key.clone().unwrap_or_default(),
            config.model.clone(),
            timeout,
        )?)),
    }
}

// ============ Hashing ============

pub struct HashingEmbedder {
    dims: usize,
    name: String,
}

impl HashingEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            name: format!("hashing-{dims}"),
        }
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for token in tokenize(text) {
            vector[bucket(&token, self.dims)] += 1.0;
        }
        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn bucket(token: &str, dims: usize) -> usize {
    let digest = Sha256::digest(token.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_le_bytes(prefix) % dims as u64) as usize
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

// ============ OpenAI ============

pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: String,
        model: String,
        timeout: Option<Duration>,
    ) -> Result<Self, EmbeddingError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "model": self.model, "input": texts }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: EmbeddingsResponse = response.json().await?;
        order_embeddings(body.data, texts.len())
    }
}

/// Sorts API items by their `index` so output order matches input order.
fn order_embeddings(
    mut items: Vec<EmbeddingItem>,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if items.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            actual: items.len(),
        });
    }
    items.sort_by_key(|item| item.index);
    Ok(items.into_iter().map(|item| item.embedding).collect())
}

// ============ Vector helpers ============

/// Encode a float vector as a BLOB (little-endian f32 bytes).
pub fn vec_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for &v in vector {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB written by [`vec_to_blob`].
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity in `[-1, 1]`; `0.0` for empty or mismatched vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}

#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Hashing embedder that counts how many times it was asked to embed.
    pub struct CountingEmbedder {
        inner: HashingEmbedder,
        pub calls: AtomicUsize,
    }

    impl CountingEmbedder {
        pub fn new() -> Self {
            Self {
                inner: HashingEmbedder::new(HASHING_DIMS),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        fn model_name(&self) -> &str {
            self.inner.model_name()
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed(texts).await
        }
    }
}

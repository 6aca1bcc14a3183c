//! EmbeddingProvider trait and implementations.
//!
//! The deduplicator's semantic stage is expressed as a narrow injected
//! interface so the dedup logic never branches on whether a service is
//! configured: callers inject [`NoopEmbedding`] when semantic dedup is
//! disabled and the stage degrades to a no-op.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from an embedding provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("embedding API error: {0}")]
    Api(String),

    #[error("failed to parse embedding response: {0}")]
    Parse(String),

    #[error("embedding provider not configured")]
    NotConfigured,
}

/// Trait for computing text embeddings and comparing them.
///
/// Implementations should batch: `embed` is called once per dedup run
/// with every message that needs a vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Compute one embedding vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Whether this provider can actually produce embeddings.
    ///
    /// When false, callers skip the semantic stage entirely.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Cosine similarity between two vectors, in `[-1, 1]`.
    ///
    /// Returns 0 for mismatched lengths or zero vectors.
    fn cosine_similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

/// Provider used when semantic dedup is disabled or unconfigured.
pub struct NoopEmbedding;

#[async_trait]
impl EmbeddingProvider for NoopEmbedding {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Err(ProviderError::NotConfigured)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

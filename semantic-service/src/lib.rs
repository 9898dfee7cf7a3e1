//! # semantic-service
//!
//! The `SemanticService` capability contract: `embed`, `batch_embed`,
//! `similarity`. Grounded in `embedding::EmbeddingService`
//! (`embed`/`embed_batch` returning `Vec<f32>`) with a dependency-free
//! default implementation so the pipeline runs without a network call.

mod hashed_embedder;
mod similarity;

pub use hashed_embedder::{HashedBagOfWordsEmbedder, EMBEDDING_DIM};
pub use similarity::cosine_similarity;

use async_trait::async_trait;

/// Produces text embeddings and computes similarity between them. Failures
/// should be surfaced as `Err`; callers treat a failed embed as "similarity
/// 0" and fall back to occurrence x confidence ranking, per the pipeline's
/// degrade-gracefully policy.
#[async_trait]
pub trait SemanticService: Send + Sync {
    /// Produces a dense embedding for a single text.
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Produces embeddings for multiple texts in one call.
    async fn batch_embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Cosine similarity in `[0, 1]`. Returns 0 when either vector is empty
    /// or zero-norm. Provided; implementors need not override it.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }
}

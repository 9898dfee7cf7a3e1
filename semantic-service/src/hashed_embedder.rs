//! Deterministic bag-of-features embedding: no network call, no trained
//! model. Tokens are feature-hashed into a fixed-width vector and
//! L2-normalized, a TF-style approximation of the real embedder the spec
//! says any dense fixed-ish-dimensionality embedding satisfies.

use crate::SemanticService;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const EMBEDDING_DIM: usize = 256;

/// Default `SemanticService`: a hashed bag-of-words embedder. Swappable
/// behind the trait exactly as the teacher swaps OpenAI/BigModel behind
/// `EmbeddingService`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashedBagOfWordsEmbedder;

impl HashedBagOfWordsEmbedder {
    pub fn new() -> Self {
        Self
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

fn hash_bucket(token: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() % EMBEDDING_DIM as u64) as usize
}

fn embed_one(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIM];
    for token in tokenize(text) {
        vector[hash_bucket(&token)] += 1.0;
    }
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
    vector
}

#[async_trait]
impl SemanticService for HashedBagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(embed_one(text))
    }

    async fn batch_embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| embed_one(t)).collect())
    }
}

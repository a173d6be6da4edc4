// Warren Mind Engine — Deterministic Provider Doubles
//
// Test doubles for the generation and embedding ports. Unit and integration
// tests replace the real services entirely with these, so every engine path
// — including the failure fallbacks — runs without a network.
//
//   ScriptedGeneration  — replays a queue of canned responses
//   StallingGeneration  — never resolves (exercises timeouts / busy slots)
//   FailingGeneration   — always errors (exercises fallback paths)
//   HashEmbedding       — deterministic bag-of-words vectors; similar texts
//                         share tokens and therefore cosine weight
//   FailingEmbedding    — always errors (exercises importance-only fallback)

use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::traits::{EmbeddingClient, GenerationClient};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

// ── ScriptedGeneration ─────────────────────────────────────────────────────

/// Replays queued responses in order, then a default response forever.
pub struct ScriptedGeneration {
    responses: Mutex<VecDeque<String>>,
    default: String,
    calls: Mutex<usize>,
}

impl ScriptedGeneration {
    pub fn new(responses: Vec<String>) -> Self {
        ScriptedGeneration {
            responses: Mutex::new(responses.into()),
            default: String::new(),
            calls: Mutex::new(0),
        }
    }

    /// Always answer with the same text.
    pub fn always(text: impl Into<String>) -> Self {
        ScriptedGeneration {
            responses: Mutex::new(VecDeque::new()),
            default: text.into(),
            calls: Mutex::new(0),
        }
    }

    pub fn with_default(mut self, text: impl Into<String>) -> Self {
        self.default = text.into();
        self
    }

    /// How many synthesize calls have been made.
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl GenerationClient for ScriptedGeneration {
    async fn synthesize(&self, _prompt: &str) -> EngineResult<String> {
        *self.calls.lock() += 1;
        Ok(self
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default.clone()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

// ── StallingGeneration ─────────────────────────────────────────────────────

/// Never resolves. Pairs with `tokio::time::timeout` to exercise the
/// timeout path, and keeps the request slot pending in busy-slot tests.
#[derive(Default)]
pub struct StallingGeneration;

impl StallingGeneration {
    pub fn new() -> Self {
        StallingGeneration
    }
}

#[async_trait]
impl GenerationClient for StallingGeneration {
    async fn synthesize(&self, _prompt: &str) -> EngineResult<String> {
        std::future::pending::<()>().await;
        unreachable!()
    }

    fn model_name(&self) -> &str {
        "stalling"
    }
}

// ── FailingGeneration ──────────────────────────────────────────────────────

/// Always errors, immediately.
#[derive(Default)]
pub struct FailingGeneration;

impl FailingGeneration {
    pub fn new() -> Self {
        FailingGeneration
    }
}

#[async_trait]
impl GenerationClient for FailingGeneration {
    async fn synthesize(&self, _prompt: &str) -> EngineResult<String> {
        Err(EngineError::provider("scripted", "generation unavailable"))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

// ── HashEmbedding ──────────────────────────────────────────────────────────

/// Deterministic bag-of-words embedding: each lowercase token hashes to one
/// dimension, counts accumulate, the vector is L2-normalized. Texts sharing
/// tokens get positive cosine similarity; identical texts score 1.0. Good
/// enough to make semantic-retrieval tests meaningful without a model.
pub struct HashEmbedding {
    dims: usize,
}

impl HashEmbedding {
    pub fn new(dims: usize) -> Self {
        HashEmbedding { dims: dims.max(1) }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for token in text.to_lowercase().split_whitespace() {
            let token: String = token.chars().filter(|c| c.is_alphanumeric()).collect();
            if token.is_empty() {
                continue;
            }
            vector[(fnv1a(token.as_bytes()) as usize) % self.dims] += 1.0;
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

/// FNV-1a, 64-bit. Stable across platforms and runs.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl EmbeddingClient for HashEmbedding {
    async fn embed(&self, text: &str) -> EngineResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn model_name(&self) -> &str {
        "hash-bow"
    }
}

// ── FailingEmbedding ───────────────────────────────────────────────────────

/// Always errors, immediately.
#[derive(Default)]
pub struct FailingEmbedding;

impl FailingEmbedding {
    pub fn new() -> Self {
        FailingEmbedding
    }
}

#[async_trait]
impl EmbeddingClient for FailingEmbedding {
    async fn embed(&self, _text: &str) -> EngineResult<Vec<f32>> {
        Err(EngineError::provider("scripted", "embedding unavailable"))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mind::retrieval::cosine_similarity;

    #[tokio::test]
    async fn scripted_replays_then_defaults() {
        let client = ScriptedGeneration::new(vec!["one".into(), "two".into()])
            .with_default("rest");
        assert_eq!(client.synthesize("x").await.unwrap(), "one");
        assert_eq!(client.synthesize("x").await.unwrap(), "two");
        assert_eq!(client.synthesize("x").await.unwrap(), "rest");
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn hash_embedding_is_deterministic_and_normalized() {
        let embedder = HashEmbedding::new(64);
        let a = embedder.embed("water in the north tunnel").await.unwrap();
        let b = embedder.embed("water in the north tunnel").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn shared_tokens_raise_similarity() {
        let embedder = HashEmbedding::new(128);
        let water1 = embedder.embed("found water by the north wall").await.unwrap();
        let water2 = embedder.embed("water dripping near the wall").await.unwrap();
        let berries = embedder.embed("ripe berries growing everywhere").await.unwrap();
        assert!(
            cosine_similarity(&water1, &water2) > cosine_similarity(&water1, &berries),
            "overlapping vocabulary should score higher"
        );
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let embedder = HashEmbedding::new(16);
        let v = embedder.embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn failing_doubles_fail() {
        assert!(FailingGeneration::new().synthesize("x").await.is_err());
        assert!(FailingEmbedding::new().embed("x").await.is_err());
    }
}

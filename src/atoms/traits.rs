// ── Warren Atoms: Service Ports ────────────────────────────────────────────
//
// The two capability interfaces the engine needs from the outside world.
// Modeled as injected traits (strategy/port pattern) so deterministic test
// doubles can replace the real services entirely — see
// `engine::providers::scripted`.
//
// Contract notes:
//   • Both services are fallible and slow; every engine call site wraps them
//     in a wall-clock timeout and has a named deterministic fallback.
//   • `synthesize` may return arbitrarily unstructured text. The engine
//     parses it against a strict field grammar with a total fallback
//     mapping; providers are never trusted to follow the format.

use crate::atoms::error::EngineResult;
use async_trait::async_trait;

/// Text-generation service: plan text, reflection questions and answers.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Produce free text for the given prompt.
    async fn synthesize(&self, prompt: &str) -> EngineResult<String>;

    /// Model identifier, for logs and the inspection API.
    fn model_name(&self) -> &str;
}

/// Embedding service: fixed-length vectors for retrieval relevance.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed one text. The returned length must be stable per model.
    async fn embed(&self, text: &str) -> EngineResult<Vec<f32>>;

    /// Model identifier, for logs and the inspection API.
    fn model_name(&self) -> &str;
}

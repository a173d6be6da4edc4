// Warren Mind Engine — Service Providers
//
// Concrete implementations of the generation and embedding ports defined in
// `atoms::traits`. The engine never cares which one it holds:
//   - `OllamaClient` talks to a local Ollama daemon (with an
//     OpenAI-compatible fallback path) for both ports.
//   - `scripted` holds the deterministic doubles used in tests and as a
//     fully offline last resort.

pub mod ollama;
pub mod scripted;

pub use ollama::OllamaClient;
pub use scripted::{
    FailingEmbedding, FailingGeneration, HashEmbedding, ScriptedGeneration, StallingGeneration,
};

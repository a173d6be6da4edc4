// Warrenmind — agent cognitive engine for maze-world survival simulations.
//
// One `CognitiveEngine` per simulated agent, driven by the external tick:
//
//   perception context → retrieval (read-only) → planning → action intent
//   → observations appended → reflection trigger evaluated
//
// The maze itself, visibility, rendering, input, and persistence are
// external collaborators. The engine consumes a read-only
// `PerceptionContext` each tick and exposes a single `ActionIntent` plus a
// read-only inspection snapshot; its correctness depends only on that
// contract, never on world topology.
//
// The generation and embedding services are injected ports
// (`atoms::traits`), with a local Ollama client and fully deterministic
// doubles in `engine::providers`. Every service call has a deadline and a
// deterministic fallback — the agent always has some valid next action,
// even under repeated external-service failure.
//
// Layering follows the atoms/engine split:
//   atoms/  — pure data types, constants, config, errors (no I/O)
//   engine/ — behavior: the mind components and the provider clients

pub mod atoms;
pub mod engine;

// Re-exports: the surface a simulation embedding this crate actually uses.
pub use atoms::config::{
    EngineConfig, MemoryConfig, PlanningConfig, ProviderConfig, ReflectionConfig,
    RelationshipConfig, RetrievalConfig,
};
pub use atoms::error::{EngineError, EngineResult};
pub use atoms::memory_types::{
    MemoryKind, MemoryRecord, RelationshipRecord, RelationshipSummary, RetrievalMode,
    ScoredRecord,
};
pub use atoms::plan_types::{
    ActionPlan, DailyPlan, HourlyPlan, PlanPriority, PlanStatus, TimeWindow,
};
pub use atoms::traits::{EmbeddingClient, GenerationClient};
pub use atoms::types::{
    ActionIntent, ActionTarget, ActionType, GameTime, Interaction, InteractionKind, NearbyAgent,
    PerceptionContext, Position, SurvivalMetrics, SurvivalNeed, VisibleItem,
};
pub use engine::mind::{
    CognitiveEngine, InspectionSnapshot, MemoryStore, PlanningEngine, ReflectionEngine,
    RelationshipMemory, ReplanReason, RetrievalEngine,
};
pub use engine::providers::{HashEmbedding, OllamaClient, ScriptedGeneration};

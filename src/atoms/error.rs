// ── Warren Atoms: Error Types ──────────────────────────────────────────────
// Single canonical error enum for the engine, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (Config, Provider, Plan…).
//   • The `#[from]` attribute wires external error conversions automatically.
//   • Provider failures (timeout, parse, transport) are recovered locally by
//     the engine with named fallback paths — they exist in the taxonomy so
//     the fallback sites can log exactly what degraded, but they are never
//     surfaced as fatal from `tick`.
//   • Only configuration errors are raised to the caller, at initialization.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine configuration is invalid (zero capacity, negative threshold,
    /// bad weights). Raised at initialization only.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A record was submitted with importance outside [1, 10].
    #[error("Invalid importance {0} (must be within [1, 10])")]
    InvalidImportance(f32),

    /// Child plan windows do not tile their parent window exactly.
    /// This is a logic defect, not a runtime condition — construction
    /// fails loudly.
    #[error("Invalid time window: children span {children_secs}s, parent expects {parent_secs}s")]
    InvalidTimeWindow {
        parent_secs: f64,
        children_secs: f64,
    },

    /// The generation service did not answer within the deadline.
    #[error("Generation request timed out")]
    GenerationTimeout,

    /// The generation service answered, but the response did not match the
    /// expected field grammar. The total fallback mapping still produces a
    /// usable result; this variant records what was degraded.
    #[error("Generation response unparseable: {0}")]
    GenerationParse(String),

    /// External service HTTP or API-level failure (non-secret detail only).
    #[error("Provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    /// A plan node id was not found in the current tree.
    #[error("Unknown plan node: {0}")]
    UnknownPlanNode(String),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP / network failure (reqwest layer).
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catch-all for errors that do not yet have a dedicated variant.
    /// Prefer adding a specific variant over using this in new code.
    #[error("{0}")]
    Other(String),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl EngineError {
    /// Create a provider error with name and message.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ── Bridge: String → EngineError ───────────────────────────────────────────
// Allows `?` on helpers that produce `Result<T, String>` inside functions
// returning `EngineResult<T>`.

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::Other(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Other(s.to_string())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All engine operations should return this type.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_time_window_message_names_both_spans() {
        let err = EngineError::InvalidTimeWindow {
            parent_secs: 3600.0,
            children_secs: 3500.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("3500"));
        assert!(msg.contains("3600"));
    }

    #[test]
    fn provider_constructor() {
        let err = EngineError::provider("ollama", "connection refused");
        assert!(matches!(err, EngineError::Provider { .. }));
        assert!(err.to_string().contains("ollama"));
    }
}

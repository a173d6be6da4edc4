// ── Warren Atoms: Engine Configuration ─────────────────────────────────────
//
// Centralized configuration for the whole cognitive engine. Every
// previously-magic value lives here with a documented default in
// `atoms/constants.rs`. Loadable from TOML; every field has a serde default
// so partial files work.
//
// Validation happens once, at engine construction — configuration errors are
// the only errors the engine ever raises to its caller.

use crate::atoms::constants::*;
use crate::atoms::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

// ── Sub-configs ────────────────────────────────────────────────────────────

/// Memory store sizing and eviction weighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Maximum records kept; exceeding it evicts lowest-retention records.
    pub capacity: usize,
    /// Weight of recency in the retention score.
    pub retention_recency_weight: f64,
    /// Weight of normalized importance in the retention score.
    pub retention_importance_weight: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            capacity: DEFAULT_MEMORY_CAPACITY,
            retention_recency_weight: DEFAULT_RETENTION_RECENCY_WEIGHT,
            retention_importance_weight: DEFAULT_RETENTION_IMPORTANCE_WEIGHT,
        }
    }
}

/// Retrieval scoring weights and the recency half-life.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub half_life_hours: f64,
    pub recency_weight: f64,
    pub importance_weight: f64,
    pub relevance_weight: f64,
    /// Whether returning a record bumps its last-access timestamp. This is
    /// the reinforcing feedback loop — frequently retrieved memories decay
    /// slower. Intentional in the source design; turn off to disable.
    pub bump_access_on_retrieve: bool,
    /// When the embedding service fails, degrade to importance-only ranking
    /// instead of returning nothing.
    pub importance_only_on_embed_failure: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        RetrievalConfig {
            half_life_hours: DEFAULT_RECENCY_HALF_LIFE_HOURS,
            recency_weight: DEFAULT_RECENCY_WEIGHT,
            importance_weight: DEFAULT_IMPORTANCE_WEIGHT,
            relevance_weight: DEFAULT_RELEVANCE_WEIGHT,
            bump_access_on_retrieve: true,
            importance_only_on_embed_failure: true,
        }
    }
}

/// Reflection trigger thresholds and evidence selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionConfig {
    /// Accumulated observation importance that triggers a pass.
    pub threshold: f32,
    /// Reflect anyway after this much game time without one.
    pub interval_hours: f64,
    /// Evidence selection: most recent N observations…
    pub evidence_window: usize,
    /// …with importance at or above this floor.
    pub importance_floor: f32,
    /// Supporting records retrieved per question (useful range 10–20).
    pub evidence_per_question: usize,
    /// Questions requested per pass (grammar accepts 1–5).
    pub max_questions: usize,
    /// Uncited level-n reflections before a level-(n+1) synthesis.
    pub meta_fan_in: usize,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        ReflectionConfig {
            threshold: DEFAULT_REFLECTION_THRESHOLD,
            interval_hours: DEFAULT_REFLECTION_INTERVAL_HOURS,
            evidence_window: DEFAULT_EVIDENCE_WINDOW,
            importance_floor: DEFAULT_EVIDENCE_IMPORTANCE_FLOOR,
            evidence_per_question: DEFAULT_EVIDENCE_PER_QUESTION,
            max_questions: DEFAULT_MAX_QUESTIONS,
            meta_fan_in: DEFAULT_META_FAN_IN,
        }
    }
}

/// Plan tree shape and re-plan trigger tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    pub hourly_count: usize,
    pub hour_secs: f64,
    pub actions_per_hour: usize,
    pub action_secs: f64,
    /// Survival metric below this forces a re-plan.
    pub critical_threshold: f32,
    /// Divergence trigger: live distance > factor × previously observed.
    pub divergence_factor: f64,
    /// Overrun trigger: in-progress action ran > factor × its window.
    pub overrun_factor: f64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        PlanningConfig {
            hourly_count: DEFAULT_HOURLY_COUNT,
            hour_secs: DEFAULT_HOUR_SECS,
            actions_per_hour: DEFAULT_ACTIONS_PER_HOUR,
            action_secs: DEFAULT_ACTION_SECS,
            critical_threshold: DEFAULT_CRITICAL_SURVIVAL_THRESHOLD,
            divergence_factor: DEFAULT_DIVERGENCE_FACTOR,
            overrun_factor: DEFAULT_OVERRUN_FACTOR,
        }
    }
}

/// Relationship update steps and decay rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    pub familiarity_step: f32,
    pub affinity_step: f32,
    pub trust_step: f32,
    /// Familiarity and trust multiply by this per idle game hour.
    pub hourly_decay: f32,
    /// Affinity decay per idle hour; 1.0 disables it.
    pub affinity_hourly_decay: f32,
    /// Interaction summaries kept per relationship.
    pub history_cap: usize,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        RelationshipConfig {
            familiarity_step: DEFAULT_FAMILIARITY_STEP,
            affinity_step: DEFAULT_AFFINITY_STEP,
            trust_step: DEFAULT_TRUST_STEP,
            hourly_decay: DEFAULT_HOURLY_DECAY,
            affinity_hourly_decay: DEFAULT_AFFINITY_HOURLY_DECAY,
            history_cap: DEFAULT_INTERACTION_HISTORY_CAP,
        }
    }
}

// ── Top-level config ───────────────────────────────────────────────────────

/// Full engine configuration. One instance per agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub memory: MemoryConfig,
    pub retrieval: RetrievalConfig,
    pub reflection: ReflectionConfig,
    pub planning: PlanningConfig,
    pub relationship: RelationshipConfig,
    pub provider: ProviderConfig,
}

/// Wall-clock deadlines on the external services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub generation_timeout_secs: f64,
    pub embedding_timeout_secs: f64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            generation_timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
            embedding_timeout_secs: DEFAULT_EMBEDDING_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document. Missing fields take their defaults; the result
    /// is validated before being returned.
    pub fn from_toml_str(input: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(input)
            .map_err(|e| EngineError::config(format!("bad TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a working engine. Called
    /// once at engine construction.
    pub fn validate(&self) -> EngineResult<()> {
        if self.memory.capacity == 0 {
            return Err(EngineError::config("memory.capacity must be at least 1"));
        }
        if self.memory.retention_recency_weight < 0.0
            || self.memory.retention_importance_weight < 0.0
            || self.memory.retention_recency_weight + self.memory.retention_importance_weight
                <= 0.0
        {
            return Err(EngineError::config(
                "retention weights must be non-negative and not both zero",
            ));
        }
        if self.retrieval.half_life_hours <= 0.0 {
            return Err(EngineError::config(
                "retrieval.half_life_hours must be positive",
            ));
        }
        if self.retrieval.recency_weight < 0.0
            || self.retrieval.importance_weight < 0.0
            || self.retrieval.relevance_weight < 0.0
        {
            return Err(EngineError::config(
                "retrieval weights must be non-negative",
            ));
        }
        if self.reflection.threshold <= 0.0 {
            return Err(EngineError::config(
                "reflection.threshold must be positive",
            ));
        }
        if self.reflection.interval_hours <= 0.0 {
            return Err(EngineError::config(
                "reflection.interval_hours must be positive",
            ));
        }
        if self.reflection.max_questions == 0 || self.reflection.max_questions > 5 {
            return Err(EngineError::config(
                "reflection.max_questions must be within 1..=5",
            ));
        }
        if self.reflection.meta_fan_in < 2 {
            return Err(EngineError::config(
                "reflection.meta_fan_in must be at least 2",
            ));
        }
        if self.planning.hourly_count == 0
            || self.planning.actions_per_hour == 0
            || self.planning.hour_secs <= 0.0
            || self.planning.action_secs <= 0.0
        {
            return Err(EngineError::config("planning counts and durations must be positive"));
        }
        let tiled = self.planning.action_secs * self.planning.actions_per_hour as f64;
        if (tiled - self.planning.hour_secs).abs() > 1e-6 {
            return Err(EngineError::config(format!(
                "actions_per_hour × action_secs ({}) must equal hour_secs ({})",
                tiled, self.planning.hour_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.planning.critical_threshold) {
            return Err(EngineError::config(
                "planning.critical_threshold must be within [0, 1]",
            ));
        }
        if self.planning.divergence_factor <= 1.0 || self.planning.overrun_factor <= 1.0 {
            return Err(EngineError::config(
                "divergence and overrun factors must exceed 1.0",
            ));
        }
        if !(0.0..=1.0).contains(&self.relationship.hourly_decay)
            || !(0.0..=1.0).contains(&self.relationship.affinity_hourly_decay)
        {
            return Err(EngineError::config(
                "relationship decay factors must be within [0, 1]",
            ));
        }
        if self.relationship.history_cap == 0 {
            return Err(EngineError::config(
                "relationship.history_cap must be at least 1",
            ));
        }
        if self.provider.generation_timeout_secs <= 0.0
            || self.provider.embedding_timeout_secs <= 0.0
        {
            return Err(EngineError::config("provider timeouts must be positive"));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

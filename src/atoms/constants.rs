// ── Warren Atoms: Constants ────────────────────────────────────────────────
// All named tunable defaults for the engine live here.
// Rationale: collecting constants in one place eliminates magic numbers,
// makes auditing easier, and keeps every layer's code self-documenting.
// Every value below is a default — the live value comes from `EngineConfig`.

// ── Memory store ───────────────────────────────────────────────────────────
// Retention score = RECENCY_WEIGHT·recency + IMPORTANCE_WEIGHT·importance/10.
// Eviction removes the lowest-retention records once the store exceeds
// capacity; ties are broken by oldest creation time.
pub const DEFAULT_MEMORY_CAPACITY: usize = 1000;
pub const DEFAULT_RETENTION_RECENCY_WEIGHT: f64 = 0.4;
pub const DEFAULT_RETENTION_IMPORTANCE_WEIGHT: f64 = 0.6;

// ── Retrieval ──────────────────────────────────────────────────────────────
// Recency decays as exp(-Δt_hours · ln2 / half_life): a record last touched
// exactly one half-life ago scores 0.5.
pub const DEFAULT_RECENCY_HALF_LIFE_HOURS: f64 = 24.0;
// Combined score = recency + importance/10 + cosine relevance, unit weights.
pub const DEFAULT_RECENCY_WEIGHT: f64 = 1.0;
pub const DEFAULT_IMPORTANCE_WEIGHT: f64 = 1.0;
pub const DEFAULT_RELEVANCE_WEIGHT: f64 = 1.0;

// ── Reflection ─────────────────────────────────────────────────────────────
// Accumulated observation importance that triggers a synthesis pass.
pub const DEFAULT_REFLECTION_THRESHOLD: f32 = 150.0;
// Fallback trigger: reflect anyway after this much game time without one.
pub const DEFAULT_REFLECTION_INTERVAL_HOURS: f64 = 2.0;
// Evidence selection: most recent N observations at or above the floor.
pub const DEFAULT_EVIDENCE_WINDOW: usize = 100;
pub const DEFAULT_EVIDENCE_IMPORTANCE_FLOOR: f32 = 5.0;
// Supporting records retrieved per reflection question (useful range 10–20).
pub const DEFAULT_EVIDENCE_PER_QUESTION: usize = 15;
// Questions requested per pass (the grammar accepts 1–5).
pub const DEFAULT_MAX_QUESTIONS: usize = 3;
// Level-n reflections not yet cited by a level-(n+1) record before a
// meta-reflection is synthesized over them.
pub const DEFAULT_META_FAN_IN: usize = 5;

// ── Planning ───────────────────────────────────────────────────────────────
// A daily plan decomposes into exactly HOURLY_COUNT contiguous hour windows,
// each into ACTIONS_PER_HOUR contiguous action windows. Durations must sum
// exactly — `TimeWindow::validate_children` enforces this at construction.
pub const DEFAULT_HOURLY_COUNT: usize = 3;
pub const DEFAULT_HOUR_SECS: f64 = 3600.0;
pub const DEFAULT_ACTIONS_PER_HOUR: usize = 12;
pub const DEFAULT_ACTION_SECS: f64 = 300.0;
// Survival metric below this value forces a re-plan.
pub const DEFAULT_CRITICAL_SURVIVAL_THRESHOLD: f32 = 0.2;
// Re-plan when distance to a movement target exceeds this multiple of the
// previously observed distance.
pub const DEFAULT_DIVERGENCE_FACTOR: f64 = 1.5;
// Re-plan when an in-progress action has run this multiple of its window.
pub const DEFAULT_OVERRUN_FACTOR: f64 = 3.0;

// ── Relationships ──────────────────────────────────────────────────────────
pub const INITIAL_FAMILIARITY: f32 = 0.1;
pub const INITIAL_AFFINITY: f32 = 0.0;
pub const INITIAL_TRUST: f32 = 0.5;
pub const DEFAULT_FAMILIARITY_STEP: f32 = 0.05;
pub const DEFAULT_AFFINITY_STEP: f32 = 0.1;
pub const DEFAULT_TRUST_STEP: f32 = 0.02;
// Familiarity and trust multiply by this factor per idle game hour.
pub const DEFAULT_HOURLY_DECAY: f32 = 0.99;
// Affinity decay is disabled by default (1.0 = no decay) — emotional
// valence persists unless explicitly configured otherwise.
pub const DEFAULT_AFFINITY_HOURLY_DECAY: f32 = 1.0;
// Recent interaction summaries kept per relationship (ring buffer).
pub const DEFAULT_INTERACTION_HISTORY_CAP: usize = 10;

// ── Providers ──────────────────────────────────────────────────────────────
// Wall-clock timeouts on the external services. A timed-out generation
// request resolves to its deterministic fallback; a timed-out embedding
// degrades retrieval to importance-only ranking.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: f64 = 10.0;

// ── Mind: Reflection Engine ────────────────────────────────────────────────
//
// Threshold-triggered synthesis of higher-level insights.
//
// Trigger: a running sum of observation importance (reset to exactly 0 on
// every pass — never negative, never carrying a remainder) or a fallback
// game-time interval. A pass selects recent high-importance observations as
// evidence, asks the generation service for open-ended questions, retrieves
// supporting records per question, and stores each synthesized answer as a
// reflection record citing its evidence.
//
// The reflection hierarchy is a flat arena: records carry a level and
// explicit citation links, never nesting. When enough level-n reflections
// are not yet cited by any level-(n+1) record, a meta pass synthesizes one
// over them; the same rule recurses upward.
//
// Serialization with the single generation slot: the service-backed pass is
// a multi-tick state machine driven by the engine facade. When the slot is
// busy at trigger time, the whole pass runs here on the deterministic
// templated path instead — the trigger semantics never depend on slot state.

use crate::atoms::config::ReflectionConfig;
use crate::atoms::memory_types::{MemoryKind, MemoryRecord};
use crate::atoms::types::GameTime;
use crate::engine::mind::grammar;
use crate::engine::mind::retrieval::RetrievalEngine;
use crate::engine::mind::store::MemoryStore;
use log::{info, warn};
use std::collections::{HashSet, VecDeque};

/// Question used for every meta-reflection pass.
pub const META_QUESTION: &str = "What broader pattern connects these insights?";

/// Where the service-backed pass currently stands. Driven by the facade as
/// slot results land; `Idle` between passes.
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectionStage {
    Idle,
    /// Questions request issued; waiting for it to resolve.
    AwaitingQuestions,
    /// Questions known; answering them one request at a time.
    Answering { remaining: VecDeque<String> },
}

pub struct ReflectionEngine {
    config: ReflectionConfig,
    importance_sum: f32,
    last_reflection: GameTime,
    stage: ReflectionStage,
}

impl ReflectionEngine {
    pub fn new(config: ReflectionConfig) -> Self {
        ReflectionEngine {
            config,
            importance_sum: 0.0,
            last_reflection: GameTime::ZERO,
            stage: ReflectionStage::Idle,
        }
    }

    pub fn config(&self) -> &ReflectionConfig {
        &self.config
    }

    /// Current accumulated importance (exposed for inspection and tests).
    pub fn importance_sum(&self) -> f32 {
        self.importance_sum
    }

    pub fn stage(&self) -> &ReflectionStage {
        &self.stage
    }

    /// Every stored observation feeds the accumulator.
    pub fn note_observation(&mut self, importance: f32) {
        self.importance_sum += importance;
    }

    /// Whether a pass should start now: accumulated importance reached the
    /// threshold, or the fallback interval elapsed without one.
    pub fn due(&self, now: GameTime) -> bool {
        self.importance_sum >= self.config.threshold
            || now.hours_since(self.last_reflection) >= self.config.interval_hours
    }

    /// Start a pass: reset the accumulator to exactly 0 and restart the
    /// fallback timer. Stage bookkeeping is separate so the deterministic
    /// path can skip it.
    pub fn begin_pass(&mut self, now: GameTime) {
        self.importance_sum = 0.0;
        self.last_reflection = now;
    }

    // ── Stage transitions (service-backed pass) ─────────────────────────

    pub fn await_questions(&mut self) {
        self.stage = ReflectionStage::AwaitingQuestions;
    }

    /// Record the resolved (or fallback) questions and move to answering.
    pub fn questions_ready(&mut self, questions: Vec<String>) {
        self.stage = ReflectionStage::Answering {
            remaining: questions.into(),
        };
    }

    /// Next question to answer, if the pass is in the answering stage.
    pub fn next_question(&mut self) -> Option<String> {
        match &mut self.stage {
            ReflectionStage::Answering { remaining } => {
                let question = remaining.pop_front();
                if question.is_none() {
                    self.stage = ReflectionStage::Idle;
                }
                question
            }
            _ => None,
        }
    }

    pub fn finish_pass(&mut self) {
        self.stage = ReflectionStage::Idle;
    }

    // ── Evidence and record helpers ─────────────────────────────────────

    /// Evidence selection: the most recent N observations at or above the
    /// importance floor, newest first.
    pub fn select_evidence<'a>(&self, store: &'a MemoryStore) -> Vec<&'a MemoryRecord> {
        store.recent_observations(self.config.evidence_window, self.config.importance_floor)
    }

    /// Reflection importance: the [7, 9] band, positioned by the mean
    /// importance of the evidence.
    pub fn reflection_importance(evidence_importances: &[f32]) -> f32 {
        if evidence_importances.is_empty() {
            return grammar::FALLBACK_REFLECTION_IMPORTANCE;
        }
        let mean: f32 =
            evidence_importances.iter().sum::<f32>() / evidence_importances.len() as f32;
        (7.0 + 2.0 * (mean / 10.0)).clamp(7.0, 9.0)
    }

    /// The lowest level (≥1) whose uncited reflection count has reached the
    /// meta fan-in, with exactly fan-in record ids (oldest first).
    pub fn meta_candidates(&self, store: &MemoryStore) -> Option<(u8, Vec<String>)> {
        for level in 1..=u8::MAX - 1 {
            let at_level: Vec<&MemoryRecord> = store
                .query(|r| r.kind == MemoryKind::Reflection && r.level == level)
                .collect();
            if at_level.is_empty() {
                // Levels are built bottom-up; nothing above an empty level.
                return None;
            }
            let cited: HashSet<&str> = store
                .query(|r| r.kind == MemoryKind::Reflection && r.level == level + 1)
                .flat_map(|r| r.citations.iter().map(|c| c.as_str()))
                .collect();
            let uncited: Vec<String> = at_level
                .iter()
                .filter(|r| !cited.contains(r.id.as_str()))
                .map(|r| r.id.clone())
                .collect();
            if uncited.len() >= self.config.meta_fan_in {
                return Some((
                    level + 1,
                    uncited.into_iter().take(self.config.meta_fan_in).collect(),
                ));
            }
        }
        None
    }

    // ── Deterministic pass ──────────────────────────────────────────────

    /// Run an entire pass on the templated path: no generation service,
    /// importance-only retrieval, extractive answers. Used when the request
    /// slot is busy at trigger time; also the shape every service failure
    /// degrades to. Returns the number of reflections stored.
    pub fn run_deterministic_pass(
        &mut self,
        store: &mut MemoryStore,
        retrieval: &RetrievalEngine,
        now: GameTime,
    ) -> usize {
        self.begin_pass(now);
        let evidence_count = self.select_evidence(store).len();
        if evidence_count == 0 {
            return 0;
        }
        let questions = grammar::fallback_questions(self.config.max_questions);
        let mut stored = 0usize;
        for question in &questions {
            let supporting =
                retrieval.retrieve_importance_only(store, self.config.evidence_per_question, now);
            if supporting.is_empty() {
                continue;
            }
            let citations: Vec<String> =
                supporting.iter().map(|s| s.record.id.clone()).collect();
            let contents: Vec<&str> = supporting
                .iter()
                .map(|s| s.record.content.as_str())
                .collect();
            let importances: Vec<f32> =
                supporting.iter().map(|s| s.record.importance).collect();
            let content = format!("{} — {}", question, grammar::fallback_answer(&contents));
            let importance = Self::reflection_importance(&importances);
            match MemoryRecord::reflection(content, importance, now, citations, 1)
                .and_then(|record| store.add(record, now))
            {
                Ok(_) => stored += 1,
                Err(e) => warn!("[mind:reflect] Failed to store fallback reflection: {}", e),
            }
        }
        // Meta levels, same deterministic shape, repeated while due.
        while let Some((level, ids)) = self.meta_candidates(store) {
            if self.store_meta_reflection(store, level, ids, now).is_none() {
                break;
            }
            stored += 1;
        }
        info!(
            "[mind:reflect] Deterministic pass stored {} reflection(s)",
            stored
        );
        stored
    }

    /// Extractive meta-reflection over the given lower-level records.
    pub fn store_meta_reflection(
        &self,
        store: &mut MemoryStore,
        level: u8,
        ids: Vec<String>,
        now: GameTime,
    ) -> Option<String> {
        let contents: Vec<&str> = ids
            .iter()
            .filter_map(|id| store.get(id))
            .map(|r| r.content.as_str())
            .collect();
        if contents.is_empty() {
            return None;
        }
        let importances: Vec<f32> = ids
            .iter()
            .filter_map(|id| store.get(id))
            .map(|r| r.importance)
            .collect();
        let content = format!("{} — {}", META_QUESTION, grammar::fallback_answer(&contents));
        let importance = Self::reflection_importance(&importances);
        let record = MemoryRecord::reflection(content, importance, now, ids, level).ok()?;
        store.add(record, now).ok()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

// ── Warren Mind: Cognitive Engine ──────────────────────────────────────────
//
// Per-agent facade wiring the five components together and driving them from
// the external simulation tick:
//
//   perception context → retrieval (read-only) → planning (may re-plan)
//   → action intent out → observations appended → reflection trigger
//
// Sub-modules:
//   - store:        bounded append-only record log with retention eviction
//   - retrieval:    recency/importance/relevance scoring and ranking
//   - reflection:   threshold-triggered insight synthesis, flat level arena
//   - planning:     Daily → Hourly → Action tree and re-plan triggers
//   - relationship: per-pair familiarity/affinity/trust with idle decay
//   - grammar:      strict response-field grammar and total fallbacks
//   - inflight:     the single-request slot state machine
//
// Concurrency model: one logical thread of control per agent. Only provider
// calls suspend; the generation service is reached exclusively through the
// request slot (at most one in flight, results applied between ticks), and
// embedding calls are awaited inline with their own deadline and fallback.
// Nothing here ever mutates another agent's state.

pub mod grammar;
pub mod inflight;
pub mod planning;
pub mod reflection;
pub mod relationship;
pub mod retrieval;
pub mod store;

pub use inflight::{RequestPurpose, RequestSlot};
pub use planning::{PlanningEngine, ReplanReason};
pub use reflection::{ReflectionEngine, ReflectionStage, META_QUESTION};
pub use relationship::RelationshipMemory;
pub use retrieval::RetrievalEngine;
pub use store::MemoryStore;

use crate::atoms::config::EngineConfig;
use crate::atoms::error::EngineResult;
use crate::atoms::memory_types::{
    MemoryRecord, RelationshipSummary, ScoredRecord,
};
use crate::atoms::plan_types::DailyPlan;
use crate::atoms::traits::{EmbeddingClient, GenerationClient};
use crate::atoms::types::{
    ActionIntent, GameTime, Interaction, PerceptionContext, Position,
};
use log::{info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Importance given to archived plan-history records.
const PLAN_HISTORY_IMPORTANCE: f32 = 5.0;

/// Records shown in the inspection snapshot.
const SNAPSHOT_RECENT_MEMORIES: usize = 20;

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: Inspection Snapshot
// ═══════════════════════════════════════════════════════════════════════════

/// Read-only view of the engine refreshed at the end of every tick, shared
/// behind a lock so a debugging/visualization collaborator can poll it
/// without touching the engine itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectionSnapshot {
    pub agent_id: String,
    pub time: GameTime,
    pub plan: Option<DailyPlan>,
    pub abandoned_plans: usize,
    pub recent_memories: Vec<MemoryRecord>,
    pub memory_count: usize,
    pub relationships: Vec<RelationshipSummary>,
    /// Label of the in-flight generation request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_request: Option<String>,
    pub reflection_importance_sum: f32,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: Engine
// ═══════════════════════════════════════════════════════════════════════════

pub struct CognitiveEngine {
    agent_id: String,
    config: EngineConfig,
    store: MemoryStore,
    retrieval: RetrievalEngine,
    reflection: ReflectionEngine,
    planning: PlanningEngine,
    relationships: RelationshipMemory,
    slot: RequestSlot,
    generation: Arc<dyn GenerationClient>,
    clock: GameTime,
    last_decay: GameTime,
    inspection: Arc<RwLock<InspectionSnapshot>>,
}

impl CognitiveEngine {
    /// Build an engine for one agent. The only fallible part is config
    /// validation — bad thresholds and capacities are rejected here, never
    /// discovered mid-simulation.
    pub fn new(
        agent_id: impl Into<String>,
        config: EngineConfig,
        generation: Arc<dyn GenerationClient>,
        embedding: Arc<dyn EmbeddingClient>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let agent_id = agent_id.into();
        let store = MemoryStore::new(config.memory.clone(), config.retrieval.half_life_hours)?;
        let retrieval = RetrievalEngine::new(
            embedding,
            config.retrieval.clone(),
            Duration::from_secs_f64(config.provider.embedding_timeout_secs),
        );
        let reflection = ReflectionEngine::new(config.reflection.clone());
        let planning = PlanningEngine::new(config.planning.clone());
        let relationships = RelationshipMemory::new(&agent_id, config.relationship.clone());
        let slot = RequestSlot::new(Duration::from_secs_f64(
            config.provider.generation_timeout_secs,
        ));
        info!(
            "[mind] Engine ready for {} (generation: {}, capacity: {})",
            agent_id,
            generation.model_name(),
            store.capacity()
        );
        Ok(CognitiveEngine {
            agent_id,
            config,
            store,
            retrieval,
            reflection,
            planning,
            relationships,
            slot,
            generation,
            clock: GameTime::ZERO,
            last_decay: GameTime::ZERO,
            inspection: Arc::new(RwLock::new(InspectionSnapshot::default())),
        })
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Handle for the inspection collaborator. Cheap to clone; refreshed at
    /// the end of every tick.
    pub fn inspection(&self) -> Arc<RwLock<InspectionSnapshot>> {
        Arc::clone(&self.inspection)
    }

    // ── Tick loop ───────────────────────────────────────────────────────

    /// One simulation tick. Applies any resolved generation request,
    /// evaluates re-plan triggers (before any intent escapes this tick),
    /// emits the current leaf action, and evaluates the reflection trigger.
    /// Never fails on provider trouble — only on logic defects.
    pub async fn tick(&mut self, ctx: &PerceptionContext) -> EngineResult<Option<ActionIntent>> {
        self.clock = ctx.time;

        // 1. Resolved request lands atomically, before anything reads state.
        self.apply_resolved(ctx).await?;

        // 2. Re-plan triggers — a stale action must be discarded before any
        //    intent for this tick is emitted.
        if let Some(reason) = self.planning.evaluate_triggers(ctx) {
            self.replan(ctx, &reason)?;
        } else if !self.planning.has_plan() {
            self.bootstrap_plan(ctx)?;
        }

        // 3. Current leaf action.
        let intent = self.planning.poll_intent(ctx.time);

        // 4. Reflection trigger.
        self.evaluate_reflection().await?;

        // 5. Idle relationship decay, once per game hour.
        let idle_hours = self.clock.hours_since(self.last_decay);
        if idle_hours >= 1.0 {
            self.relationships.apply_decay(self.clock, idle_hours);
            self.last_decay = self.clock;
        }

        // 6. Publish the snapshot.
        self.refresh_inspection();
        Ok(intent)
    }

    // ── External inputs ─────────────────────────────────────────────────

    /// Append an observation (the actuation collaborator reports what
    /// actually happened). Embeds inline when the service cooperates;
    /// stores without a vector otherwise. Feeds the reflection accumulator.
    pub async fn observe(
        &mut self,
        content: impl Into<String>,
        importance: f32,
        position: Option<Position>,
    ) -> EngineResult<String> {
        let mut record = MemoryRecord::observation(content, importance, self.clock)?;
        if let Some(position) = position {
            record = record.with_position(position);
        }
        if let Some(vector) = self.retrieval.embed_text(&record.content).await {
            record = record.with_embedding(vector);
        } else {
            warn!(
                "[mind] Storing observation without embedding (semantic recall will miss it)"
            );
        }
        let id = self.store.add(record, self.clock)?;
        self.reflection.note_observation(importance);
        Ok(id)
    }

    /// The world finished executing an action.
    pub fn complete_action(&mut self, action_id: &str) -> EngineResult<()> {
        self.planning.complete_action(action_id, self.clock)
    }

    /// Record an interaction with another agent, unilaterally, from the
    /// shared perception snapshot.
    pub fn record_interaction(&mut self, other: &str, interaction: &Interaction) {
        self.relationships
            .record_interaction(other, interaction, self.clock);
    }

    /// Query memory on behalf of a collaborator (dialogue, debugging).
    pub async fn recall(&mut self, query: &str, k: usize) -> Vec<ScoredRecord> {
        self.retrieval
            .retrieve(&mut self.store, query, k, self.clock)
            .await
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.store
    }

    pub fn plan(&self) -> Option<&DailyPlan> {
        self.planning.current_plan()
    }

    pub fn relationships(&self) -> &RelationshipMemory {
        &self.relationships
    }

    // ── Planning orchestration ──────────────────────────────────────────

    /// Abandon the current tree (archiving a history record), install the
    /// deterministic stopgap plan, and ask the generation service for a
    /// better one if the slot is free.
    fn replan(&mut self, ctx: &PerceptionContext, reason: &ReplanReason) -> EngineResult<()> {
        if let Some(summary) = self.planning.abandon_current(reason) {
            self.archive_plan_summary(&summary);
        }
        self.bootstrap_plan(ctx)
    }

    fn bootstrap_plan(&mut self, ctx: &PerceptionContext) -> EngineResult<()> {
        let plan = self.planning.heuristic_plan(ctx, self.clock)?;
        self.planning.install(plan);
        self.request_generated_plan(ctx);
        Ok(())
    }

    /// Issue a daily-plan request if the slot is free. Rejection is normal —
    /// the heuristic plan keeps the agent acting until resolution.
    fn request_generated_plan(&mut self, ctx: &PerceptionContext) {
        let situation = format!(
            "time {:.0}s, at {}, hunger {:.2}, thirst {:.2}, energy {:.2}, health {:.2}",
            ctx.time.as_secs(),
            ctx.position,
            ctx.survival.hunger,
            ctx.survival.thirst,
            ctx.survival.energy,
            ctx.survival.health
        );
        let memories: Vec<String> = self
            .store
            .recent_observations(5, 1.0)
            .iter()
            .map(|r| r.content.clone())
            .collect();
        let mut reflections: Vec<String> = self
            .store
            .query(|r| r.kind == crate::atoms::memory_types::MemoryKind::Reflection)
            .map(|r| r.content.clone())
            .collect();
        let keep = reflections.len().saturating_sub(3);
        reflections.drain(..keep);
        let prompt = grammar::daily_plan_prompt(
            &situation,
            &memories,
            &reflections,
            self.config.planning.hourly_count,
        );
        self.slot
            .try_issue(self.generation.clone(), prompt, RequestPurpose::DailyPlan);
    }

    fn archive_plan_summary(&mut self, summary: &str) {
        match MemoryRecord::plan(summary, PLAN_HISTORY_IMPORTANCE, self.clock) {
            Ok(record) => {
                let _ = self.store.add(record, self.clock);
            }
            Err(e) => warn!("[mind:plan] Failed to archive plan summary: {}", e),
        }
    }

    // ── Request application ─────────────────────────────────────────────

    /// Apply a resolved generation request. Runs first in the tick, so the
    /// rest of the tick sees either the old state or the fully applied new
    /// state — never something in between.
    async fn apply_resolved(&mut self, ctx: &PerceptionContext) -> EngineResult<()> {
        let Some((purpose, result)) = self.slot.poll() else {
            return Ok(());
        };
        match purpose {
            RequestPurpose::DailyPlan => self.apply_plan_result(ctx, result)?,
            RequestPurpose::ReflectionQuestions { .. } => {
                self.apply_questions_result(result).await?;
            }
            RequestPurpose::ReflectionAnswer {
                question,
                evidence_ids,
                level,
            } => {
                self.apply_answer_result(question, evidence_ids, level, result)
                    .await?;
            }
        }
        Ok(())
    }

    fn apply_plan_result(
        &mut self,
        ctx: &PerceptionContext,
        result: EngineResult<String>,
    ) -> EngineResult<()> {
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                // Named fallback: the stopgap heuristic plan stays in place.
                warn!("[mind:plan] Generation failed ({}); keeping heuristic plan", e);
                return Ok(());
            }
        };
        let parsed = grammar::parse_plan_response(&text, self.config.planning.hourly_count);
        if parsed.is_empty() {
            warn!(
                "[mind:plan] {}",
                crate::atoms::error::EngineError::GenerationParse(
                    "no plan fields found; composing from fallbacks".to_string()
                )
            );
        }
        let plan = self.planning.plan_from_response(&parsed, ctx, self.clock)?;
        if let Some(summary) = self.planning.abandon_current(&ReplanReason::Superseded) {
            self.archive_plan_summary(&summary);
        }
        self.planning.install(plan);
        Ok(())
    }

    async fn apply_questions_result(&mut self, result: EngineResult<String>) -> EngineResult<()> {
        let max = self.config.reflection.max_questions;
        let questions = match result {
            Ok(text) => {
                let parsed = grammar::parse_question_response(&text, max);
                if parsed.is_empty() {
                    warn!("[mind:reflect] No questions parsed; using templates");
                    grammar::fallback_questions(max)
                } else {
                    parsed
                }
            }
            Err(e) => {
                warn!("[mind:reflect] Question generation failed ({}); using templates", e);
                grammar::fallback_questions(max)
            }
        };
        self.reflection.questions_ready(questions);
        self.advance_reflection().await;
        Ok(())
    }

    async fn apply_answer_result(
        &mut self,
        question: String,
        evidence_ids: Vec<String>,
        level: u8,
        result: EngineResult<String>,
    ) -> EngineResult<()> {
        let contents: Vec<String> = evidence_ids
            .iter()
            .filter_map(|id| self.store.get(id))
            .map(|r| r.content.clone())
            .collect();
        let importances: Vec<f32> = evidence_ids
            .iter()
            .filter_map(|id| self.store.get(id))
            .map(|r| r.importance)
            .collect();
        let content_refs: Vec<&str> = contents.iter().map(|s| s.as_str()).collect();

        let (insight, importance) = match result {
            Ok(text) => {
                let parsed = grammar::parse_insight_response(&text);
                (
                    parsed
                        .insight
                        .unwrap_or_else(|| grammar::fallback_answer(&content_refs)),
                    parsed
                        .importance
                        .unwrap_or_else(|| ReflectionEngine::reflection_importance(&importances)),
                )
            }
            Err(e) => {
                warn!("[mind:reflect] Answer generation failed ({}); extracting from evidence", e);
                (
                    grammar::fallback_answer(&content_refs),
                    ReflectionEngine::reflection_importance(&importances),
                )
            }
        };

        let content = format!("{} — {}", question, insight);
        let mut record =
            MemoryRecord::reflection(content, importance, self.clock, evidence_ids, level)?;
        if let Some(vector) = self.retrieval.embed_text(&record.content).await {
            record = record.with_embedding(vector);
        }
        let id = self.store.add(record, self.clock)?;
        info!("[mind:reflect] Stored level-{} reflection {}", level, id);

        // Next question, or the meta check once the queue drains.
        self.advance_reflection().await;
        Ok(())
    }

    // ── Reflection orchestration ────────────────────────────────────────

    /// Start a pass when due. With the slot busy, the entire pass runs on
    /// the deterministic path right now; otherwise the questions request
    /// goes out and the pass continues as results land.
    async fn evaluate_reflection(&mut self) -> EngineResult<()> {
        if !self.reflection.due(self.clock)
            || *self.reflection.stage() != ReflectionStage::Idle
        {
            return Ok(());
        }
        let evidence = self.reflection.select_evidence(&self.store);
        if evidence.is_empty() {
            // Nothing to reflect over; reset the trigger and move on.
            self.reflection.begin_pass(self.clock);
            return Ok(());
        }
        if self.slot.is_pending() {
            self.reflection
                .run_deterministic_pass(&mut self.store, &self.retrieval, self.clock);
            return Ok(());
        }
        let evidence_ids: Vec<String> = evidence.iter().map(|r| r.id.clone()).collect();
        let contents: Vec<String> = evidence.iter().map(|r| r.content.clone()).collect();
        self.reflection.begin_pass(self.clock);
        let prompt = grammar::questions_prompt(&contents, self.config.reflection.max_questions);
        if self.slot.try_issue(
            self.generation.clone(),
            prompt,
            RequestPurpose::ReflectionQuestions { evidence_ids },
        ) {
            self.reflection.await_questions();
        } else {
            self.reflection
                .run_deterministic_pass(&mut self.store, &self.retrieval, self.clock);
        }
        Ok(())
    }

    /// Drive the answering stage: retrieve support for the next question and
    /// issue its answer request; once the queue drains, look for meta work.
    async fn advance_reflection(&mut self) {
        while let Some(question) = self.reflection.next_question() {
            let k = self.config.reflection.evidence_per_question;
            let supporting = self
                .retrieval
                .retrieve(&mut self.store, &question, k, self.clock)
                .await;
            if supporting.is_empty() {
                continue;
            }
            let evidence_ids: Vec<String> =
                supporting.iter().map(|s| s.record.id.clone()).collect();
            let contents: Vec<String> =
                supporting.iter().map(|s| s.record.content.clone()).collect();
            let prompt = grammar::answer_prompt(&question, &contents);
            if self.slot.try_issue(
                self.generation.clone(),
                prompt,
                RequestPurpose::ReflectionAnswer {
                    question: question.clone(),
                    evidence_ids: evidence_ids.clone(),
                    level: 1,
                },
            ) {
                return; // resumes when the answer lands
            }
            // Slot taken — finish this question deterministically.
            let refs: Vec<&str> = contents.iter().map(|s| s.as_str()).collect();
            let importances: Vec<f32> =
                supporting.iter().map(|s| s.record.importance).collect();
            let content = format!("{} — {}", question, grammar::fallback_answer(&refs));
            let importance = ReflectionEngine::reflection_importance(&importances);
            if let Ok(record) =
                MemoryRecord::reflection(content, importance, self.clock, evidence_ids, 1)
            {
                let _ = self.store.add(record, self.clock);
            }
        }
        self.maybe_meta();
    }

    /// Synthesize meta-reflections while the fan-in rule is satisfied. The
    /// service path handles one level per resolved request; the deterministic
    /// path runs inline.
    fn maybe_meta(&mut self) {
        while let Some((level, ids)) = self.reflection.meta_candidates(&self.store) {
            let contents: Vec<String> = ids
                .iter()
                .filter_map(|id| self.store.get(id))
                .map(|r| r.content.clone())
                .collect();
            let prompt = grammar::answer_prompt(META_QUESTION, &contents);
            if self.slot.try_issue(
                self.generation.clone(),
                prompt,
                RequestPurpose::ReflectionAnswer {
                    question: META_QUESTION.to_string(),
                    evidence_ids: ids.clone(),
                    level,
                },
            ) {
                return; // resumes when the answer lands
            }
            if self
                .reflection
                .store_meta_reflection(&mut self.store, level, ids, self.clock)
                .is_none()
            {
                return;
            }
        }
    }

    // ── Inspection ──────────────────────────────────────────────────────

    fn refresh_inspection(&self) {
        let recent: Vec<MemoryRecord> = {
            let records = self.store.records();
            let skip = records.len().saturating_sub(SNAPSHOT_RECENT_MEMORIES);
            records[skip..].iter().rev().cloned().collect()
        };
        let snapshot = InspectionSnapshot {
            agent_id: self.agent_id.clone(),
            time: self.clock,
            plan: self.planning.current_plan().cloned(),
            abandoned_plans: self.planning.history().len(),
            recent_memories: recent,
            memory_count: self.store.len(),
            relationships: self.relationships.summaries(),
            pending_request: self.slot.pending_label().map(|s| s.to_string()),
            reflection_importance_sum: self.reflection.importance_sum(),
        };
        *self.inspection.write() = snapshot;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::providers::scripted::{
        HashEmbedding, ScriptedGeneration, StallingGeneration,
    };

    fn make_engine(generation: Arc<dyn GenerationClient>) -> CognitiveEngine {
        CognitiveEngine::new(
            "tester",
            EngineConfig::default(),
            generation,
            Arc::new(HashEmbedding::new(64)),
        )
        .unwrap()
    }

    fn ctx_at(secs: f64) -> PerceptionContext {
        PerceptionContext {
            time: GameTime::from_secs(secs),
            ..PerceptionContext::default()
        }
    }

    #[test]
    fn construction_rejects_bad_config() {
        let mut config = EngineConfig::default();
        config.memory.capacity = 0;
        let result = CognitiveEngine::new(
            "tester",
            config,
            Arc::new(ScriptedGeneration::always("")),
            Arc::new(HashEmbedding::new(8)),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn first_tick_bootstraps_a_plan_and_emits_an_intent() {
        let mut engine = make_engine(Arc::new(StallingGeneration::new()));
        let intent = engine.tick(&ctx_at(0.0)).await.unwrap();
        assert!(intent.is_some(), "stopgap plan must produce an action");
        assert!(engine.plan().is_some());
        // The generation request went out alongside.
        assert_eq!(
            engine.inspection().read().pending_request.as_deref(),
            Some("daily_plan")
        );
    }

    #[tokio::test]
    async fn critical_survival_discards_stale_action_before_intent() {
        let mut engine = make_engine(Arc::new(StallingGeneration::new()));
        engine.tick(&ctx_at(0.0)).await.unwrap();
        let old_goal = engine.plan().unwrap().goal.clone();
        assert_eq!(old_goal, "continue exploring");

        let mut ctx = ctx_at(10.0);
        ctx.survival.thirst = 0.05;
        let intent = engine.tick(&ctx).await.unwrap().unwrap();

        // The intent emitted THIS tick already belongs to the new plan.
        let plan = engine.plan().unwrap();
        assert_eq!(plan.goal, "find water and drink");
        assert!(plan
            .hours
            .iter()
            .flat_map(|h| h.actions.iter())
            .any(|a| a.id == intent.action_id));
        assert_eq!(engine.inspection().read().abandoned_plans, 1);
        // The abandoned plan left a history record behind.
        assert!(engine
            .memory()
            .query(|r| r.kind == crate::atoms::memory_types::MemoryKind::Plan)
            .any(|r| r.content.contains(&old_goal)));
    }

    #[tokio::test]
    async fn resolved_plan_supersedes_heuristic_between_ticks() {
        let generation = Arc::new(ScriptedGeneration::always(
            "GOAL: map the eastern maze\nREASONING: unexplored\nPRIORITY: high\n\
             HOUR_1: walk east\nHOUR_2: chart junctions\nHOUR_3: return\n",
        ));
        let mut engine = make_engine(generation);
        engine.tick(&ctx_at(0.0)).await.unwrap();
        assert_eq!(engine.plan().unwrap().goal, "continue exploring");

        // Give the spawned request time to resolve, then tick again.
        tokio::time::sleep(Duration::from_millis(20)).await;
        engine.tick(&ctx_at(1.0)).await.unwrap();
        let plan = engine.plan().unwrap();
        assert_eq!(plan.goal, "map the eastern maze");
        assert_eq!(plan.hours[0].objective, "walk east");
        // The heuristic stopgap went to history as superseded.
        assert_eq!(engine.inspection().read().abandoned_plans, 1);
    }

    #[tokio::test]
    async fn observations_accumulate_and_trigger_reflection() {
        let mut config = EngineConfig::default();
        config.reflection.threshold = 15.0;
        config.reflection.importance_floor = 1.0;
        let mut engine = CognitiveEngine::new(
            "tester",
            config,
            Arc::new(StallingGeneration::new()),
            Arc::new(HashEmbedding::new(64)),
        )
        .unwrap();

        engine.tick(&ctx_at(0.0)).await.unwrap(); // slot now busy (plan request)
        engine.observe("ate berries near the well", 5.0, None).await.unwrap();
        engine.observe("heard water dripping", 6.0, None).await.unwrap();
        engine.observe("met another agent", 5.0, None).await.unwrap();

        // Sum is 16 ≥ 15 → the busy slot forces the deterministic pass.
        engine.tick(&ctx_at(10.0)).await.unwrap();
        let reflections = engine
            .memory()
            .query(|r| r.kind == crate::atoms::memory_types::MemoryKind::Reflection)
            .count();
        assert!(reflections >= 1, "deterministic pass must store insights");
        assert_eq!(engine.inspection().read().reflection_importance_sum, 0.0);
    }

    #[tokio::test]
    async fn inspection_snapshot_tracks_state() {
        let mut engine = make_engine(Arc::new(StallingGeneration::new()));
        let handle = engine.inspection();
        engine.observe("first memory", 4.0, Some(Position::new(1, 2))).await.unwrap();
        engine.tick(&ctx_at(5.0)).await.unwrap();

        let snapshot = handle.read().clone();
        assert_eq!(snapshot.agent_id, "tester");
        assert_eq!(snapshot.memory_count, 1);
        assert_eq!(snapshot.recent_memories.len(), 1);
        assert!(snapshot.plan.is_some());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("first memory"));
    }
}

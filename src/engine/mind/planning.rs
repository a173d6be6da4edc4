// ── Mind: Planning Engine ──────────────────────────────────────────────────
//
// Owns the three-level time-indexed plan tree (Daily → Hourly → Action) and
// keeps it internally consistent under interruption.
//
// Responsibilities:
//   - Compose plans: from a parsed generation response (per-field fallbacks)
//     or fully heuristically (most depleted survival need, or "continue
//     exploring"). Either path builds the complete tree at once —
//     3 contiguous hours × 12 contiguous 5-minute actions, validated.
//   - Surface the current leaf action for a point in time; None past the
//     plan's span signals that re-planning is needed.
//   - Evaluate the four re-plan triggers once per tick.
//   - Abandon, never mutate: a discarded tree is marked abandoned with a
//     reason and moved to history intact.

use crate::atoms::config::PlanningConfig;
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::plan_types::{
    ActionPlan, DailyPlan, HourlyPlan, PlanPriority, PlanStatus, TimeWindow,
};
use crate::atoms::types::{
    ActionIntent, ActionTarget, ActionType, GameTime, PerceptionContext, SurvivalNeed,
};
use crate::engine::mind::grammar::PlanResponse;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: Re-plan Triggers
// ═══════════════════════════════════════════════════════════════════════════

/// Why the current plan tree was (or is about to be) discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplanReason {
    /// A survival metric fell below the critical threshold.
    CriticalSurvival(SurvivalNeed),
    /// The daily plan already reached Completed.
    PlanCompleted,
    /// Distance to a movement target grew past the divergence factor.
    Divergence { action_id: String },
    /// An in-progress action has run past the overrun factor.
    ActionOverrun { action_id: String },
    /// The clock walked off the end of the plan's span.
    SpanExhausted,
    /// A freshly synthesized plan replaces the stopgap heuristic one.
    Superseded,
}

impl std::fmt::Display for ReplanReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplanReason::CriticalSurvival(need) => write!(f, "critical {}", need),
            ReplanReason::PlanCompleted => write!(f, "plan completed"),
            ReplanReason::Divergence { action_id } => {
                write!(f, "diverged from target of action {}", action_id)
            }
            ReplanReason::ActionOverrun { action_id } => {
                write!(f, "action {} overran its window", action_id)
            }
            ReplanReason::SpanExhausted => write!(f, "plan span exhausted"),
            ReplanReason::Superseded => write!(f, "superseded by generated plan"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: Engine
// ═══════════════════════════════════════════════════════════════════════════

pub struct PlanningEngine {
    config: PlanningConfig,
    current: Option<DailyPlan>,
    /// Abandoned trees, oldest first. History is append-only.
    history: Vec<DailyPlan>,
    /// (action id, last observed distance) for the divergence trigger.
    divergence_baseline: Option<(String, f64)>,
}

impl PlanningEngine {
    pub fn new(config: PlanningConfig) -> Self {
        PlanningEngine {
            config,
            current: None,
            history: Vec::new(),
            divergence_baseline: None,
        }
    }

    pub fn current_plan(&self) -> Option<&DailyPlan> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[DailyPlan] {
        &self.history
    }

    pub fn has_plan(&self) -> bool {
        self.current.is_some()
    }

    /// Replace the current plan. The previous one must already have been
    /// taken through `abandon_current`.
    pub fn install(&mut self, plan: DailyPlan) {
        info!(
            "[mind:plan] Installed plan '{}' (priority {}, {} hours)",
            plan.goal,
            plan.priority,
            plan.hours.len()
        );
        self.divergence_baseline = None;
        self.current = Some(plan);
    }

    /// Mark the current tree abandoned and move it to history. Returns a
    /// one-line summary for the plan-history memory record.
    pub fn abandon_current(&mut self, reason: &ReplanReason) -> Option<String> {
        let mut plan = self.current.take()?;
        let reason_text = reason.to_string();
        plan.abandon(&reason_text);
        let summary = format!("Abandoned plan '{}' ({})", plan.goal, reason_text);
        info!("[mind:plan] {}", summary);
        self.history.push(plan);
        self.divergence_baseline = None;
        Some(summary)
    }

    // ── Current action ──────────────────────────────────────────────────

    /// Read-only walk to the leaf whose window contains `time`.
    pub fn current_action(&self, time: GameTime) -> Option<&ActionPlan> {
        self.current.as_ref().and_then(|p| p.action_at(time))
    }

    /// The intent for `time`, marking the path to it in-progress. None past
    /// the plan's span (or with no plan) — the re-plan signal.
    pub fn poll_intent(&mut self, time: GameTime) -> Option<ActionIntent> {
        let plan = self.current.as_mut()?;
        if plan.status == PlanStatus::Pending {
            plan.status = PlanStatus::InProgress;
        }
        let hour = plan.hours.iter_mut().find(|h| h.window.contains(time))?;
        if hour.status == PlanStatus::Pending {
            hour.status = PlanStatus::InProgress;
        }
        let action = hour.actions.iter_mut().find(|a| a.window.contains(time))?;
        if action.status == PlanStatus::Pending {
            action.status = PlanStatus::InProgress;
        }
        Some(ActionIntent {
            action_id: action.id.clone(),
            action_type: action.action_type,
            target: action.target.clone(),
            description: action.description.clone(),
        })
    }

    /// Mark an action completed and timestamp it. Does not auto-advance —
    /// the caller polls for the next current action on the next tick.
    /// Completion cascades upward when it finishes a whole hour / the day.
    pub fn complete_action(&mut self, id: &str, now: GameTime) -> EngineResult<()> {
        let plan = self
            .current
            .as_mut()
            .ok_or_else(|| EngineError::UnknownPlanNode(id.to_string()))?;
        let mut found = false;
        for hour in &mut plan.hours {
            if let Some(action) = hour.actions.iter_mut().find(|a| a.id == id) {
                if !action.status.is_terminal() {
                    action.status = PlanStatus::Completed;
                    action.completed_at = Some(now);
                }
                found = true;
            }
            if hour.actions.iter().all(|a| a.status == PlanStatus::Completed)
                && !hour.status.is_terminal()
            {
                hour.status = PlanStatus::Completed;
            }
        }
        if !found {
            return Err(EngineError::UnknownPlanNode(id.to_string()));
        }
        if plan.hours.iter().all(|h| h.status == PlanStatus::Completed)
            && !plan.status.is_terminal()
        {
            plan.status = PlanStatus::Completed;
            info!("[mind:plan] Plan '{}' completed", plan.goal);
        }
        Ok(())
    }

    // ── Re-plan triggers ────────────────────────────────────────────────

    /// Evaluate the re-plan triggers against this tick's perception.
    /// Called exactly once per tick, before any intent is emitted.
    pub fn evaluate_triggers(&mut self, ctx: &PerceptionContext) -> Option<ReplanReason> {
        let plan = self.current.as_ref()?;

        // A Critical-priority plan was produced in response to the
        // emergency; re-triggering on it every tick would thrash.
        if plan.priority != PlanPriority::Critical {
            if let Some(need) = ctx.survival.first_critical(self.config.critical_threshold) {
                return Some(ReplanReason::CriticalSurvival(need));
            }
        }
        if plan.status == PlanStatus::Completed {
            return Some(ReplanReason::PlanCompleted);
        }
        if let Some(reason) = self.check_divergence(ctx) {
            return Some(reason);
        }
        if let Some(reason) = self.check_overrun(ctx.time) {
            return Some(reason);
        }
        if ctx.time >= self.current.as_ref()?.window.end() {
            return Some(ReplanReason::SpanExhausted);
        }
        None
    }

    /// Distance to a movement action's target compared against the last
    /// observed distance. The baseline resets whenever the current action
    /// changes; each evaluation refreshes it.
    fn check_divergence(&mut self, ctx: &PerceptionContext) -> Option<ReplanReason> {
        let action = self.current.as_ref()?.action_at(ctx.time)?;
        let target = match (&action.action_type, &action.target) {
            (ActionType::MoveTo, Some(ActionTarget::Position(p))) => *p,
            _ => {
                self.divergence_baseline = None;
                return None;
            }
        };
        let distance = ctx.position.distance(&target);
        let action_id = action.id.clone();
        let triggered = match &self.divergence_baseline {
            Some((id, baseline)) if *id == action_id => {
                *baseline > f64::EPSILON && distance > self.config.divergence_factor * baseline
            }
            _ => false,
        };
        self.divergence_baseline = Some((action_id.clone(), distance));
        if triggered {
            Some(ReplanReason::Divergence { action_id })
        } else {
            None
        }
    }

    /// Any in-progress action that has run past the overrun factor.
    fn check_overrun(&self, now: GameTime) -> Option<ReplanReason> {
        let plan = self.current.as_ref()?;
        for hour in &plan.hours {
            for action in &hour.actions {
                if action.status == PlanStatus::InProgress {
                    let deadline = action
                        .window
                        .start
                        .plus_secs(self.config.overrun_factor * action.window.duration_secs);
                    if now > deadline {
                        return Some(ReplanReason::ActionOverrun {
                            action_id: action.id.clone(),
                        });
                    }
                }
            }
        }
        None
    }

    // ── Plan composition ────────────────────────────────────────────────

    /// Build the fully deterministic stopgap plan from the perception
    /// context: goal from the most depleted survival need, or "continue
    /// exploring" when nothing is critical.
    pub fn heuristic_plan(&self, ctx: &PerceptionContext, now: GameTime) -> EngineResult<DailyPlan> {
        let (need, value) = ctx.survival.most_depleted();
        let critical = value < self.config.critical_threshold;
        let focus = if critical { Some(need) } else { None };
        let (goal, reasoning, priority) = heuristic_goal(focus);
        let hours = self.config.hourly_count;
        let objectives: Vec<String> = (0..hours).map(|i| heuristic_objective(focus, i)).collect();
        self.compose(
            goal,
            reasoning,
            priority,
            objectives,
            vec![Vec::new(); hours],
            ctx,
            now,
        )
    }

    /// Build a plan from a parsed generation response, falling back per
    /// field to the heuristic values. The mapping is total: any response —
    /// including an empty one — yields a valid tree.
    pub fn plan_from_response(
        &self,
        parsed: &PlanResponse,
        ctx: &PerceptionContext,
        now: GameTime,
    ) -> EngineResult<DailyPlan> {
        let (need, value) = ctx.survival.most_depleted();
        let critical = value < self.config.critical_threshold;
        let focus = if critical { Some(need) } else { None };
        let (fallback_goal, fallback_reasoning, fallback_priority) = heuristic_goal(focus);

        let goal = parsed.goal.clone().unwrap_or(fallback_goal);
        let reasoning = parsed.reasoning.clone().unwrap_or(fallback_reasoning);
        let priority = parsed.priority.unwrap_or(fallback_priority);

        let hours = self.config.hourly_count;
        let objectives: Vec<String> = (0..hours)
            .map(|i| {
                parsed
                    .hour_objectives
                    .get(i)
                    .and_then(|o| o.clone())
                    .unwrap_or_else(|| heuristic_objective(focus, i))
            })
            .collect();
        let action_texts: Vec<Vec<String>> = (0..hours)
            .map(|i| parsed.hour_actions.get(i).cloned().unwrap_or_default())
            .collect();
        self.compose(goal, reasoning, priority, objectives, action_texts, ctx, now)
    }

    /// Decompose into the full tree: `hourly_count` contiguous hour windows
    /// from `now`, each tiled by `actions_per_hour` action windows. Window
    /// validation happens inside the node constructors.
    #[allow(clippy::too_many_arguments)]
    fn compose(
        &self,
        goal: String,
        reasoning: String,
        priority: PlanPriority,
        objectives: Vec<String>,
        action_texts: Vec<Vec<String>>,
        ctx: &PerceptionContext,
        now: GameTime,
    ) -> EngineResult<DailyPlan> {
        let mut hours = Vec::with_capacity(self.config.hourly_count);
        for (hour_index, objective) in objectives.into_iter().enumerate() {
            let hour_start = now.plus_secs(hour_index as f64 * self.config.hour_secs);
            let hour_window = TimeWindow::new(hour_start, self.config.hour_secs);
            let provided = action_texts.get(hour_index).cloned().unwrap_or_default();
            let mut actions = Vec::with_capacity(self.config.actions_per_hour);
            for slot in 0..self.config.actions_per_hour {
                let window = TimeWindow::new(
                    hour_start.plus_secs(slot as f64 * self.config.action_secs),
                    self.config.action_secs,
                );
                let description = provided
                    .get(slot)
                    .cloned()
                    .unwrap_or_else(|| action_template(&objective, slot));
                let action_type = infer_action_type(&description);
                let target = infer_target(action_type, ctx);
                actions.push(ActionPlan::new(description, action_type, target, window));
            }
            hours.push(HourlyPlan::new(objective, hour_window, actions)?);
        }
        debug!(
            "[mind:plan] Composed plan '{}' covering {:.0}s",
            goal,
            self.config.hourly_count as f64 * self.config.hour_secs
        );
        DailyPlan::new(goal, reasoning, priority, now, hours)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 3: Heuristic Templates
// ═══════════════════════════════════════════════════════════════════════════
// The deterministic half of the total fallback mapping. Every text the
// generation service could have produced has a defined default here.

fn heuristic_goal(focus: Option<SurvivalNeed>) -> (String, String, PlanPriority) {
    match focus {
        Some(SurvivalNeed::Hunger) => (
            "find food and eat".to_string(),
            "hunger is critically low".to_string(),
            PlanPriority::Critical,
        ),
        Some(SurvivalNeed::Thirst) => (
            "find water and drink".to_string(),
            "thirst is critically low".to_string(),
            PlanPriority::Critical,
        ),
        Some(SurvivalNeed::Energy) => (
            "find shelter and rest".to_string(),
            "energy is critically low".to_string(),
            PlanPriority::Critical,
        ),
        Some(SurvivalNeed::Health) => (
            "avoid danger and recover".to_string(),
            "health is critically low".to_string(),
            PlanPriority::Critical,
        ),
        None => (
            "continue exploring".to_string(),
            "no survival need is critical".to_string(),
            PlanPriority::Medium,
        ),
    }
}

fn heuristic_objective(focus: Option<SurvivalNeed>, hour_index: usize) -> String {
    let set: [&str; 3] = match focus {
        Some(SurvivalNeed::Hunger) => [
            "search nearby corridors for food",
            "eat whatever was gathered",
            "stock up and rest",
        ],
        Some(SurvivalNeed::Thirst) => [
            "search for a water source",
            "drink and recover",
            "memorize the route back to water",
        ],
        Some(SurvivalNeed::Energy) => [
            "find a safe resting spot",
            "rest without interruption",
            "resume light activity",
        ],
        Some(SurvivalNeed::Health) => [
            "retreat from hazards",
            "rest and recover health",
            "scout a safer area",
        ],
        None => [
            "explore unvisited corridors",
            "revisit notable locations",
            "observe nearby agents and rest",
        ],
    };
    set[hour_index % set.len()].to_string()
}

/// Per-slot action text derived from the hourly objective. Slots cycle
/// through a scan/approach/act/pause rhythm.
fn action_template(objective: &str, slot: usize) -> String {
    match slot % 4 {
        0 => format!("scan surroundings: {}", objective),
        1 => format!("move toward: {}", objective),
        2 => objective.to_string(),
        _ => "pause and reassess".to_string(),
    }
}

/// Keyword mapping from free action text to an action type. Total: anything
/// unrecognized explores.
fn infer_action_type(description: &str) -> ActionType {
    let lower = description.to_lowercase();
    const TABLE: &[(&str, ActionType)] = &[
        ("move", ActionType::MoveTo),
        ("walk", ActionType::MoveTo),
        ("go to", ActionType::MoveTo),
        ("retreat", ActionType::MoveTo),
        ("eat", ActionType::Forage),
        ("food", ActionType::Forage),
        ("forage", ActionType::Forage),
        ("gather", ActionType::Forage),
        ("stock up", ActionType::Forage),
        ("drink", ActionType::Drink),
        ("water", ActionType::Drink),
        ("rest", ActionType::Rest),
        ("sleep", ActionType::Rest),
        ("recover", ActionType::Rest),
        ("pause", ActionType::Wait),
        ("wait", ActionType::Wait),
        ("talk", ActionType::Socialize),
        ("meet", ActionType::Socialize),
        ("observe nearby agents", ActionType::Socialize),
    ];
    for (keyword, action_type) in TABLE {
        if lower.contains(keyword) {
            return *action_type;
        }
    }
    ActionType::Explore
}

/// Attach a concrete target from current perception where one makes sense.
fn infer_target(action_type: ActionType, ctx: &PerceptionContext) -> Option<ActionTarget> {
    match action_type {
        ActionType::MoveTo | ActionType::Forage | ActionType::Drink => ctx
            .visible_items
            .iter()
            .min_by(|a, b| {
                ctx.position
                    .distance(&a.position)
                    .partial_cmp(&ctx.position.distance(&b.position))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|item| ActionTarget::Position(item.position)),
        ActionType::Socialize => ctx
            .nearby_agents
            .first()
            .map(|agent| ActionTarget::Position(agent.position)),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::{Position, SurvivalMetrics, VisibleItem};

    fn make_engine() -> PlanningEngine {
        PlanningEngine::new(PlanningConfig::default())
    }

    fn ctx_at(time: f64) -> PerceptionContext {
        PerceptionContext {
            time: GameTime::from_secs(time),
            ..PerceptionContext::default()
        }
    }

    #[test]
    fn heuristic_plan_decomposes_exactly() {
        let engine = make_engine();
        let plan = engine.heuristic_plan(&ctx_at(0.0), GameTime::ZERO).unwrap();
        assert_eq!(plan.hours.len(), 3);
        for hour in &plan.hours {
            assert_eq!(hour.actions.len(), 12);
            assert_eq!(hour.window.duration_secs, 3600.0);
            for action in &hour.actions {
                assert_eq!(action.window.duration_secs, 300.0);
            }
        }
        assert_eq!(plan.window.duration_secs, 3.0 * 3600.0);
        assert_eq!(plan.goal, "continue exploring");
    }

    #[test]
    fn heuristic_goal_tracks_critical_need() {
        let engine = make_engine();
        let mut ctx = ctx_at(0.0);
        ctx.survival = SurvivalMetrics {
            thirst: 0.1,
            ..SurvivalMetrics::default()
        };
        let plan = engine.heuristic_plan(&ctx, GameTime::ZERO).unwrap();
        assert_eq!(plan.goal, "find water and drink");
        assert_eq!(plan.priority, PlanPriority::Critical);
    }

    #[test]
    fn current_action_walks_windows() {
        let mut engine = make_engine();
        let plan = engine.heuristic_plan(&ctx_at(0.0), GameTime::ZERO).unwrap();
        let first_action_id = plan.hours[0].actions[0].id.clone();
        engine.install(plan);

        let action = engine.current_action(GameTime::from_secs(150.0)).unwrap();
        assert_eq!(action.id, first_action_id, "t=150 lands in window [0,300)");

        assert!(engine.current_action(GameTime::from_secs(3650.0)).is_some());
        // Past the whole 3-hour span → None.
        assert!(engine
            .current_action(GameTime::from_secs(3.0 * 3600.0 + 50.0))
            .is_none());
    }

    #[test]
    fn single_hour_span_returns_none_past_3600() {
        // Plan with one hour: span [0, 3600); 3650 is outside.
        let config = PlanningConfig {
            hourly_count: 1,
            ..PlanningConfig::default()
        };
        let engine = PlanningEngine::new(config);
        let plan = engine.heuristic_plan(&ctx_at(0.0), GameTime::ZERO).unwrap();
        assert!(plan.action_at(GameTime::from_secs(150.0)).is_some());
        assert!(plan.action_at(GameTime::from_secs(3650.0)).is_none());
    }

    #[test]
    fn poll_intent_marks_path_in_progress() {
        let mut engine = make_engine();
        let plan = engine.heuristic_plan(&ctx_at(0.0), GameTime::ZERO).unwrap();
        engine.install(plan);
        let intent = engine.poll_intent(GameTime::from_secs(10.0)).unwrap();
        let plan = engine.current_plan().unwrap();
        assert_eq!(plan.status, PlanStatus::InProgress);
        assert_eq!(plan.hours[0].status, PlanStatus::InProgress);
        assert_eq!(plan.hours[0].actions[0].status, PlanStatus::InProgress);
        assert_eq!(intent.action_id, plan.hours[0].actions[0].id);
    }

    #[test]
    fn complete_action_cascades_to_plan() {
        let config = PlanningConfig {
            hourly_count: 1,
            actions_per_hour: 2,
            action_secs: 1800.0,
            ..PlanningConfig::default()
        };
        let mut engine = PlanningEngine::new(config);
        let plan = engine.heuristic_plan(&ctx_at(0.0), GameTime::ZERO).unwrap();
        let ids: Vec<String> = plan.hours[0].actions.iter().map(|a| a.id.clone()).collect();
        engine.install(plan);

        engine.complete_action(&ids[0], GameTime::from_secs(100.0)).unwrap();
        assert_eq!(engine.current_plan().unwrap().status, PlanStatus::Pending);
        engine.complete_action(&ids[1], GameTime::from_secs(200.0)).unwrap();
        let plan = engine.current_plan().unwrap();
        assert_eq!(plan.hours[0].status, PlanStatus::Completed);
        assert_eq!(plan.status, PlanStatus::Completed);

        assert!(engine.complete_action("no-such-id", GameTime::ZERO).is_err());
    }

    #[test]
    fn critical_survival_trigger_fires_first() {
        let mut engine = make_engine();
        let plan = engine.heuristic_plan(&ctx_at(0.0), GameTime::ZERO).unwrap();
        engine.install(plan);
        let mut ctx = ctx_at(10.0);
        ctx.survival.energy = 0.05;
        assert_eq!(
            engine.evaluate_triggers(&ctx),
            Some(ReplanReason::CriticalSurvival(SurvivalNeed::Energy))
        );
    }

    #[test]
    fn critical_plan_does_not_retrigger_on_the_same_emergency() {
        let mut engine = make_engine();
        let mut ctx = ctx_at(0.0);
        ctx.survival.energy = 0.05;
        let plan = engine.heuristic_plan(&ctx, GameTime::ZERO).unwrap();
        assert_eq!(plan.priority, PlanPriority::Critical);
        engine.install(plan);
        ctx.time = GameTime::from_secs(10.0);
        assert_eq!(engine.evaluate_triggers(&ctx), None);
    }

    #[test]
    fn span_exhaustion_triggers_replan() {
        let mut engine = make_engine();
        let plan = engine.heuristic_plan(&ctx_at(0.0), GameTime::ZERO).unwrap();
        engine.install(plan);
        let ctx = ctx_at(3.0 * 3600.0 + 1.0);
        assert_eq!(engine.evaluate_triggers(&ctx), Some(ReplanReason::SpanExhausted));
    }

    #[test]
    fn divergence_trigger_needs_growth_past_factor() {
        let mut engine = make_engine();
        let mut ctx = ctx_at(0.0);
        ctx.visible_items.push(VisibleItem {
            name: "berry bush".to_string(),
            position: Position::new(10, 0),
        });
        let plan = engine.heuristic_plan(&ctx, GameTime::ZERO).unwrap();
        // The slot-1 template is "move toward: …" → MoveTo with a target.
        assert_eq!(plan.hours[0].actions[1].action_type, ActionType::MoveTo);
        engine.install(plan);

        // Land in the MoveTo action's window [300, 600).
        let mut tick1 = ctx.clone();
        tick1.time = GameTime::from_secs(310.0);
        tick1.position = Position::new(0, 0); // distance 10 — baseline
        assert_eq!(engine.evaluate_triggers(&tick1), None);

        let mut tick2 = tick1.clone();
        tick2.time = GameTime::from_secs(320.0);
        tick2.position = Position::new(-2, 0); // distance 12 < 1.5×10
        assert_eq!(engine.evaluate_triggers(&tick2), None);

        let mut tick3 = tick2.clone();
        tick3.time = GameTime::from_secs(330.0);
        tick3.position = Position::new(-10, 0); // distance 20 > 1.5×12
        assert!(matches!(
            engine.evaluate_triggers(&tick3),
            Some(ReplanReason::Divergence { .. })
        ));
    }

    #[test]
    fn overrun_trigger_catches_stalled_action() {
        let mut engine = make_engine();
        let plan = engine.heuristic_plan(&ctx_at(0.0), GameTime::ZERO).unwrap();
        engine.install(plan);
        // Start the first action ([0, 300), allotted 300s)…
        engine.poll_intent(GameTime::from_secs(10.0)).unwrap();
        // …and never complete it. At t=901 it has run beyond 3×300s.
        let ctx = ctx_at(901.0);
        assert!(matches!(
            engine.evaluate_triggers(&ctx),
            Some(ReplanReason::ActionOverrun { .. })
        ));
        // At t=800 it is still within the allowance.
        let ctx = ctx_at(800.0);
        assert_eq!(engine.evaluate_triggers(&ctx), None);
    }

    #[test]
    fn abandon_moves_tree_to_history_intact() {
        let mut engine = make_engine();
        let plan = engine.heuristic_plan(&ctx_at(0.0), GameTime::ZERO).unwrap();
        let goal = plan.goal.clone();
        engine.install(plan);
        let summary = engine.abandon_current(&ReplanReason::SpanExhausted).unwrap();
        assert!(summary.contains(&goal));
        assert!(engine.current_plan().is_none());
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.history()[0].status, PlanStatus::Abandoned);
        assert_eq!(engine.history()[0].hours.len(), 3, "history keeps the tree");
    }

    #[test]
    fn plan_from_response_mixes_parsed_and_fallback_fields() {
        use crate::engine::mind::grammar::parse_plan_response;
        let engine = make_engine();
        let parsed = parse_plan_response(
            "GOAL: chart the eastern maze\nHOUR_1: walk the east corridor\n\
             HOUR_1_ACTIONS: move east | note junctions\n",
            3,
        );
        let plan = engine
            .plan_from_response(&parsed, &ctx_at(0.0), GameTime::ZERO)
            .unwrap();
        assert_eq!(plan.goal, "chart the eastern maze");
        // Missing priority fell back.
        assert_eq!(plan.priority, PlanPriority::Medium);
        // Hour 1 keeps parsed texts, the rest come from templates.
        assert_eq!(plan.hours[0].objective, "walk the east corridor");
        assert_eq!(plan.hours[0].actions[0].description, "move east");
        assert_eq!(plan.hours[0].actions[0].action_type, ActionType::MoveTo);
        assert!(!plan.hours[1].actions.is_empty());
        assert_eq!(plan.hours.len(), 3);
        for hour in &plan.hours {
            assert_eq!(hour.actions.len(), 12);
        }
    }
}

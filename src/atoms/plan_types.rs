// ── Warren Atoms: Plan Tree Types ──────────────────────────────────────────
//
// The Daily → Hourly → Action hierarchy describing an agent's intended
// behavior over time. Pure data types plus the window-tiling validation that
// must hold at construction time.
//
// Lifecycle: a DailyPlan is created by the planner on initialization or
// re-plan; Hourly/Action children are created while decomposing their
// parent; the whole tree is marked abandoned (never deleted, never mutated
// afterwards) when a re-plan discards it.

use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{ActionTarget, ActionType, GameTime};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: Windows and Status
// ═══════════════════════════════════════════════════════════════════════════

/// A half-open interval [start, start + duration) on the game clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: GameTime,
    pub duration_secs: f64,
}

/// Tolerance when comparing window sums. Durations are exact multiples in
/// practice; the epsilon only absorbs float addition noise.
const WINDOW_EPSILON: f64 = 1e-6;

impl TimeWindow {
    pub fn new(start: GameTime, duration_secs: f64) -> Self {
        TimeWindow {
            start,
            duration_secs,
        }
    }

    pub fn end(&self) -> GameTime {
        self.start.plus_secs(self.duration_secs)
    }

    /// Whether `time` falls inside [start, end).
    pub fn contains(&self, time: GameTime) -> bool {
        time >= self.start && time < self.end()
    }

    /// Verify that `children` tile this window exactly: contiguous,
    /// non-overlapping, starting at `self.start`, durations summing to
    /// `self.duration_secs`. Violation is a logic defect and fails loudly.
    pub fn validate_children(&self, children: &[TimeWindow]) -> EngineResult<()> {
        let mut cursor = self.start;
        for child in children {
            if (child.start.as_secs() - cursor.as_secs()).abs() > WINDOW_EPSILON {
                return Err(EngineError::InvalidTimeWindow {
                    parent_secs: self.duration_secs,
                    children_secs: child.start.secs_since(self.start),
                });
            }
            cursor = child.end();
        }
        let children_secs = cursor.secs_since(self.start);
        if (children_secs - self.duration_secs).abs() > WINDOW_EPSILON {
            return Err(EngineError::InvalidTimeWindow {
                parent_secs: self.duration_secs,
                children_secs,
            });
        }
        Ok(())
    }
}

/// Plan node lifecycle. Pending → InProgress → {Completed | Abandoned |
/// Failed}; the three right-hand states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    Pending,
    InProgress,
    Completed,
    Abandoned,
    Failed,
}

impl PlanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlanStatus::Completed | PlanStatus::Abandoned | PlanStatus::Failed
        )
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanStatus::Pending => write!(f, "pending"),
            PlanStatus::InProgress => write!(f, "in_progress"),
            PlanStatus::Completed => write!(f, "completed"),
            PlanStatus::Abandoned => write!(f, "abandoned"),
            PlanStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Priority attached to a daily plan by the generation service (or the
/// heuristic fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for PlanPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanPriority::Critical => write!(f, "critical"),
            PlanPriority::High => write!(f, "high"),
            PlanPriority::Medium => write!(f, "medium"),
            PlanPriority::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for PlanPriority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(PlanPriority::Critical),
            "high" => Ok(PlanPriority::High),
            "medium" => Ok(PlanPriority::Medium),
            "low" => Ok(PlanPriority::Low),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: Plan Nodes
// ═══════════════════════════════════════════════════════════════════════════

/// Leaf of the plan tree — a single concrete action with a fixed window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPlan {
    pub id: String,
    pub description: String,
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ActionTarget>,
    pub status: PlanStatus,
    pub window: TimeWindow,
    /// Set by `complete_action`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<GameTime>,
}

/// Middle tier — one objective spanning a fixed one-hour window, owning an
/// ordered list of actions that tile it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyPlan {
    pub id: String,
    pub objective: String,
    pub status: PlanStatus,
    pub window: TimeWindow,
    pub actions: Vec<ActionPlan>,
}

/// Root of the tree — the goal for the planning horizon, owning an ordered
/// list of hourly plans that tile its window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPlan {
    pub id: String,
    pub goal: String,
    pub reasoning: String,
    pub priority: PlanPriority,
    pub status: PlanStatus,
    pub created_at: GameTime,
    pub window: TimeWindow,
    pub hours: Vec<HourlyPlan>,
    /// Why this tree was discarded, once it has been.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abandon_reason: Option<String>,
}

impl ActionPlan {
    pub fn new(
        description: impl Into<String>,
        action_type: ActionType,
        target: Option<ActionTarget>,
        window: TimeWindow,
    ) -> Self {
        ActionPlan {
            id: uuid::Uuid::new_v4().to_string(),
            description: description.into(),
            action_type,
            target,
            status: PlanStatus::Pending,
            window,
            completed_at: None,
        }
    }
}

impl HourlyPlan {
    /// Build an hourly plan and validate that its actions tile the window.
    pub fn new(
        objective: impl Into<String>,
        window: TimeWindow,
        actions: Vec<ActionPlan>,
    ) -> EngineResult<Self> {
        let windows: Vec<TimeWindow> = actions.iter().map(|a| a.window).collect();
        window.validate_children(&windows)?;
        Ok(HourlyPlan {
            id: uuid::Uuid::new_v4().to_string(),
            objective: objective.into(),
            status: PlanStatus::Pending,
            window,
            actions,
        })
    }

    /// The action whose window contains `time`, if any.
    pub fn action_at(&self, time: GameTime) -> Option<&ActionPlan> {
        self.actions.iter().find(|a| a.window.contains(time))
    }
}

impl DailyPlan {
    /// Build a daily plan and validate that its hours tile the window.
    pub fn new(
        goal: impl Into<String>,
        reasoning: impl Into<String>,
        priority: PlanPriority,
        created_at: GameTime,
        hours: Vec<HourlyPlan>,
    ) -> EngineResult<Self> {
        let total_secs: f64 = hours.iter().map(|h| h.window.duration_secs).sum();
        let window = TimeWindow::new(created_at, total_secs);
        let windows: Vec<TimeWindow> = hours.iter().map(|h| h.window).collect();
        window.validate_children(&windows)?;
        Ok(DailyPlan {
            id: uuid::Uuid::new_v4().to_string(),
            goal: goal.into(),
            reasoning: reasoning.into(),
            priority,
            status: PlanStatus::Pending,
            created_at,
            window,
            hours,
            abandon_reason: None,
        })
    }

    /// The hour whose window contains `time`, if any.
    pub fn hour_at(&self, time: GameTime) -> Option<&HourlyPlan> {
        self.hours.iter().find(|h| h.window.contains(time))
    }

    /// Walk the tree to the leaf action whose window contains `time`.
    /// None means `time` is outside the plan's span — the signal that
    /// re-planning is needed.
    pub fn action_at(&self, time: GameTime) -> Option<&ActionPlan> {
        self.hour_at(time).and_then(|h| h.action_at(time))
    }

    /// Mark the whole remaining tree abandoned with a reason. Nodes already
    /// in a terminal state keep it — an abandoned tree is history, not a
    /// mutation target.
    pub fn abandon(&mut self, reason: &str) {
        if !self.status.is_terminal() {
            self.status = PlanStatus::Abandoned;
        }
        self.abandon_reason = Some(reason.to_string());
        for hour in &mut self.hours {
            if !hour.status.is_terminal() {
                hour.status = PlanStatus::Abandoned;
            }
            for action in &mut hour.actions {
                if !action.status.is_terminal() {
                    action.status = PlanStatus::Abandoned;
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn minute_windows(start: GameTime, count: usize, secs: f64) -> Vec<TimeWindow> {
        (0..count)
            .map(|i| TimeWindow::new(start.plus_secs(i as f64 * secs), secs))
            .collect()
    }

    #[test]
    fn window_contains_is_half_open() {
        let w = TimeWindow::new(GameTime::ZERO, 300.0);
        assert!(w.contains(GameTime::ZERO));
        assert!(w.contains(GameTime::from_secs(299.9)));
        assert!(!w.contains(GameTime::from_secs(300.0)));
    }

    #[test]
    fn validate_children_accepts_exact_tiling() {
        let parent = TimeWindow::new(GameTime::ZERO, 3600.0);
        let children = minute_windows(GameTime::ZERO, 12, 300.0);
        assert!(parent.validate_children(&children).is_ok());
    }

    #[test]
    fn validate_children_rejects_gap() {
        let parent = TimeWindow::new(GameTime::ZERO, 600.0);
        let children = vec![
            TimeWindow::new(GameTime::ZERO, 300.0),
            TimeWindow::new(GameTime::from_secs(350.0), 250.0),
        ];
        assert!(matches!(
            parent.validate_children(&children),
            Err(EngineError::InvalidTimeWindow { .. })
        ));
    }

    #[test]
    fn validate_children_rejects_short_sum() {
        let parent = TimeWindow::new(GameTime::ZERO, 600.0);
        let children = vec![TimeWindow::new(GameTime::ZERO, 300.0)];
        assert!(parent.validate_children(&children).is_err());
    }

    #[test]
    fn hourly_plan_construction_validates_windows() {
        let window = TimeWindow::new(GameTime::ZERO, 3600.0);
        let actions: Vec<ActionPlan> = minute_windows(GameTime::ZERO, 12, 300.0)
            .into_iter()
            .map(|w| ActionPlan::new("step", ActionType::Explore, None, w))
            .collect();
        let hour = HourlyPlan::new("look around", window, actions).unwrap();
        assert_eq!(hour.actions.len(), 12);

        // Eleven actions leave a 300s hole — loud failure.
        let short: Vec<ActionPlan> = minute_windows(GameTime::ZERO, 11, 300.0)
            .into_iter()
            .map(|w| ActionPlan::new("step", ActionType::Explore, None, w))
            .collect();
        assert!(HourlyPlan::new("look around", window, short).is_err());
    }

    #[test]
    fn abandon_preserves_terminal_children() {
        let window = TimeWindow::new(GameTime::ZERO, 600.0);
        let mut actions: Vec<ActionPlan> = minute_windows(GameTime::ZERO, 2, 300.0)
            .into_iter()
            .map(|w| ActionPlan::new("step", ActionType::Wait, None, w))
            .collect();
        actions[0].status = PlanStatus::Completed;
        let hour = HourlyPlan::new("wait", window, actions).unwrap();
        let mut plan =
            DailyPlan::new("idle", "nothing pressing", PlanPriority::Low, GameTime::ZERO, vec![hour])
                .unwrap();

        plan.abandon("test reason");
        assert_eq!(plan.status, PlanStatus::Abandoned);
        assert_eq!(plan.abandon_reason.as_deref(), Some("test reason"));
        assert_eq!(plan.hours[0].actions[0].status, PlanStatus::Completed);
        assert_eq!(plan.hours[0].actions[1].status, PlanStatus::Abandoned);
    }

    #[test]
    fn plan_roundtrips_through_json() {
        let window = TimeWindow::new(GameTime::ZERO, 300.0);
        let action = ActionPlan::new(
            "drink from the well",
            ActionType::Drink,
            Some(ActionTarget::Item("well".to_string())),
            window,
        );
        let hour = HourlyPlan::new("rehydrate", window, vec![action]).unwrap();
        let plan = DailyPlan::new(
            "recover",
            "thirst is low",
            PlanPriority::High,
            GameTime::ZERO,
            vec![hour],
        )
        .unwrap();

        let json = serde_json::to_string(&plan).unwrap();
        let back: DailyPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back.goal, "recover");
        assert_eq!(back.priority, PlanPriority::High);
        assert_eq!(back.hours.len(), 1);
        let action = &back.hours[0].actions[0];
        assert_eq!(action.action_type, ActionType::Drink);
        assert_eq!(action.target, Some(ActionTarget::Item("well".to_string())));
    }
}

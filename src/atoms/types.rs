// ── Warren Atoms: Simulation Types ─────────────────────────────────────────
//
// Shared world-facing data types — the contract between the engine and its
// external collaborators (world/maze, actuation, rendering). These are pure
// data types (no logic beyond small accessors, no I/O).
//
// Follows the project pattern: structs in atoms/, impls in engine/.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: Game Time
// ═══════════════════════════════════════════════════════════════════════════

/// A point on the simulation clock, in seconds of game time since the
/// simulation started. The engine is tick-driven; wall-clock time plays no
/// role in its semantics (provider timeouts are the one exception and use
/// tokio's real-time clock).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameTime(f64);

impl GameTime {
    pub const ZERO: GameTime = GameTime(0.0);

    pub fn from_secs(secs: f64) -> Self {
        GameTime(secs)
    }

    pub fn from_hours(hours: f64) -> Self {
        GameTime(hours * 3600.0)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }

    pub fn as_hours(&self) -> f64 {
        self.0 / 3600.0
    }

    /// Seconds elapsed since `earlier`, clamped at zero — the clock never
    /// reports negative intervals even if a caller hands in out-of-order
    /// timestamps.
    pub fn secs_since(&self, earlier: GameTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    /// Hours elapsed since `earlier`, clamped at zero.
    pub fn hours_since(&self, earlier: GameTime) -> f64 {
        self.secs_since(earlier) / 3600.0
    }

    pub fn plus_secs(&self, secs: f64) -> GameTime {
        GameTime(self.0 + secs)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: World Geometry
// ═══════════════════════════════════════════════════════════════════════════

/// A cell position in the maze grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 3: Survival State
// ═══════════════════════════════════════════════════════════════════════════

/// One survival dimension. Used to name the most depleted need when the
/// planner falls back to a heuristic goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurvivalNeed {
    Hunger,
    Thirst,
    Energy,
    Health,
}

impl std::fmt::Display for SurvivalNeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurvivalNeed::Hunger => write!(f, "hunger"),
            SurvivalNeed::Thirst => write!(f, "thirst"),
            SurvivalNeed::Energy => write!(f, "energy"),
            SurvivalNeed::Health => write!(f, "health"),
        }
    }
}

/// Survival metrics supplied by the world each tick. Every dimension is in
/// [0, 1] where 1.0 is fully satisfied and 0.0 is fully depleted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurvivalMetrics {
    pub hunger: f32,
    pub thirst: f32,
    pub energy: f32,
    pub health: f32,
}

impl Default for SurvivalMetrics {
    fn default() -> Self {
        SurvivalMetrics {
            hunger: 1.0,
            thirst: 1.0,
            energy: 1.0,
            health: 1.0,
        }
    }
}

impl SurvivalMetrics {
    fn dimensions(&self) -> [(SurvivalNeed, f32); 4] {
        [
            (SurvivalNeed::Hunger, self.hunger),
            (SurvivalNeed::Thirst, self.thirst),
            (SurvivalNeed::Energy, self.energy),
            (SurvivalNeed::Health, self.health),
        ]
    }

    /// The need with the lowest value, with that value.
    pub fn most_depleted(&self) -> (SurvivalNeed, f32) {
        self.dimensions()
            .into_iter()
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap()
    }

    /// The first need below the critical threshold, if any.
    pub fn first_critical(&self, threshold: f32) -> Option<SurvivalNeed> {
        self.dimensions()
            .into_iter()
            .find(|(_, v)| *v < threshold)
            .map(|(need, _)| need)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 4: Perception Context
// ═══════════════════════════════════════════════════════════════════════════

/// Another agent currently visible to this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyAgent {
    pub id: String,
    pub position: Position,
}

/// An item currently visible to this agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibleItem {
    pub name: String,
    pub position: Position,
}

/// The read-only snapshot the world collaborator supplies each tick.
/// The engine never mutates it; everything it needs to act comes from here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerceptionContext {
    pub time: GameTime,
    pub position: Position,
    pub survival: SurvivalMetrics,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nearby_agents: Vec<NearbyAgent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visible_items: Vec<VisibleItem>,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 5: Action Intents
// ═══════════════════════════════════════════════════════════════════════════

/// What kind of action a plan leaf asks the actuation collaborator to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    MoveTo,
    Forage,
    Drink,
    Rest,
    Explore,
    Socialize,
    Wait,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::MoveTo => write!(f, "move_to"),
            ActionType::Forage => write!(f, "forage"),
            ActionType::Drink => write!(f, "drink"),
            ActionType::Rest => write!(f, "rest"),
            ActionType::Explore => write!(f, "explore"),
            ActionType::Socialize => write!(f, "socialize"),
            ActionType::Wait => write!(f, "wait"),
        }
    }
}

impl std::str::FromStr for ActionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "move_to" | "move" | "goto" => Ok(ActionType::MoveTo),
            "forage" | "eat" | "gather" => Ok(ActionType::Forage),
            "drink" => Ok(ActionType::Drink),
            "rest" | "sleep" => Ok(ActionType::Rest),
            "explore" | "wander" => Ok(ActionType::Explore),
            "socialize" | "talk" | "interact" => Ok(ActionType::Socialize),
            "wait" | "idle" => Ok(ActionType::Wait),
            other => Err(format!("Unknown action type: {}", other)),
        }
    }
}

/// What an action is directed at, when it has a target at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ActionTarget {
    Position(Position),
    Item(String),
}

/// The current leaf action, polled once per tick by the actuation
/// collaborator. This is the engine's entire outward-facing output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionIntent {
    /// Id of the plan leaf this intent came from — pass it back to
    /// `complete_action` when the world finishes executing it.
    pub action_id: String,
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ActionTarget>,
    pub description: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 6: Social Interactions
// ═══════════════════════════════════════════════════════════════════════════

/// Coarse classification of an observed interaction. Trust only grows on
/// cooperative interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionKind {
    Cooperative,
    Friendly,
    Neutral,
    Hostile,
}

impl InteractionKind {
    pub fn is_cooperative(&self) -> bool {
        matches!(self, InteractionKind::Cooperative)
    }
}

/// A single interaction with another agent, as observed from the shared
/// perception snapshot. Each participant records it unilaterally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub kind: InteractionKind,
    /// Sentiment of the exchange in [-1, 1]; scales the affinity step.
    pub sentiment: f32,
    pub summary: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_time_never_reports_negative_intervals() {
        let early = GameTime::from_secs(100.0);
        let late = GameTime::from_secs(250.0);
        assert_eq!(late.secs_since(early), 150.0);
        assert_eq!(early.secs_since(late), 0.0);
    }

    #[test]
    fn game_time_hours_conversion() {
        let t = GameTime::from_hours(2.0);
        assert_eq!(t.as_secs(), 7200.0);
        assert_eq!(t.as_hours(), 2.0);
    }

    #[test]
    fn position_distance() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn most_depleted_picks_lowest() {
        let metrics = SurvivalMetrics {
            hunger: 0.8,
            thirst: 0.3,
            energy: 0.5,
            health: 0.9,
        };
        let (need, value) = metrics.most_depleted();
        assert_eq!(need, SurvivalNeed::Thirst);
        assert_eq!(value, 0.3);
    }

    #[test]
    fn first_critical_respects_threshold() {
        let metrics = SurvivalMetrics {
            hunger: 0.15,
            thirst: 0.5,
            energy: 0.5,
            health: 0.5,
        };
        assert_eq!(metrics.first_critical(0.2), Some(SurvivalNeed::Hunger));
        assert_eq!(metrics.first_critical(0.1), None);
    }

    #[test]
    fn action_type_roundtrip_via_strings() {
        let parsed: ActionType = "forage".parse().unwrap();
        assert_eq!(parsed, ActionType::Forage);
        assert_eq!(ActionType::MoveTo.to_string(), "move_to");
        assert!("juggle".parse::<ActionType>().is_err());
    }
}

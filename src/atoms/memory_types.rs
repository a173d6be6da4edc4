// ── Warren Atoms: Memory Types ─────────────────────────────────────────────
//
// Type definitions for the memory subsystem — records, retrieval results,
// and per-pair relationship state. Pure data types (no store access, no I/O).
//
// Follows the project pattern: structs in atoms/, impls in engine/.

use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{GameTime, Position};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: Memory Records
// ═══════════════════════════════════════════════════════════════════════════

/// What a record is. Observations are raw experience; reflections are
/// synthesized insights citing evidence records; plan records archive
/// abandoned or completed plans for history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryKind {
    Observation,
    Reflection,
    Plan,
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryKind::Observation => write!(f, "observation"),
            MemoryKind::Reflection => write!(f, "reflection"),
            MemoryKind::Plan => write!(f, "plan"),
        }
    }
}

/// A single timestamped, importance-scored unit of agent experience.
///
/// Invariants:
///   • `importance` is fixed at creation and always within [1, 10].
///   • `last_accessed` only ever increases (see [`MemoryRecord::touch`]).
///   • Reflections carry `level ≥ 1` and cite the evidence records they were
///     synthesized from; the citation links form a flat, acyclic arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub kind: MemoryKind,
    pub content: String,
    /// Fixed at creation, within [1, 10].
    pub importance: f32,
    pub created_at: GameTime,
    /// Bumped by retrieval (feedback loop — see RetrievalConfig).
    pub last_accessed: GameTime,
    /// Where in the maze this was experienced, when it has a location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Embedding vector (None until the embedding service has seen it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Ids of the records that justify this one (reflections only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
    /// Reflection level: 0 for observations and plans, 1 for first-order
    /// reflections, 2+ for meta-reflections over lower levels.
    #[serde(default)]
    pub level: u8,
}

impl MemoryRecord {
    /// Create an observation record. Fails on importance outside [1, 10] —
    /// the only way `MemoryStore::add` can reject input.
    pub fn observation(
        content: impl Into<String>,
        importance: f32,
        now: GameTime,
    ) -> EngineResult<Self> {
        validate_importance(importance)?;
        Ok(MemoryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            kind: MemoryKind::Observation,
            content: content.into(),
            importance,
            created_at: now,
            last_accessed: now,
            position: None,
            embedding: None,
            citations: Vec::new(),
            level: 0,
        })
    }

    /// Create a reflection record citing its evidence.
    pub fn reflection(
        content: impl Into<String>,
        importance: f32,
        now: GameTime,
        citations: Vec<String>,
        level: u8,
    ) -> EngineResult<Self> {
        validate_importance(importance)?;
        Ok(MemoryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            kind: MemoryKind::Reflection,
            content: content.into(),
            importance,
            created_at: now,
            last_accessed: now,
            position: None,
            embedding: None,
            citations,
            level: level.max(1),
        })
    }

    /// Create a plan-history record (archived plan summary).
    pub fn plan(content: impl Into<String>, importance: f32, now: GameTime) -> EngineResult<Self> {
        validate_importance(importance)?;
        Ok(MemoryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            kind: MemoryKind::Plan,
            content: content.into(),
            importance,
            created_at: now,
            last_accessed: now,
            position: None,
            embedding: None,
            citations: Vec::new(),
            level: 0,
        })
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Advance the last-access timestamp. Monotonic: a stale `now` never
    /// moves the timestamp backwards.
    pub fn touch(&mut self, now: GameTime) {
        if now > self.last_accessed {
            self.last_accessed = now;
        }
    }
}

fn validate_importance(importance: f32) -> EngineResult<()> {
    if !(1.0..=10.0).contains(&importance) || !importance.is_finite() {
        return Err(EngineError::InvalidImportance(importance));
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: Retrieval Results
// ═══════════════════════════════════════════════════════════════════════════

/// How a retrieval ranks candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalMode {
    /// recency + importance + embedding relevance. Records without an
    /// embedding are excluded.
    Semantic,
    /// recency + importance only; includes records without embeddings.
    /// Also the degradation path when the embedding service fails.
    ImportanceOnly,
}

/// A record returned by retrieval, with its scoring breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: MemoryRecord,
    /// Weighted sum of the three components below.
    pub score: f64,
    pub recency: f64,
    pub importance_norm: f64,
    pub relevance: f64,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 3: Relationship Records
// ═══════════════════════════════════════════════════════════════════════════

/// Decaying per-pair social state. Created on first recorded interaction,
/// mutated by every later one and by periodic decay, never destroyed while
/// either party exists. Every dimension stays inside its declared closed
/// interval after every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// The agent that owns this record.
    pub owner: String,
    /// The other party.
    pub other: String,
    /// How well the owner knows the other agent, in [0, 1].
    pub familiarity: f32,
    /// Emotional valence toward the other agent, in [-1, 1].
    pub affinity: f32,
    /// Behavioral trust, in [0, 1].
    pub trust: f32,
    pub interactions: u32,
    pub last_interaction: GameTime,
    /// Most recent interaction summaries, oldest evicted first.
    pub history: VecDeque<String>,
}

/// Compact read-only view for the inspection API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipSummary {
    pub other: String,
    pub familiarity: f32,
    pub affinity: f32,
    pub trust: f32,
    pub interactions: u32,
}

impl From<&RelationshipRecord> for RelationshipSummary {
    fn from(record: &RelationshipRecord) -> Self {
        RelationshipSummary {
            other: record.other.clone(),
            familiarity: record.familiarity,
            affinity: record.affinity,
            trust: record.trust,
            interactions: record.interactions,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_rejects_out_of_range_importance() {
        let now = GameTime::ZERO;
        assert!(MemoryRecord::observation("x", 0.5, now).is_err());
        assert!(MemoryRecord::observation("x", 10.5, now).is_err());
        assert!(MemoryRecord::observation("x", f32::NAN, now).is_err());
        assert!(MemoryRecord::observation("x", 1.0, now).is_ok());
        assert!(MemoryRecord::observation("x", 10.0, now).is_ok());
    }

    #[test]
    fn touch_is_monotonic() {
        let mut record = MemoryRecord::observation("x", 5.0, GameTime::from_secs(100.0)).unwrap();
        record.touch(GameTime::from_secs(200.0));
        assert_eq!(record.last_accessed.as_secs(), 200.0);
        record.touch(GameTime::from_secs(50.0));
        assert_eq!(record.last_accessed.as_secs(), 200.0);
    }

    #[test]
    fn reflection_level_floors_at_one() {
        let r = MemoryRecord::reflection("insight", 7.0, GameTime::ZERO, vec![], 0).unwrap();
        assert_eq!(r.level, 1);
    }

    #[test]
    fn record_roundtrips_through_json_with_citations() {
        let record = MemoryRecord::reflection(
            "the corridor near the well floods at night",
            8.0,
            GameTime::from_secs(42.0),
            vec!["a".to_string(), "b".to_string()],
            2,
        )
        .unwrap()
        .with_position(Position::new(3, 7))
        .with_embedding(vec![0.1, 0.2, 0.3]);

        let json = serde_json::to_string(&record).unwrap();
        let back: MemoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.kind, MemoryKind::Reflection);
        assert_eq!(back.citations, vec!["a", "b"]);
        assert_eq!(back.level, 2);
        assert_eq!(back.position, Some(Position::new(3, 7)));
        assert_eq!(back.embedding.as_deref(), Some(&[0.1, 0.2, 0.3][..]));
        assert_eq!(back.created_at.as_secs(), 42.0);
    }
}

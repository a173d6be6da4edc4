// ── Mind: Relationship Memory ──────────────────────────────────────────────
//
// Per-(owner, other) social state with the same temporal-decay primitive as
// the memory store, keyed by agent pair instead of by query.
//
// Update rules:
//   - first contact:      familiarity 0.1, affinity 0.0, trust 0.5
//   - every interaction:  familiarity += 0.05 (capped at 1.0 on EVERY
//                         update, not at read time), affinity +=
//                         sentiment-scaled step clamped to [-1, 1], trust +=
//                         step for cooperative kinds only, clamped to [0, 1]
//   - idle decay:         familiarity and trust multiply by a per-hour
//                         factor; affinity persists unless a separate slower
//                         decay is configured
//
// Records are never destroyed while either party exists; every dimension
// stays inside its declared closed interval after every operation.

use crate::atoms::config::RelationshipConfig;
use crate::atoms::constants::{INITIAL_AFFINITY, INITIAL_FAMILIARITY, INITIAL_TRUST};
use crate::atoms::memory_types::{RelationshipRecord, RelationshipSummary};
use crate::atoms::types::{GameTime, Interaction};
use log::debug;
use std::collections::{HashMap, VecDeque};

pub struct RelationshipMemory {
    owner: String,
    records: HashMap<String, RelationshipRecord>,
    config: RelationshipConfig,
}

impl RelationshipMemory {
    pub fn new(owner: impl Into<String>, config: RelationshipConfig) -> Self {
        RelationshipMemory {
            owner: owner.into(),
            records: HashMap::new(),
            config,
        }
    }

    pub fn get(&self, other: &str) -> Option<&RelationshipRecord> {
        self.records.get(other)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compact views for the inspection API, most familiar first.
    pub fn summaries(&self) -> Vec<RelationshipSummary> {
        let mut summaries: Vec<RelationshipSummary> =
            self.records.values().map(RelationshipSummary::from).collect();
        summaries.sort_by(|a, b| {
            b.familiarity
                .partial_cmp(&a.familiarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        summaries
    }

    /// Record one observed interaction with `other`.
    pub fn record_interaction(
        &mut self,
        other: &str,
        interaction: &Interaction,
        now: GameTime,
    ) -> &RelationshipRecord {
        let config = &self.config;
        let record = self
            .records
            .entry(other.to_string())
            .or_insert_with(|| RelationshipRecord {
                owner: self.owner.clone(),
                other: other.to_string(),
                familiarity: INITIAL_FAMILIARITY,
                affinity: INITIAL_AFFINITY,
                trust: INITIAL_TRUST,
                interactions: 0,
                last_interaction: now,
                history: VecDeque::new(),
            });

        if record.interactions > 0 {
            record.familiarity = (record.familiarity + config.familiarity_step).min(1.0);
            record.affinity = (record.affinity
                + interaction.sentiment.clamp(-1.0, 1.0) * config.affinity_step)
                .clamp(-1.0, 1.0);
            if interaction.kind.is_cooperative() {
                record.trust = (record.trust + config.trust_step).min(1.0);
            }
        }
        record.interactions += 1;
        record.last_interaction = now;
        record.history.push_back(interaction.summary.clone());
        while record.history.len() > config.history_cap {
            record.history.pop_front();
        }
        debug!(
            "[mind:social] {} ↔ {}: familiarity {:.2}, affinity {:+.2}, trust {:.2} ({} interactions)",
            record.owner, other, record.familiarity, record.affinity, record.trust,
            record.interactions
        );
        record
    }

    /// Apply idle decay over `elapsed_hours`: records with no interaction
    /// inside that period lose familiarity and trust multiplicatively.
    /// Affinity only decays (toward 0) when a separate rate is configured.
    pub fn apply_decay(&mut self, now: GameTime, elapsed_hours: f64) {
        if elapsed_hours <= 0.0 {
            return;
        }
        let factor = (self.config.hourly_decay as f64).powf(elapsed_hours) as f32;
        let affinity_factor =
            (self.config.affinity_hourly_decay as f64).powf(elapsed_hours) as f32;
        for record in self.records.values_mut() {
            if now.hours_since(record.last_interaction) < elapsed_hours {
                continue; // interacted during the period — no decay
            }
            record.familiarity = (record.familiarity * factor).clamp(0.0, 1.0);
            record.trust = (record.trust * factor).clamp(0.0, 1.0);
            record.affinity = (record.affinity * affinity_factor).clamp(-1.0, 1.0);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::InteractionKind;

    fn interaction(kind: InteractionKind, sentiment: f32) -> Interaction {
        Interaction {
            kind,
            sentiment,
            summary: "shared a corridor".to_string(),
        }
    }

    fn make_memory() -> RelationshipMemory {
        RelationshipMemory::new("alice", RelationshipConfig::default())
    }

    #[test]
    fn first_contact_uses_initial_values() {
        let mut memory = make_memory();
        let record = memory.record_interaction(
            "bob",
            &interaction(InteractionKind::Neutral, 0.0),
            GameTime::ZERO,
        );
        assert_eq!(record.familiarity, 0.1);
        assert_eq!(record.affinity, 0.0);
        assert_eq!(record.trust, 0.5);
        assert_eq!(record.interactions, 1);
    }

    #[test]
    fn familiarity_caps_at_one_after_twenty_interactions() {
        let mut memory = make_memory();
        for i in 0..=20 {
            memory.record_interaction(
                "bob",
                &interaction(InteractionKind::Neutral, 0.0),
                GameTime::from_secs(i as f64),
            );
        }
        // 0.1 base + 20 × 0.05 would be 1.1; the per-update cap pins it
        // at exactly 1.0, and one extra interaction must not push past.
        let record = memory.get("bob").unwrap();
        assert!((record.familiarity - 1.0).abs() < 1e-6);
        memory.record_interaction(
            "bob",
            &interaction(InteractionKind::Neutral, 0.0),
            GameTime::from_secs(30.0),
        );
        assert!(memory.get("bob").unwrap().familiarity <= 1.0);
    }

    #[test]
    fn trust_only_grows_on_cooperative_interactions() {
        let mut memory = make_memory();
        memory.record_interaction("bob", &interaction(InteractionKind::Hostile, -0.5), GameTime::ZERO);
        memory.record_interaction(
            "bob",
            &interaction(InteractionKind::Hostile, -0.5),
            GameTime::from_secs(1.0),
        );
        assert_eq!(memory.get("bob").unwrap().trust, 0.5);

        memory.record_interaction(
            "bob",
            &interaction(InteractionKind::Cooperative, 0.5),
            GameTime::from_secs(2.0),
        );
        assert!((memory.get("bob").unwrap().trust - 0.52).abs() < 1e-6);
    }

    #[test]
    fn affinity_scales_with_sentiment_and_clamps() {
        let mut memory = make_memory();
        memory.record_interaction("bob", &interaction(InteractionKind::Friendly, 1.0), GameTime::ZERO);
        for i in 0..30 {
            memory.record_interaction(
                "bob",
                &interaction(InteractionKind::Hostile, -1.0),
                GameTime::from_secs(1.0 + i as f64),
            );
        }
        let record = memory.get("bob").unwrap();
        assert!(record.affinity >= -1.0, "clamped at the floor");
        assert_eq!(record.affinity, -1.0);
    }

    #[test]
    fn decay_skips_recently_active_relationships() {
        let mut memory = make_memory();
        memory.record_interaction("idle", &interaction(InteractionKind::Neutral, 0.0), GameTime::ZERO);
        memory.record_interaction(
            "idle",
            &interaction(InteractionKind::Neutral, 0.0),
            GameTime::from_secs(1.0),
        );
        memory.record_interaction(
            "active",
            &interaction(InteractionKind::Neutral, 0.0),
            GameTime::from_hours(9.5),
        );

        let before_idle = memory.get("idle").unwrap().familiarity;
        let before_active = memory.get("active").unwrap().familiarity;
        memory.apply_decay(GameTime::from_hours(10.0), 5.0);

        let idle = memory.get("idle").unwrap();
        assert!(idle.familiarity < before_idle);
        assert!((idle.familiarity - before_idle * 0.99f32.powf(5.0)).abs() < 1e-6);
        assert_eq!(memory.get("active").unwrap().familiarity, before_active);
    }

    #[test]
    fn affinity_persists_through_decay_by_default() {
        let mut memory = make_memory();
        memory.record_interaction("bob", &interaction(InteractionKind::Friendly, 1.0), GameTime::ZERO);
        memory.record_interaction(
            "bob",
            &interaction(InteractionKind::Friendly, 1.0),
            GameTime::from_secs(1.0),
        );
        let before = memory.get("bob").unwrap().affinity;
        assert!(before > 0.0);
        memory.apply_decay(GameTime::from_hours(100.0), 50.0);
        assert_eq!(memory.get("bob").unwrap().affinity, before);
        assert!(memory.get("bob").unwrap().trust < 0.5);
    }

    #[test]
    fn configured_affinity_decay_pulls_toward_zero() {
        let config = RelationshipConfig {
            affinity_hourly_decay: 0.9,
            ..RelationshipConfig::default()
        };
        let mut memory = RelationshipMemory::new("alice", config);
        memory.record_interaction("bob", &interaction(InteractionKind::Friendly, 1.0), GameTime::ZERO);
        memory.record_interaction(
            "bob",
            &interaction(InteractionKind::Friendly, 1.0),
            GameTime::from_secs(1.0),
        );
        let before = memory.get("bob").unwrap().affinity;
        memory.apply_decay(GameTime::from_hours(10.0), 5.0);
        let after = memory.get("bob").unwrap().affinity;
        assert!(after < before && after > 0.0);
    }

    #[test]
    fn history_is_bounded() {
        let config = RelationshipConfig {
            history_cap: 3,
            ..RelationshipConfig::default()
        };
        let mut memory = RelationshipMemory::new("alice", config);
        for i in 0..10 {
            let mut event = interaction(InteractionKind::Neutral, 0.0);
            event.summary = format!("event {}", i);
            memory.record_interaction("bob", &event, GameTime::from_secs(i as f64));
        }
        let record = memory.get("bob").unwrap();
        assert_eq!(record.history.len(), 3);
        assert_eq!(record.history.front().unwrap(), "event 7");
    }
}

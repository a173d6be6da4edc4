// ── Mind: Memory Store ─────────────────────────────────────────────────────
//
// Append-only log of timestamped records with bounded capacity.
//
// Key properties:
//   - Pure in-memory, insertion order = chronological order
//   - `add` never blocks and only fails on malformed input (importance
//     outside [1, 10])
//   - Capacity overflow silently evicts the lowest-retention records:
//       retention = w_r · recency + w_i · importance/10
//     ties broken by oldest creation time first
//   - `query` hands out a lazy borrowed iterator over call-time state
//
// Thread-safety: NOT internally synchronized. The engine owns one store per
// agent and drives it from a single logical thread of control.

use crate::atoms::config::MemoryConfig;
use crate::atoms::error::EngineResult;
use crate::atoms::memory_types::{MemoryKind, MemoryRecord};
use crate::atoms::types::GameTime;
use log::debug;

/// Exponential recency weight: 0.5 after exactly one half-life.
pub(crate) fn recency_score(elapsed_hours: f64, half_life_hours: f64) -> f64 {
    (-elapsed_hours * std::f64::consts::LN_2 / half_life_hours).exp()
}

/// Bounded, append-only record log.
pub struct MemoryStore {
    records: Vec<MemoryRecord>,
    config: MemoryConfig,
    /// Half-life driving the recency component of the retention score.
    half_life_hours: f64,
}

impl MemoryStore {
    pub fn new(config: MemoryConfig, half_life_hours: f64) -> EngineResult<Self> {
        if config.capacity == 0 {
            return Err(crate::atoms::error::EngineError::config(
                "memory capacity must be at least 1",
            ));
        }
        Ok(MemoryStore {
            records: Vec::with_capacity(config.capacity.min(4096)),
            config,
            half_life_hours,
        })
    }

    /// Append a record. Returns its id. Evicts down to capacity afterwards;
    /// eviction is internal and silent (logged at debug).
    pub fn add(&mut self, record: MemoryRecord, now: GameTime) -> EngineResult<String> {
        // Re-validate here: `add` is the public write path and must reject
        // malformed records regardless of how they were built.
        if !(1.0..=10.0).contains(&record.importance) || !record.importance.is_finite() {
            return Err(crate::atoms::error::EngineError::InvalidImportance(
                record.importance,
            ));
        }
        let id = record.id.clone();
        self.records.push(record);
        self.evict_over_capacity(now);
        Ok(id)
    }

    /// Lazy scan over current records. Reflects the store's state at call
    /// time only; the borrow makes it finite and non-restartable.
    pub fn query<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a MemoryRecord>
    where
        P: Fn(&MemoryRecord) -> bool + 'a,
    {
        self.records.iter().filter(move |r| predicate(r))
    }

    pub fn get(&self, id: &str) -> Option<&MemoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut MemoryRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// The most recent `n` observation records at or above the importance
    /// floor, newest first.
    pub fn recent_observations(&self, n: usize, importance_floor: f32) -> Vec<&MemoryRecord> {
        let mut hits: Vec<&MemoryRecord> = self
            .records
            .iter()
            .filter(|r| r.kind == MemoryKind::Observation && r.importance >= importance_floor)
            .collect();
        let skip = hits.len().saturating_sub(n);
        hits.drain(..skip);
        hits.reverse();
        hits
    }

    /// All records, oldest first (scored in bulk by the retrieval engine).
    pub(crate) fn records(&self) -> &[MemoryRecord] {
        &self.records
    }

    /// Advance last-access on the given records.
    pub fn touch_all(&mut self, ids: &[String], now: GameTime) {
        for record in &mut self.records {
            if ids.iter().any(|id| *id == record.id) {
                record.touch(now);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    // ── Internal ────────────────────────────────────────────────────────

    /// Remove lowest-retention records until back at capacity.
    fn evict_over_capacity(&mut self, now: GameTime) {
        while self.records.len() > self.config.capacity {
            let Some(victim) = self.lowest_retention_index(now) else {
                return;
            };
            let removed = self.records.remove(victim);
            debug!(
                "[mind:store] Evicted {} ({}, importance {:.1})",
                removed.id, removed.kind, removed.importance
            );
        }
    }

    fn retention(&self, record: &MemoryRecord, now: GameTime) -> f64 {
        let recency = recency_score(now.hours_since(record.last_accessed), self.half_life_hours);
        self.config.retention_recency_weight * recency
            + self.config.retention_importance_weight * (record.importance as f64 / 10.0)
    }

    /// Index of the record with the lowest retention; among equals, the
    /// oldest creation time loses.
    fn lowest_retention_index(&self, now: GameTime) -> Option<usize> {
        self.records
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let ra = self.retention(a, now);
                let rb = self.retention(b, now);
                ra.partial_cmp(&rb)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| {
                        a.created_at
                            .partial_cmp(&b.created_at)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
            })
            .map(|(i, _)| i)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

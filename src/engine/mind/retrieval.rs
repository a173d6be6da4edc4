// ── Mind: Retrieval Engine ─────────────────────────────────────────────────
//
// Scores and ranks memory records for a query:
//
//   combined = w_r · recency + w_i · importance/10 + w_v · relevance
//
//   recency    — exp(-Δt_hours · ln2 / half_life) against last access
//   importance — fixed at record creation, normalized to [0.1, 1.0]
//   relevance  — cosine similarity of query and record embeddings
//
// Unit weights by default; ties broken by most recent last access. Returning
// a record bumps its last-access timestamp (configurable) — frequently
// retrieved memories decay slower. Embedding-service failure never escapes:
// retrieval degrades to importance-only ranking (configurable) or an empty
// result, and the tick loop continues.

use crate::atoms::config::RetrievalConfig;
use crate::atoms::memory_types::{MemoryRecord, RetrievalMode, ScoredRecord};
use crate::atoms::traits::EmbeddingClient;
use crate::atoms::types::GameTime;
use crate::engine::mind::store::{recency_score, MemoryStore};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

pub struct RetrievalEngine {
    embedder: Arc<dyn EmbeddingClient>,
    config: RetrievalConfig,
    embed_timeout: Duration,
}

impl RetrievalEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        config: RetrievalConfig,
        embed_timeout: Duration,
    ) -> Self {
        RetrievalEngine {
            embedder,
            config,
            embed_timeout,
        }
    }

    /// Embed a text with the configured deadline. Failures are logged and
    /// swallowed — callers always have a no-embedding path.
    pub async fn embed_text(&self, text: &str) -> Option<Vec<f32>> {
        match tokio::time::timeout(self.embed_timeout, self.embedder.embed(text)).await {
            Ok(Ok(vector)) => Some(vector),
            Ok(Err(e)) => {
                warn!("[mind:recall] Embedding failed: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    "[mind:recall] Embedding timed out after {:?}",
                    self.embed_timeout
                );
                None
            }
        }
    }

    /// Top-k records for a query by the combined score. Empty store or empty
    /// candidate set returns an empty Vec, never an error.
    pub async fn retrieve(
        &self,
        store: &mut MemoryStore,
        query: &str,
        k: usize,
        now: GameTime,
    ) -> Vec<ScoredRecord> {
        match self.embed_text(query).await {
            Some(query_embedding) => {
                self.rank(store, Some(&query_embedding), k, now, RetrievalMode::Semantic)
            }
            None if self.config.importance_only_on_embed_failure => {
                debug!("[mind:recall] Degrading to importance-only ranking");
                self.rank(store, None, k, now, RetrievalMode::ImportanceOnly)
            }
            None => Vec::new(),
        }
    }

    /// Explicit importance-only ranking — includes records that never got an
    /// embedding.
    pub fn retrieve_importance_only(
        &self,
        store: &mut MemoryStore,
        k: usize,
        now: GameTime,
    ) -> Vec<ScoredRecord> {
        self.rank(store, None, k, now, RetrievalMode::ImportanceOnly)
    }

    /// Score a single record against an optional query embedding.
    fn score(
        &self,
        record: &MemoryRecord,
        query_embedding: Option<&[f32]>,
        now: GameTime,
    ) -> ScoredRecord {
        let recency = recency_score(
            now.hours_since(record.last_accessed),
            self.config.half_life_hours,
        );
        let importance_norm = record.importance as f64 / 10.0;
        let relevance = match (query_embedding, record.embedding.as_deref()) {
            (Some(query), Some(candidate)) => cosine_similarity(query, candidate),
            _ => 0.0,
        };
        let score = self.config.recency_weight * recency
            + self.config.importance_weight * importance_norm
            + self.config.relevance_weight * relevance;
        ScoredRecord {
            record: record.clone(),
            score,
            recency,
            importance_norm,
            relevance,
        }
    }

    fn rank(
        &self,
        store: &mut MemoryStore,
        query_embedding: Option<&[f32]>,
        k: usize,
        now: GameTime,
        mode: RetrievalMode,
    ) -> Vec<ScoredRecord> {
        let mut scored: Vec<ScoredRecord> = store
            .records()
            .iter()
            .filter(|r| mode == RetrievalMode::ImportanceOnly || r.embedding.is_some())
            .map(|r| self.score(r, query_embedding, now))
            .collect();

        // Highest score first; equal scores go to the most recently accessed.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.record
                        .last_accessed
                        .partial_cmp(&a.record.last_accessed)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });
        scored.truncate(k);

        if self.config.bump_access_on_retrieve && !scored.is_empty() {
            let ids: Vec<String> = scored.iter().map(|s| s.record.id.clone()).collect();
            store.touch_all(&ids, now);
        }

        debug!(
            "[mind:recall] Returned {} record(s) (mode {:?})",
            scored.len(),
            mode
        );
        scored
    }
}

/// Cosine similarity between two f32 vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (fx, fy) = (*x as f64, *y as f64);
        dot += fx * fy;
        na += fx * fx;
        nb += fy * fy;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom < 1e-12 {
        0.0
    } else {
        dot / denom
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

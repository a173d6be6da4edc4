// ── Mind: In-Flight Request Slot ───────────────────────────────────────────
//
// Explicit state machine for the single generation-service request an agent
// may have outstanding: Idle → Pending → resolved (success, parse failure,
// or timeout). Formalizing it makes "exactly one in-flight request" and
// "atomic application of the result" independently testable.
//
// Mechanics:
//   - `try_issue` spawns a tokio task that races the provider call against
//     the configured deadline and delivers through a oneshot channel. It
//     refuses (returns false) while a request is pending.
//   - `poll` is called once per tick, before anything else reads engine
//     state, so a resolved result is applied between ticks — never mid-tick.
//   - Dropping the slot (agent removed) drops the receiver; a late result
//     hits a closed channel and is discarded, never applied.

use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::traits::GenerationClient;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// What an outstanding request is for, carried alongside it so the resolver
/// knows how to apply (or fall back) when it lands.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPurpose {
    /// A full daily-plan synthesis (goal, reasoning, priority, hours).
    DailyPlan,
    /// Open-ended reflection questions over the given evidence.
    ReflectionQuestions { evidence_ids: Vec<String> },
    /// A grounded answer for one reflection question. `level` is 1 for
    /// first-order reflections and n+1 for meta passes.
    ReflectionAnswer {
        question: String,
        evidence_ids: Vec<String>,
        level: u8,
    },
}

impl RequestPurpose {
    pub fn label(&self) -> &'static str {
        match self {
            RequestPurpose::DailyPlan => "daily_plan",
            RequestPurpose::ReflectionQuestions { .. } => "reflection_questions",
            RequestPurpose::ReflectionAnswer { .. } => "reflection_answer",
        }
    }
}

enum SlotState {
    Idle,
    Pending {
        purpose: RequestPurpose,
        rx: oneshot::Receiver<EngineResult<String>>,
    },
}

/// Per-agent single-request slot.
pub struct RequestSlot {
    state: SlotState,
    timeout: Duration,
}

impl RequestSlot {
    pub fn new(timeout: Duration) -> Self {
        RequestSlot {
            state: SlotState::Idle,
            timeout,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SlotState::Pending { .. })
    }

    /// Label of the pending request, for the inspection API.
    pub fn pending_label(&self) -> Option<&'static str> {
        match &self.state {
            SlotState::Pending { purpose, .. } => Some(purpose.label()),
            SlotState::Idle => None,
        }
    }

    /// Issue a request if the slot is free. Returns false (and does nothing)
    /// while one is already pending — callers fall back deterministically.
    pub fn try_issue(
        &mut self,
        client: Arc<dyn GenerationClient>,
        prompt: String,
        purpose: RequestPurpose,
    ) -> bool {
        if self.is_pending() {
            debug!(
                "[mind:slot] Rejected {} request — {} already pending",
                purpose.label(),
                self.pending_label().unwrap_or("?")
            );
            return false;
        }
        let (tx, rx) = oneshot::channel();
        let deadline = self.timeout;
        debug!("[mind:slot] Issuing {} request", purpose.label());
        tokio::spawn(async move {
            let result = match tokio::time::timeout(deadline, client.synthesize(&prompt)).await {
                Ok(inner) => inner,
                Err(_) => Err(EngineError::GenerationTimeout),
            };
            // A closed receiver means the agent is gone — discard silently.
            let _ = tx.send(result);
        });
        self.state = SlotState::Pending { purpose, rx };
        true
    }

    /// Take the resolved result if one has landed. Non-blocking; returns
    /// None while the request is still running (or the slot is idle).
    pub fn poll(&mut self) -> Option<(RequestPurpose, EngineResult<String>)> {
        let SlotState::Pending { purpose, rx } = &mut self.state else {
            return None;
        };
        match rx.try_recv() {
            Ok(result) => {
                let purpose = purpose.clone();
                self.state = SlotState::Idle;
                debug!("[mind:slot] {} resolved", purpose.label());
                Some((purpose, result))
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                let purpose = purpose.clone();
                self.state = SlotState::Idle;
                Some((
                    purpose,
                    Err(EngineError::provider("generation", "worker dropped")),
                ))
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
    use crate::engine::providers::scripted::{ScriptedGeneration, StallingGeneration};

    #[tokio::test]
    async fn second_issue_is_rejected_while_pending() {
        let mut slot = RequestSlot::new(Duration::from_secs(5));
        let client = Arc::new(StallingGeneration::new());
        assert!(slot.try_issue(client.clone(), "first".into(), RequestPurpose::DailyPlan));
        assert!(slot.is_pending());
        assert!(!slot.try_issue(client, "second".into(), RequestPurpose::DailyPlan));
    }

    #[tokio::test]
    async fn poll_returns_result_exactly_once() {
        let mut slot = RequestSlot::new(Duration::from_secs(5));
        let client = Arc::new(ScriptedGeneration::always("GOAL: rest"));
        assert!(slot.try_issue(client, "plan".into(), RequestPurpose::DailyPlan));

        // Let the spawned task run.
        tokio::task::yield_now().await;
        let mut resolved = None;
        for _ in 0..100 {
            if let Some(r) = slot.poll() {
                resolved = Some(r);
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let (purpose, result) = resolved.expect("request should resolve");
        assert_eq!(purpose, RequestPurpose::DailyPlan);
        assert_eq!(result.unwrap(), "GOAL: rest");
        assert!(!slot.is_pending());
        assert!(slot.poll().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_resolves_to_generation_timeout() {
        let mut slot = RequestSlot::new(Duration::from_millis(50));
        let client = Arc::new(StallingGeneration::new());
        assert!(slot.try_issue(client, "plan".into(), RequestPurpose::DailyPlan));

        // Advance past the deadline; the worker resolves with a timeout.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut resolved = None;
        for _ in 0..100 {
            if let Some(r) = slot.poll() {
                resolved = Some(r);
                break;
            }
            tokio::task::yield_now().await;
        }
        let (_, result) = resolved.expect("timeout should resolve the slot");
        assert!(matches!(result, Err(EngineError::GenerationTimeout)));
        assert!(!slot.is_pending());
    }
}

//! The per-room action queue.
//!
//! Round actions accumulate here between submissions, one per player
//! (resubmitting replaces), then [`ActionQueue::process_round`] drains
//! them in priority order: every action is re-validated against the
//! state as it stands when its turn comes, executed through the ability
//! resolver, and archived in a bounded history. Ready and validate
//! requests skip the queue and execute on the spot.

use std::cmp::Reverse;
use std::mem;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::abilities::AbilityResolver;
use crate::combat::{ActionDraft, CombatResolver};
use crate::core::config::RoomConfig;
use crate::core::log::{LogEntry, RoundLog};
use crate::core::player::PlayerId;
use crate::core::request::{ActionKind, ActionRequest};
use crate::core::state::RoomState;
use crate::error::{RejectReason, SubmitError};
use crate::events::{EngineEvent, EventSink};
use crate::validation::{self, ValidationOptions, ValidationRequest};

use super::action::{ActionId, ActionStatus, QueuedAction, DEFEND_PRIORITY};

/// Running totals across the queue's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QueueStats {
    pub processed: u64,
    pub failed: u64,
    pub avg_latency_ms: f64,
}

impl QueueStats {
    fn record(&mut self, ok: bool, latency_ms: f64) {
        let executed = (self.processed + self.failed) as f64;
        self.avg_latency_ms = (self.avg_latency_ms * executed + latency_ms) / (executed + 1.0);
        if ok {
            self.processed += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// What one call to [`ActionQueue::process_round`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    pub processed: usize,
    pub rejected: usize,
}

/// Priority queue of one round's actions plus the archive of past ones.
#[derive(Debug)]
pub struct ActionQueue {
    pending: Vec<QueuedAction>,
    history: im::Vector<QueuedAction>,
    stats: QueueStats,
    next_action: u64,
    next_sequence: u64,
    batch_size: usize,
    history_limit: usize,
    processing: bool,
    destroyed: bool,
}

impl ActionQueue {
    #[must_use]
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            pending: Vec::new(),
            history: im::Vector::new(),
            stats: QueueStats::default(),
            next_action: 1,
            next_sequence: 0,
            batch_size: config.batch_size.max(1),
            history_limit: config.history_limit,
            processing: false,
            destroyed: false,
        }
    }

    /// Submit a player request.
    ///
    /// Ready and validate requests execute immediately; ability and
    /// defend requests pass the submission gate and join the pending
    /// queue, silently replacing any action the player already has
    /// waiting. Gate rejections surface as [`SubmitError::Rejected`]
    /// after publishing an [`EngineEvent::ActionRejected`].
    pub fn submit(
        &mut self,
        state: &mut RoomState,
        player: PlayerId,
        request: ActionRequest,
        sink: &mut dyn EventSink,
    ) -> Result<ActionId, SubmitError> {
        if self.destroyed {
            return Err(SubmitError::QueueDestroyed);
        }
        if !state.roster.contains(player) {
            return Err(SubmitError::UnknownPlayer { player });
        }

        match request.kind {
            ActionKind::Ready => {
                let id = self.next_id();
                if let Some(p) = state.roster.get_mut(player) {
                    p.ready = true;
                }
                sink.publish(EngineEvent::ActionSubmitted {
                    action: id,
                    player,
                    kind: ActionKind::Ready,
                });
                self.archive_immediate(id, player, ActionKind::Ready, request);
                Ok(id)
            }
            ActionKind::Validate => {
                let id = self.next_id();
                // A dry run of the submission the player is considering.
                let result = validation::validate(
                    state,
                    ValidationRequest::Submission {
                        player,
                        kind: ActionKind::UseAbility,
                        ability: request.ability,
                        target: request.target,
                        pending: &self.pending,
                    },
                    &ValidationOptions::new(),
                );
                sink.publish(EngineEvent::ActionSubmitted {
                    action: id,
                    player,
                    kind: ActionKind::Validate,
                });
                sink.publish(EngineEvent::ActionValidated { action: id, player, result });
                self.archive_immediate(id, player, ActionKind::Validate, request);
                Ok(id)
            }
            ActionKind::Defend => {
                let actor = state
                    .roster
                    .get(player)
                    .ok_or(SubmitError::UnknownPlayer { player })?;
                if !actor.alive {
                    return Err(self.reject(player, RejectReason::ActorDead, sink));
                }
                if actor.is_stunned() {
                    return Err(self.reject(player, RejectReason::ActorStunned, sink));
                }
                Ok(self.enqueue(
                    player,
                    ActionKind::Defend,
                    None,
                    None,
                    DEFEND_PRIORITY,
                    request.options,
                    sink,
                ))
            }
            ActionKind::UseAbility => {
                let Some(ability) = request.ability else {
                    return Err(SubmitError::MissingAbility);
                };
                match CombatResolver::validate_and_queue_action(
                    state,
                    player,
                    ability,
                    request.target,
                    request.options,
                    &[],
                ) {
                    Ok(draft) => Ok(self.submit_draft(draft, sink)),
                    Err(reason) => Err(self.reject(player, reason, sink)),
                }
            }
        }
    }

    /// Queue a draft that already cleared the submission gate.
    pub fn submit_draft(&mut self, draft: ActionDraft, sink: &mut dyn EventSink) -> ActionId {
        self.enqueue(
            draft.player,
            ActionKind::UseAbility,
            Some(draft.ability),
            draft.target,
            draft.priority,
            draft.options,
            sink,
        )
    }

    /// Withdraw a pending action. Returns whether anything was cancelled.
    pub fn cancel(&mut self, id: ActionId, sink: &mut dyn EventSink) -> bool {
        let Some(pos) = self.pending.iter().position(|a| a.id == id) else {
            return false;
        };
        let mut action = self.pending.remove(pos);
        action.status = ActionStatus::Cancelled;
        debug!(action = %id, player = %action.player, "action cancelled");
        sink.publish(EngineEvent::ActionCancelled { action: id, player: action.player });
        self.push_history(action);
        true
    }

    /// Drain and execute this round's actions in priority order.
    ///
    /// Ties resolve first-come-first-served. Each action is re-validated
    /// right before it runs, so a stun or death earlier in the round
    /// knocks out actions that were legal when submitted. Returns `None`
    /// if the queue is destroyed or a resolution is already running.
    pub fn process_round(
        &mut self,
        state: &mut RoomState,
        log: &mut RoundLog,
        sink: &mut dyn EventSink,
    ) -> Option<RoundReport> {
        if self.processing || self.destroyed {
            return None;
        }
        self.processing = true;

        let mut actions = mem::take(&mut self.pending);
        actions.sort_by_key(|a| (Reverse(a.priority), a.sequence));

        let mut processed = 0usize;
        let mut rejected = 0usize;

        for (index, batch) in actions.chunks_mut(self.batch_size).enumerate() {
            debug!(batch = index, len = batch.len(), "executing batch");
            for action in batch.iter_mut() {
                let started = Instant::now();
                action.status = ActionStatus::Executing;

                let verdict = validation::validate(
                    state,
                    ValidationRequest::Submission {
                        player: action.player,
                        kind: action.kind,
                        ability: action.ability,
                        target: action.target,
                        pending: &[],
                    },
                    &ValidationOptions::new(),
                );

                let outcome = match verdict.first_failure() {
                    None => AbilityResolver::resolve(action, state, log),
                    Some(failure) => Err(RejectReason::RuleFailed {
                        rule: failure.rule,
                        detail: failure.detail.clone().unwrap_or_default(),
                    }),
                };

                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                match outcome {
                    Ok(()) => {
                        action.status = ActionStatus::Completed;
                        self.stats.record(true, latency_ms);
                        processed += 1;
                    }
                    Err(reason) => {
                        action.status = ActionStatus::Failed;
                        self.stats.record(false, latency_ms);
                        rejected += 1;
                        log.push(LogEntry::ActionFailed {
                            player: state.player_name(action.player),
                            reason: reason.to_string(),
                        });
                        sink.publish(EngineEvent::ActionRejected {
                            action: action.id,
                            player: action.player,
                            reason,
                        });
                    }
                }
            }
        }

        for action in actions {
            self.push_history(action);
        }

        self.processing = false;
        Some(RoundReport { processed, rejected })
    }

    /// Cancel everything pending and refuse all future submissions.
    pub fn destroy(&mut self, sink: &mut dyn EventSink) {
        if self.destroyed {
            return;
        }
        let pending = mem::take(&mut self.pending);
        let cancelled = pending.len();
        for mut action in pending {
            action.status = ActionStatus::Cancelled;
            sink.publish(EngineEvent::ActionCancelled {
                action: action.id,
                player: action.player,
            });
            self.push_history(action);
        }
        self.destroyed = true;
        info!(cancelled, "action queue destroyed");
    }

    /// Actions waiting for the next resolution, in submission order.
    #[must_use]
    pub fn pending(&self) -> &[QueuedAction] {
        &self.pending
    }

    /// The pending action a player has queued, if any.
    #[must_use]
    pub fn pending_for(&self, player: PlayerId) -> Option<&QueuedAction> {
        self.pending.iter().find(|a| a.player == player)
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Archived actions, oldest first, bounded by the history limit.
    pub fn history(&self) -> impl Iterator<Item = &QueuedAction> {
        self.history.iter()
    }

    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[allow(clippy::too_many_arguments)]
    fn enqueue(
        &mut self,
        player: PlayerId,
        kind: ActionKind,
        ability: Option<crate::abilities::AbilityId>,
        target: Option<crate::core::request::Target>,
        priority: u8,
        options: crate::core::request::ActionOptions,
        sink: &mut dyn EventSink,
    ) -> ActionId {
        // One pending action per player; a resubmission takes the slot.
        if let Some(pos) = self.pending.iter().position(|a| a.player == player) {
            let mut replaced = self.pending.remove(pos);
            replaced.status = ActionStatus::Cancelled;
            self.push_history(replaced);
        }

        let id = self.next_id();
        let action = QueuedAction {
            id,
            player,
            kind,
            ability,
            target,
            priority,
            sequence: self.next_sequence(),
            status: ActionStatus::Pending,
            options,
        };
        debug!(action = %id, player = %player, priority, "action queued");
        sink.publish(EngineEvent::ActionSubmitted { action: id, player, kind });
        self.pending.push(action);
        id
    }

    fn archive_immediate(
        &mut self,
        id: ActionId,
        player: PlayerId,
        kind: ActionKind,
        request: ActionRequest,
    ) {
        let sequence = self.next_sequence();
        self.push_history(QueuedAction {
            id,
            player,
            kind,
            ability: request.ability,
            target: request.target,
            priority: 0,
            sequence,
            status: ActionStatus::Completed,
            options: request.options,
        });
    }

    fn push_history(&mut self, action: QueuedAction) {
        self.history.push_back(action);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    fn next_id(&mut self) -> ActionId {
        let id = ActionId::new(self.next_action);
        self.next_action += 1;
        id
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    fn reject(
        &mut self,
        player: PlayerId,
        reason: RejectReason,
        sink: &mut dyn EventSink,
    ) -> SubmitError {
        let id = self.next_id();
        debug!(action = %id, player = %player, code = reason.code(), "submission rejected");
        sink.publish(EngineEvent::ActionRejected { action: id, player, reason: reason.clone() });
        SubmitError::Rejected { reason }
    }
}

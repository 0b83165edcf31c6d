//! Error taxonomy.
//!
//! Three layers, matching where a command can die:
//!
//! - [`SubmitError`]: the submission itself is malformed or the queue is
//!   gone. Surfaced as a `Result::Err` to the transport.
//! - [`RejectReason`]: the submission was accepted but failed validation
//!   or execution. Surfaced through rejection events and the history,
//!   never as an `Err`, so one player's bad action cannot abort a round.
//! - [`RoomError`]: a lifecycle operation on the room was illegal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abilities::AbilityId;
use crate::core::phase::Phase;
use crate::core::player::PlayerId;
use crate::validation::RuleId;

/// A submission that never made it into the queue.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubmitError {
    #[error("unrecognized action kind `{kind}`")]
    InvalidCommandType { kind: String },

    #[error("ability actions must name an ability")]
    MissingAbility,

    #[error("{player} is not in this room")]
    UnknownPlayer { player: PlayerId },

    #[error("the action queue has been destroyed")]
    QueueDestroyed,

    #[error("action rejected: {reason}")]
    Rejected {
        #[source]
        reason: RejectReason,
    },
}

/// Why an accepted action was rejected at validation or execution time.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("validation failed on `{rule}`: {detail}")]
    RuleFailed { rule: RuleId, detail: String },

    #[error("{player} is not in this room")]
    ActorMissing { player: PlayerId },

    #[error("actor is dead")]
    ActorDead,

    #[error("actor is stunned")]
    ActorStunned,

    #[error("an action is already pending for this player")]
    AlreadyActed,

    #[error("{ability} does not exist")]
    UnknownAbility { ability: AbilityId },

    #[error("ability is on cooldown ({remaining} rounds left)")]
    OnCooldown { remaining: u32 },

    #[error("invalid target: {detail}")]
    InvalidTarget { detail: String },

    #[error("execution failed: {detail}")]
    ExecutionFailed { detail: String },

    #[error("commands of this kind are not accepted during the {phase} phase")]
    WrongPhase { phase: Phase },
}

impl RejectReason {
    /// Stable machine-readable code for transports.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::RuleFailed { .. } => "rule_failed",
            RejectReason::ActorMissing { .. } => "actor_missing",
            RejectReason::ActorDead => "actor_dead",
            RejectReason::ActorStunned => "actor_stunned",
            RejectReason::AlreadyActed => "already_acted",
            RejectReason::UnknownAbility { .. } => "unknown_ability",
            RejectReason::OnCooldown { .. } => "on_cooldown",
            RejectReason::InvalidTarget { .. } => "invalid_target",
            RejectReason::ExecutionFailed { .. } => "execution_failed",
            RejectReason::WrongPhase { .. } => "wrong_phase",
        }
    }
}

/// A room lifecycle operation that could not be performed.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoomError {
    #[error("the room is not accepting players in the {phase} phase")]
    NotAcceptingPlayers { phase: Phase },

    #[error("the room is full ({capacity} players)")]
    RoomFull { capacity: usize },

    #[error("the name `{name}` is already taken")]
    NameTaken { name: String },

    #[error("the room is not ready to start: {detail}")]
    NotReadyToStart { detail: String },

    #[error("illegal phase transition {from} -> {to}")]
    TransitionBlocked { from: Phase, to: Phase },

    #[error("round resolution is already in progress")]
    ResolutionInProgress,

    #[error("rounds can only resolve from the {expected} phase, not {actual}")]
    NotResolvable { expected: Phase, actual: Phase },

    #[error("the game has ended")]
    GameOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = SubmitError::InvalidCommandType { kind: "dance".into() };
        assert_eq!(err.to_string(), "unrecognized action kind `dance`");

        let err = SubmitError::UnknownPlayer { player: PlayerId::new(7) };
        assert_eq!(err.to_string(), "Player 7 is not in this room");
    }

    #[test]
    fn test_reject_codes_are_stable() {
        assert_eq!(RejectReason::ActorDead.code(), "actor_dead");
        assert_eq!(
            RejectReason::OnCooldown { remaining: 2 }.code(),
            "on_cooldown"
        );
    }

    #[test]
    fn test_reject_reason_serializes() {
        let reason = RejectReason::WrongPhase { phase: Phase::Waiting };
        let json = serde_json::to_string(&reason).unwrap();
        let back: RejectReason = serde_json::from_str(&json).unwrap();
        assert_eq!(reason, back);
    }
}

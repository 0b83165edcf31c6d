//! Room lifecycle phases and the legal transitions between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a room is in its lifecycle.
///
/// ```text
/// Waiting -> Preparation -> Action -> Resolution -+-> Action
///                                                 `-> Ended
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Lobby: players joining, game not started.
    Waiting,
    /// Roles dealt, waiting for everyone to signal ready.
    Preparation,
    /// Accepting action submissions for the current round.
    Action,
    /// Round resolution in progress; submissions are not accepted.
    Resolution,
    /// A win condition fired; the room is terminal.
    Ended,
}

impl Phase {
    /// All phases, in lifecycle order.
    pub const ALL: [Phase; 5] = [
        Phase::Waiting,
        Phase::Preparation,
        Phase::Action,
        Phase::Resolution,
        Phase::Ended,
    ];

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// `Ended` is terminal; nothing leaves it.
    #[must_use]
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Waiting, Phase::Preparation)
                | (Phase::Preparation, Phase::Action)
                | (Phase::Action, Phase::Resolution)
                | (Phase::Resolution, Phase::Action)
                | (Phase::Resolution, Phase::Ended)
        )
    }

    /// Whether this phase accepts queued action submissions.
    #[must_use]
    pub fn accepts_actions(self) -> bool {
        self == Phase::Action
    }

    /// Wire-format name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Preparation => "preparation",
            Phase::Action => "action",
            Phase::Resolution => "resolution",
            Phase::Ended => "ended",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path_is_legal() {
        assert!(Phase::Waiting.can_transition_to(Phase::Preparation));
        assert!(Phase::Preparation.can_transition_to(Phase::Action));
        assert!(Phase::Action.can_transition_to(Phase::Resolution));
        assert!(Phase::Resolution.can_transition_to(Phase::Action));
        assert!(Phase::Resolution.can_transition_to(Phase::Ended));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!Phase::Waiting.can_transition_to(Phase::Action));
        assert!(!Phase::Action.can_transition_to(Phase::Ended));
        assert!(!Phase::Preparation.can_transition_to(Phase::Waiting));
        for next in Phase::ALL {
            assert!(!Phase::Ended.can_transition_to(next));
        }
    }

    #[test]
    fn test_only_action_accepts_submissions() {
        for phase in Phase::ALL {
            assert_eq!(phase.accepts_actions(), phase == Phase::Action);
        }
    }
}

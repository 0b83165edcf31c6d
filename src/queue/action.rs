use std::fmt;

use serde::{Deserialize, Serialize};

use crate::abilities::AbilityId;
use crate::core::player::PlayerId;
use crate::core::request::{ActionKind, ActionOptions, Target};

/// Priority for abilities that do not declare their own.
pub const DEFAULT_PRIORITY: u8 = 5;

/// Priority for the defend action; defenses resolve before every
/// builtin ability so the bonus armor counts against same-round hits.
pub const DEFEND_PRIORITY: u8 = 10;

/// Queue-assigned identifier, unique within a room for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(u64);

impl ActionId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action {}", self.0)
    }
}

/// Where an action sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Executing,
    Completed,
    Failed,
    Cancelled,
}

/// An accepted action, either waiting in the queue or archived in the
/// history after processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedAction {
    pub id: ActionId,
    pub player: PlayerId,
    pub kind: ActionKind,
    pub ability: Option<AbilityId>,
    pub target: Option<Target>,
    pub priority: u8,
    /// Submission order, used to break priority ties first-come-first-served.
    pub sequence: u64,
    pub status: ActionStatus,
    pub options: ActionOptions,
}

//! Inbound action vocabulary: what a transport hands the engine.
//!
//! A request is intent only. IDs, sequence numbers, priorities, and
//! validation all happen engine-side when the request is submitted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::abilities::AbilityId;
use crate::core::player::PlayerId;
use crate::error::SubmitError;

/// Wire sentinel that targets the monster instead of a player.
pub const MONSTER_WIRE_ID: &str = "__monster__";

/// Something an action can point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Player(PlayerId),
    Monster,
}

impl Target {
    /// Parse a wire-format target: a player ID, or [`MONSTER_WIRE_ID`].
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        if raw == MONSTER_WIRE_ID {
            return Some(Target::Monster);
        }
        raw.parse::<u8>().ok().map(|id| Target::Player(PlayerId::new(id)))
    }

    /// Wire-format rendering, the inverse of [`Target::from_wire`].
    #[must_use]
    pub fn as_wire(self) -> String {
        match self {
            Target::Player(id) => id.raw().to_string(),
            Target::Monster => MONSTER_WIRE_ID.to_string(),
        }
    }

    /// The player behind this target, if it is one.
    #[must_use]
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Target::Player(id) => Some(id),
            Target::Monster => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Player(id) => write!(f, "{id}"),
            Target::Monster => write!(f, "the monster"),
        }
    }
}

/// The closed set of command kinds the engine accepts.
///
/// `Ready` and `Validate` execute immediately at submission; the other
/// kinds wait in the queue until the round resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    UseAbility,
    Defend,
    Ready,
    Validate,
}

impl ActionKind {
    /// Parse a wire-format kind name.
    ///
    /// Unknown kinds are a submission error, not a silent default: the
    /// caller sent a command this engine version does not speak.
    pub fn from_wire(raw: &str) -> Result<Self, SubmitError> {
        match raw {
            "ability" => Ok(ActionKind::UseAbility),
            "defend" => Ok(ActionKind::Defend),
            "ready" => Ok(ActionKind::Ready),
            "validate" => Ok(ActionKind::Validate),
            _ => Err(SubmitError::InvalidCommandType { kind: raw.to_string() }),
        }
    }

    /// Wire-format name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::UseAbility => "ability",
            ActionKind::Defend => "defend",
            ActionKind::Ready => "ready",
            ActionKind::Validate => "validate",
        }
    }

    /// Whether this kind executes at submission instead of queueing.
    #[must_use]
    pub fn is_immediate(self) -> bool {
        matches!(self, ActionKind::Ready | ActionKind::Validate)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional submission flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOptions {
    /// Part of a declared joint attack; grants the coordination damage bonus.
    #[serde(default)]
    pub coordinated: bool,
}

impl ActionOptions {
    /// Options with the coordination flag set.
    #[must_use]
    pub fn coordinated() -> Self {
        Self { coordinated: true }
    }
}

/// A complete inbound command, ready to submit to a room's queue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub kind: ActionKind,
    #[serde(default)]
    pub ability: Option<AbilityId>,
    #[serde(default)]
    pub target: Option<Target>,
    #[serde(default)]
    pub options: ActionOptions,
}

impl ActionRequest {
    /// An ability cast.
    #[must_use]
    pub fn ability(ability: AbilityId, target: Option<Target>) -> Self {
        Self {
            kind: ActionKind::UseAbility,
            ability: Some(ability),
            target,
            options: ActionOptions::default(),
        }
    }

    /// A defend command.
    #[must_use]
    pub fn defend() -> Self {
        Self {
            kind: ActionKind::Defend,
            ability: None,
            target: None,
            options: ActionOptions::default(),
        }
    }

    /// A readiness signal for the preparation phase.
    #[must_use]
    pub fn ready() -> Self {
        Self {
            kind: ActionKind::Ready,
            ability: None,
            target: None,
            options: ActionOptions::default(),
        }
    }

    /// A dry-run validation of an ability cast.
    #[must_use]
    pub fn validate(ability: AbilityId, target: Option<Target>) -> Self {
        Self {
            kind: ActionKind::Validate,
            ability: Some(ability),
            target,
            options: ActionOptions::default(),
        }
    }

    /// Set the options field (builder style).
    #[must_use]
    pub fn with_options(mut self, options: ActionOptions) -> Self {
        self.options = options;
        self
    }
}

//! # coven-engine
//!
//! Server-side round engine for a hidden-role party game: a roster of
//! players fights an escalating monster while secret Warlocks corrupt
//! the group from inside.
//!
//! ## Model
//!
//! Play is simultaneous. During each round's action phase every player
//! submits one action into a queue; nothing executes until the round
//! resolves. Resolution drains the queue in priority order, lets the
//! monster strike, ticks status effects, then lands all deaths at once,
//! so order of submission never decides who lives.
//!
//! Determinism is a design goal: a room is fully described by its
//! configuration, its seed, and the submissions it received, which makes
//! every game replayable.
//!
//! ## Modules
//!
//! - `core`: configuration, players, phases, requests, RNG, state, logs
//! - `abilities`: the catalog, targeting rules, and the executor
//! - `queue`: submission handling, priority ordering, history, stats
//! - `combat`: damage, healing, armor, and two-phase death
//! - `status`: poison, shields, invisibility, stuns
//! - `monster`: the AI opponent and its level curve
//! - `corruption`: Warlock conversion attempts
//! - `validation`: scored rule checks for actions, state, transitions
//! - `room`: the public lifecycle and the round pipeline
//! - `events`: outbound notifications for transports

pub mod abilities;
pub mod combat;
pub mod core;
pub mod corruption;
pub mod error;
pub mod events;
pub mod monster;
pub mod queue;
pub mod room;
pub mod status;
pub mod validation;

pub use crate::core::{
    ActionKind, ActionOptions, ActionRequest, Class, GameOutcome, GameRng, LogEntry,
    LogVisibility, Phase, Player, PlayerId, Race, Role, RngState, RoomConfig, RoomState, Roster,
    RoundLog, Target, MONSTER_WIRE_ID,
};

pub use crate::abilities::{AbilityBook, AbilityDef, AbilityEffect, AbilityId, TargetRule};

pub use crate::combat::{CombatResolver, Source};

pub use crate::corruption::Corruption;

pub use crate::error::{RejectReason, RoomError, SubmitError};

pub use crate::events::{EngineEvent, EventBuffer, EventSink, NullSink};

pub use crate::monster::{Monster, MonsterController, MonsterView};

pub use crate::queue::{
    ActionId, ActionQueue, ActionStatus, QueueStats, QueuedAction, RoundReport,
};

pub use crate::room::{GameRoom, PlayerView, RoleReveal, RoomView, RoundSummary};

pub use crate::status::{StatusEffect, StatusKind, StatusScheduler};

pub use crate::validation::{
    validate, RuleId, RuleOutcome, RuleStatus, ValidationOptions, ValidationRequest,
    ValidationResult,
};

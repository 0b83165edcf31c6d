//! Core room types: players, configuration, phases, state, RNG, logging.
//!
//! Everything here is subsystem-agnostic. Resolvers, schedulers, and the
//! queue build on these types rather than defining their own.

pub mod config;
pub mod log;
pub mod phase;
pub mod player;
pub mod request;
pub mod rng;
pub mod state;

pub use config::RoomConfig;
pub use log::{LogEntry, LogVisibility, RoundLog};
pub use phase::Phase;
pub use player::{Class, DeathCause, OneShotEffect, PendingDeath, Player, PlayerId, Race, Role, Roster};
pub use request::{ActionKind, ActionOptions, ActionRequest, Target, MONSTER_WIRE_ID};
pub use rng::{GameRng, RngState};
pub use state::{GameOutcome, RoomState};

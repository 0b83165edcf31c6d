//! Action queuing and round processing.

mod action;
mod processor;

pub use action::{ActionId, ActionStatus, QueuedAction, DEFAULT_PRIORITY, DEFEND_PRIORITY};
pub use processor::{ActionQueue, QueueStats, RoundReport};

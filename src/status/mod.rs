//! Status effects: timed modifiers attached to players.
//!
//! A status is a small uniform record (damage per turn, armor bonus,
//! remaining turns) keyed by [`StatusKind`]. The scheduler applies,
//! refreshes, ticks, and expires them once per round.
//!
//! ## Kinds
//!
//! - `Poisoned`: end-of-round damage, can kill
//! - `Shielded`: temporary armor bonus
//! - `Invisible`: untargetable by the monster and by single-target strikes
//! - `Stunned`: action submissions are rejected while active

mod scheduler;

pub use scheduler::StatusScheduler;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of status effects the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Poisoned,
    Shielded,
    Invisible,
    Stunned,
}

impl StatusKind {
    /// All kinds, in the order timed processing visits them.
    ///
    /// Poison ticks first so a shield gained the same round never
    /// outlives the damage it was meant to soak.
    pub const ALL: [StatusKind; 4] = [
        StatusKind::Poisoned,
        StatusKind::Shielded,
        StatusKind::Invisible,
        StatusKind::Stunned,
    ];

    /// Parse a wire-format kind name, e.g. from a stored ability table.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "poisoned" => Some(StatusKind::Poisoned),
            "shielded" => Some(StatusKind::Shielded),
            "invisible" => Some(StatusKind::Invisible),
            "stunned" => Some(StatusKind::Stunned),
            _ => None,
        }
    }

    /// Wire-format name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Poisoned => "poisoned",
            StatusKind::Shielded => "shielded",
            StatusKind::Invisible => "invisible",
            StatusKind::Stunned => "stunned",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One active status on a player.
///
/// All kinds share the same payload shape; fields a kind does not use
/// stay zero. Re-applying a status refreshes the existing entry rather
/// than stacking a second copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Damage dealt at end of round (poison only).
    pub damage_per_turn: u32,
    /// Added to effective armor while active (shield only).
    pub armor_bonus: i32,
    /// Rounds left, decremented after each tick; removed at zero.
    pub remaining_turns: u32,
}

impl StatusEffect {
    /// Poison dealing `damage_per_turn` at the end of each round.
    #[must_use]
    pub fn poison(damage_per_turn: u32, turns: u32) -> Self {
        Self {
            kind: StatusKind::Poisoned,
            damage_per_turn,
            armor_bonus: 0,
            remaining_turns: turns,
        }
    }

    /// Shield granting `armor_bonus` points of armor.
    #[must_use]
    pub fn shield(armor_bonus: i32, turns: u32) -> Self {
        Self {
            kind: StatusKind::Shielded,
            damage_per_turn: 0,
            armor_bonus,
            remaining_turns: turns,
        }
    }

    /// Invisibility for `turns` rounds.
    #[must_use]
    pub fn invisible(turns: u32) -> Self {
        Self {
            kind: StatusKind::Invisible,
            damage_per_turn: 0,
            armor_bonus: 0,
            remaining_turns: turns,
        }
    }

    /// Stun for `turns` rounds.
    #[must_use]
    pub fn stun(turns: u32) -> Self {
        Self {
            kind: StatusKind::Stunned,
            damage_per_turn: 0,
            armor_bonus: 0,
            remaining_turns: turns,
        }
    }
}

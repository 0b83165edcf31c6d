//! Room state: the single mutable center every subsystem operates on.
//!
//! Resolvers and schedulers are stateless; they take `&mut RoomState`
//! and leave all persistent data here. That keeps borrow lines simple
//! and makes a room fully described by (config, seed, submissions).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::RoomConfig;
use super::phase::Phase;
use super::player::{PlayerId, Role, Roster};
use super::rng::GameRng;
use crate::abilities::AbilityBook;
use crate::monster::Monster;

/// How a finished game came out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    /// Every Warlock is dead.
    InnocentsWin,
    /// Warlocks reached parity with the living.
    WarlocksWin,
    /// Nobody is left standing.
    MonsterWins,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameOutcome::InnocentsWin => "the Innocents win",
            GameOutcome::WarlocksWin => "the Warlocks win",
            GameOutcome::MonsterWins => "the Monster wins",
        };
        write!(f, "{text}")
    }
}

/// Complete server-side state for one room.
#[derive(Clone, Debug)]
pub struct RoomState {
    pub config: RoomConfig,
    pub roster: Roster,
    pub monster: Monster,
    pub abilities: AbilityBook,
    pub phase: Phase,
    /// Rounds resolved so far plus one while a round is open; zero in
    /// the lobby.
    pub round: u32,
    /// Monster level, starting at 1 and rising on every respawn.
    pub level: u32,
    /// Live Warlock tally, maintained by the corruption subsystem.
    pub warlock_count: u32,
    pub(crate) roles_assigned: bool,
    pub rng: GameRng,
}

impl RoomState {
    /// Create lobby-phase state from a config and seed.
    #[must_use]
    pub fn new(config: RoomConfig, seed: u64) -> Self {
        let monster = Monster::new(&config);
        Self {
            config,
            roster: Roster::new(),
            monster,
            abilities: AbilityBook::builtin(),
            phase: Phase::Waiting,
            round: 0,
            level: 1,
            warlock_count: 0,
            roles_assigned: false,
            rng: GameRng::new(seed),
        }
    }

    /// Display name for a player ID.
    #[must_use]
    pub fn player_name(&self, id: PlayerId) -> String {
        self.roster.display_name(id)
    }

    /// Deal hidden roles across the roster.
    ///
    /// At least one Warlock is always dealt; the exact set is drawn from
    /// the room RNG so a seeded room deals reproducibly.
    pub(crate) fn assign_roles(&mut self) {
        let count = self.config.warlock_count(self.roster.len());
        let picks = self.rng.pick_indices(count, self.roster.len());
        for (index, player) in self.roster.iter_mut().enumerate() {
            let role = if picks.contains(&index) {
                Role::Warlock
            } else {
                Role::Innocent
            };
            player.set_role(role);
        }
        self.warlock_count = count as u32;
        self.roles_assigned = true;
    }

    /// The current win condition, if one has fired.
    ///
    /// Checked once per round after deaths resolve; meaningless (always
    /// `None`) before roles are dealt.
    #[must_use]
    pub fn win_outcome(&self) -> Option<GameOutcome> {
        if !self.roles_assigned {
            return None;
        }
        let alive = self.roster.alive_count();
        if alive == 0 {
            return Some(GameOutcome::MonsterWins);
        }
        let warlocks = self.roster.alive_warlocks();
        if warlocks == 0 {
            return Some(GameOutcome::InnocentsWin);
        }
        if warlocks * 2 >= alive {
            return Some(GameOutcome::WarlocksWin);
        }
        None
    }
}

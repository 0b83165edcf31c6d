//! The monster: the co-op threat every round ends with.
//!
//! The monster has no queue entry. After player actions resolve, its
//! attack runs unconditionally, then ageing and respawn bookkeeping.
//! All monster behavior is deterministic given the room state; only
//! players introduce randomness.

use serde::{Deserialize, Serialize};

use crate::combat::{CombatResolver, Source};
use crate::core::config::RoomConfig;
use crate::core::log::{LogEntry, RoundLog};
use crate::core::player::PlayerId;
use crate::core::state::RoomState;

/// Display name used in combat logs.
pub const MONSTER_NAME: &str = "the Monster";

/// The monster's mutable state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub health: u32,
    pub max_health: u32,
    /// Damage before age scaling.
    pub base_damage: u32,
    /// Full rounds survived since spawn. Scales the next attack.
    pub age: u32,
}

impl Monster {
    /// A freshly spawned level-1 monster.
    #[must_use]
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            health: config.monster_base_health,
            max_health: config.monster_base_health,
            base_damage: config.monster_base_damage,
            age: 0,
        }
    }

    /// Whether the monster still stands.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Damage the next attack will deal: base scaled by age.
    #[must_use]
    pub fn next_damage(&self) -> u32 {
        self.base_damage * (self.age + 1)
    }
}

/// Client-facing monster snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterView {
    pub health: u32,
    pub max_health: u32,
    pub level: u32,
    pub age: u32,
    pub next_damage: u32,
}

/// Stateless monster logic over [`RoomState`].
pub struct MonsterController;

impl MonsterController {
    /// Snapshot for broadcasting.
    #[must_use]
    pub fn state(state: &RoomState) -> MonsterView {
        MonsterView {
            health: state.monster.health,
            max_health: state.monster.max_health,
            level: state.level,
            age: state.monster.age,
            next_damage: state.monster.next_damage(),
        }
    }

    /// One round of survival: the next attack grows.
    pub fn age_monster(state: &mut RoomState) {
        if state.monster.is_alive() {
            state.monster.age += 1;
        }
    }

    /// Apply player damage to the monster.
    ///
    /// Hits on an already-dead monster are wasted: logged, not applied.
    /// Returns whether damage landed.
    pub fn take_damage(
        state: &mut RoomState,
        amount: u32,
        attacker: PlayerId,
        log: &mut RoundLog,
    ) -> bool {
        if !state.monster.is_alive() {
            log.push(LogEntry::MonsterAlreadyDown);
            return false;
        }

        let name = state.player_name(attacker);
        state.monster.health = state.monster.health.saturating_sub(amount);
        log.push(LogEntry::MonsterDamaged {
            attacker: name.clone(),
            amount,
            remaining: state.monster.health,
        });
        if !state.monster.is_alive() {
            log.push(LogEntry::MonsterSlain { slayer: name });
        }
        true
    }

    /// The monster's end-of-round attack.
    ///
    /// Targets the lowest-health visible player, falling back to the
    /// highest-health living player when everyone is hidden. Returns the
    /// struck player, or `None` (with an idle log line) when the monster
    /// is dead or the field is empty.
    pub fn attack(state: &mut RoomState, log: &mut RoundLog) -> Option<PlayerId> {
        if !state.monster.is_alive() {
            log.push(LogEntry::MonsterIdle);
            return None;
        }

        let target = Self::select_target(state);
        let Some(target) = target else {
            log.push(LogEntry::MonsterIdle);
            return None;
        };

        let damage = state.monster.next_damage();
        CombatResolver::apply_damage_to_player(state, target, damage, Source::Monster, log, false);
        Some(target)
    }

    /// Roll the level and respawn the monster if it died this round.
    ///
    /// Returns the (possibly unchanged) monster level. The new monster
    /// spawns at full health per the level curve, with its age reset.
    pub fn handle_death_and_respawn(state: &mut RoomState, log: &mut RoundLog) -> u32 {
        if state.monster.is_alive() {
            return state.level;
        }

        let fallen = state.level;
        state.level += 1;
        let health = state.config.monster_health_at(state.level);
        state.monster.health = health;
        state.monster.max_health = health;
        state.monster.age = 0;

        log.push(LogEntry::MonsterFell { level: fallen });
        log.push(LogEntry::MonsterRespawned { level: state.level, health });
        state.level
    }

    /// Lowest-health visible player, ties broken by join order; falls
    /// back to the highest-health living player when nobody is visible.
    fn select_target(state: &RoomState) -> Option<PlayerId> {
        let mut lowest_visible: Option<(PlayerId, u32)> = None;
        let mut highest_alive: Option<(PlayerId, u32)> = None;

        for player in state.roster.alive() {
            if player.is_visible() {
                match lowest_visible {
                    Some((_, health)) if player.health >= health => {}
                    _ => lowest_visible = Some((player.id, player.health)),
                }
            }
            match highest_alive {
                Some((_, health)) if player.health <= health => {}
                _ => highest_alive = Some((player.id, player.health)),
            }
        }

        lowest_visible.or(highest_alive).map(|(id, _)| id)
    }
}

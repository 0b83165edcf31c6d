//! Applies, refreshes, ticks, and expires status effects.
//!
//! Ticking runs once per round, after actions and the monster attack.
//! For every living player each kind is visited in [`StatusKind::ALL`]
//! order: poison deals its end-of-round damage (armor does not apply),
//! then the effect's clock counts down, dropping it at zero.

use crate::core::log::{LogEntry, RoundLog};
use crate::core::player::{DeathCause, PendingDeath, PlayerId};
use crate::core::state::RoomState;

use super::{StatusEffect, StatusKind};

/// Stateless status logic over [`RoomState`].
pub struct StatusScheduler;

impl StatusScheduler {
    /// Attach an effect to a player, refreshing any existing effect of
    /// the same kind instead of stacking a second copy.
    ///
    /// Returns whether the effect landed; dead or missing players take
    /// nothing.
    pub fn apply_effect(
        state: &mut RoomState,
        player: PlayerId,
        effect: StatusEffect,
        log: &mut RoundLog,
    ) -> bool {
        let Some(target) = state.roster.get_mut(player) else {
            return false;
        };
        if !target.alive {
            return false;
        }
        let name = target.name.clone();
        let turns = effect.remaining_turns;
        let refreshed = target.statuses.insert(effect.kind, effect).is_some();
        log.push(if refreshed {
            LogEntry::StatusRefreshed { target: name, kind: effect.kind, turns }
        } else {
            LogEntry::StatusApplied { target: name, kind: effect.kind, turns }
        });
        true
    }

    /// Apply an effect named in wire format, e.g. from stored ability
    /// data. Unrecognized kinds log a rejection line and change nothing.
    pub fn apply_wire(
        state: &mut RoomState,
        player: PlayerId,
        name: &str,
        damage_per_turn: u32,
        armor_bonus: i32,
        turns: u32,
        log: &mut RoundLog,
    ) -> bool {
        let Some(kind) = StatusKind::from_wire(name) else {
            let target = state.player_name(player);
            log.push(LogEntry::StatusRejected { target, name: name.to_string() });
            return false;
        };
        let effect = StatusEffect {
            kind,
            damage_per_turn,
            armor_bonus,
            remaining_turns: turns,
        };
        Self::apply_effect(state, player, effect, log)
    }

    /// Remove an effect ahead of its natural expiry.
    ///
    /// Returns whether anything was removed.
    pub fn remove_effect(state: &mut RoomState, player: PlayerId, kind: StatusKind) -> bool {
        state
            .roster
            .get_mut(player)
            .is_some_and(|p| p.statuses.remove(&kind).is_some())
    }

    /// Whether a player currently has an effect of the given kind.
    #[must_use]
    pub fn has_effect(state: &RoomState, player: PlayerId, kind: StatusKind) -> bool {
        state.roster.get(player).is_some_and(|p| p.has_status(kind))
    }

    /// The active effect of a kind on a player, if any.
    #[must_use]
    pub fn effect_data(
        state: &RoomState,
        player: PlayerId,
        kind: StatusKind,
    ) -> Option<StatusEffect> {
        state
            .roster
            .get(player)
            .and_then(|p| p.statuses.get(&kind).copied())
    }

    /// The end-of-round tick: poison damage, clocks down, expiries out.
    ///
    /// Players are visited in join order and kinds in [`StatusKind::ALL`]
    /// order, so the log is deterministic. Poison that lands a player at
    /// zero health stamps a pending death; it never kills directly.
    pub fn process_timed_effects(state: &mut RoomState, log: &mut RoundLog) {
        let ids: Vec<PlayerId> = state.roster.ids().collect();
        for id in ids {
            let Some(player) = state.roster.get_mut(id) else {
                continue;
            };
            if !player.alive {
                continue;
            }
            let name = player.name.clone();

            for kind in StatusKind::ALL {
                let Some(mut effect) = player.statuses.get(&kind).copied() else {
                    continue;
                };

                if kind == StatusKind::Poisoned && effect.damage_per_turn > 0 {
                    let damage = effect.damage_per_turn;
                    player.health = player.health.saturating_sub(damage);
                    log.push(LogEntry::PoisonTick { target: name.clone(), damage });
                    if player.health == 0 && player.pending_death.is_none() {
                        player.pending_death = Some(PendingDeath {
                            killer: "poison".to_string(),
                            cause: DeathCause::Poison,
                        });
                    }
                }

                effect.remaining_turns = effect.remaining_turns.saturating_sub(1);
                if effect.remaining_turns == 0 {
                    player.statuses.remove(&kind);
                    log.push(LogEntry::StatusExpired { target: name.clone(), kind });
                } else {
                    player.statuses.insert(kind, effect);
                }
            }
        }
    }
}

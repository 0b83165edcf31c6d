//! Corruption: the only way a hidden role ever changes.
//!
//! When a Warlock damages or heals an Innocent there is a chance the
//! target turns. The roll, the role flip, and the Warlock tally all live
//! here; nothing else in the engine may touch a player's role after
//! dealing. Conversion logs are secret and never reach clients.

use tracing::debug;

use crate::core::log::{LogEntry, RoundLog};
use crate::core::player::{PlayerId, Role};
use crate::core::state::RoomState;

/// Scale applied to per-target conversion rolls from area effects.
pub const AREA_CONVERSION_SCALE: f64 = 0.5;

/// Stateless corruption logic over [`RoomState`].
pub struct Corruption;

impl Corruption {
    /// Roll a conversion attempt from `attacker` against `target`.
    ///
    /// Succeeds only when the attacker is a living Warlock and the
    /// target a living Innocent other than the attacker. `scale`
    /// multiplies the configured base chance; area effects pass
    /// [`AREA_CONVERSION_SCALE`].
    ///
    /// Returns whether the target turned.
    pub fn attempt_conversion(
        state: &mut RoomState,
        attacker: PlayerId,
        target: PlayerId,
        scale: f64,
        log: &mut RoundLog,
    ) -> bool {
        if attacker == target {
            return false;
        }
        let Some(attacker_ref) = state.roster.get(attacker) else {
            return false;
        };
        if !attacker_ref.alive || !attacker_ref.is_warlock() {
            return false;
        }
        let Some(target_ref) = state.roster.get(target) else {
            return false;
        };
        if !target_ref.alive || target_ref.is_warlock() {
            return false;
        }

        let chance = state.config.corruption_chance * scale;
        if !state.rng.chance(chance) {
            return false;
        }

        let name = state.player_name(target);
        if let Some(player) = state.roster.get_mut(target) {
            player.set_role(Role::Warlock);
        }
        state.warlock_count += 1;
        debug!(player = %target, "conversion succeeded");
        log.push(LogEntry::Corrupted { player: name });
        true
    }

    /// Drop the live Warlock tally by one. Called when a Warlock dies.
    pub fn decrement_warlock_count(state: &mut RoomState) {
        state.warlock_count = state.warlock_count.saturating_sub(1);
    }
}

//! Combat resolution: damage, healing, armor, and two-phase death.
//!
//! All functions are associated functions over [`RoomState`]; combat
//! itself holds no state. Damage follows a fixed sequence so tests can
//! pin each step:
//!
//! 1. one-shot immunity (consumes, absorbs everything)
//! 2. armor reduction (percentage per point, capped at 100%)
//! 3. health loss and the damage log line
//! 4. role reveal, when the ability asks for one
//! 5. pending-death marking (or an immediate resurrection)
//! 6. corruption roll, when the source is a Warlock
//!
//! Nothing dies mid-round: step 5 only stamps a marker, and
//! [`CombatResolver::process_pending_deaths`] settles every marker once
//! per round after actions and the monster have all resolved.

use serde::{Deserialize, Serialize};

use crate::core::log::{LogEntry, RoundLog};
use crate::core::player::{DeathCause, OneShotEffect, PendingDeath, PlayerId};
use crate::core::request::{ActionOptions, Target};
use crate::core::state::RoomState;
use crate::abilities::AbilityId;
use crate::corruption::{Corruption, AREA_CONVERSION_SCALE};
use crate::error::RejectReason;
use crate::monster::{MonsterController, MONSTER_NAME};

/// Where a hit came from. Decides log wording and corruption rolls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    Player(PlayerId),
    Monster,
}

impl Source {
    /// Display name for combat logs.
    #[must_use]
    pub fn display_name(&self, state: &RoomState) -> String {
        match self {
            Source::Player(id) => state.player_name(*id),
            Source::Monster => MONSTER_NAME.to_string(),
        }
    }
}

/// A fully validated command, ready for the queue to stamp and enqueue.
///
/// Produced by the pre-validating submission path; the queue assigns the
/// ID and sequence number.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionDraft {
    pub player: PlayerId,
    pub ability: AbilityId,
    pub target: Option<Target>,
    pub priority: u8,
    pub options: ActionOptions,
}

/// Stateless combat logic over [`RoomState`].
pub struct CombatResolver;

impl CombatResolver {
    /// Damage reduction curve: each armor point removes a fixed fraction,
    /// capped at full absorption. Negative armor amplifies.
    #[must_use]
    pub fn armor_reduced(raw: u32, armor: i32, per_point: f64) -> u32 {
        let reduction = (f64::from(armor) * per_point).min(1.0);
        (raw as f64 * (1.0 - reduction)).round() as u32
    }

    /// Apply damage to a player through the full sequence above.
    ///
    /// Returns whether the damage sequence ran. `false` means the target
    /// was missing, already dead, or the hit was fully absorbed by a
    /// one-shot immunity.
    pub fn apply_damage_to_player(
        state: &mut RoomState,
        target: PlayerId,
        raw: u32,
        source: Source,
        log: &mut RoundLog,
        reveal_role: bool,
    ) -> bool {
        Self::damage_player(state, target, raw, source, log, reveal_role, 1.0)
    }

    fn damage_player(
        state: &mut RoomState,
        target: PlayerId,
        raw: u32,
        source: Source,
        log: &mut RoundLog,
        reveal_role: bool,
        conversion_scale: f64,
    ) -> bool {
        let source_name = source.display_name(state);

        let Some(player) = state.roster.get(target) else {
            return false;
        };
        if !player.alive {
            return false;
        }
        let armor = player.effective_armor();
        let target_name = player.name.clone();

        let per_point = state.config.armor_reduction_per_point;
        let Some(player) = state.roster.get_mut(target) else {
            return false;
        };

        if let Some(effect) = player.try_consume_immunity() {
            log.push(LogEntry::DamageAbsorbed {
                target: target_name,
                effect: effect.to_string(),
            });
            return false;
        }

        let reduced = Self::armor_reduced(raw, armor, per_point);
        player.health = player.health.saturating_sub(reduced);
        log.push(LogEntry::Damage {
            attacker: source_name.clone(),
            target: target_name.clone(),
            amount: reduced,
        });

        if reveal_role {
            log.push(LogEntry::RoleSensed {
                seer: source_name.clone(),
                target: target_name.clone(),
                warlock: player.is_warlock(),
            });
        }

        if player.health == 0 {
            if let Some(restore) = player.try_consume_resurrection() {
                player.health = restore.min(player.max_health);
                log.push(LogEntry::Resurrected {
                    player: target_name,
                    effect: OneShotEffect::Resurrection { restore_to: restore }
                        .label()
                        .to_string(),
                    restored: restore,
                });
            } else if player.pending_death.is_none() {
                player.pending_death = Some(PendingDeath {
                    killer: source_name,
                    cause: DeathCause::Strike,
                });
            }
        }

        if let Source::Player(attacker) = source {
            Corruption::attempt_conversion(state, attacker, target, conversion_scale, log);
        }
        true
    }

    /// Apply player damage to the monster.
    pub fn apply_damage_to_monster(
        state: &mut RoomState,
        amount: u32,
        attacker: PlayerId,
        log: &mut RoundLog,
    ) -> bool {
        MonsterController::take_damage(state, amount, attacker, log)
    }

    /// Heal a player, scaled by the healer's modifier and clamped to
    /// missing health. Full-health targets are skipped silently.
    ///
    /// Returns the amount actually restored.
    pub fn heal_player(
        state: &mut RoomState,
        source: PlayerId,
        target: PlayerId,
        base: u32,
        log: &mut RoundLog,
    ) -> u32 {
        Self::heal_player_scaled(state, source, target, base, 1.0, log)
    }

    fn heal_player_scaled(
        state: &mut RoomState,
        source: PlayerId,
        target: PlayerId,
        base: u32,
        conversion_scale: f64,
        log: &mut RoundLog,
    ) -> u32 {
        let Some(healer) = state.roster.get(source) else {
            return 0;
        };
        let modifier = healer.heal_modifier();
        let healer_name = healer.name.clone();

        let Some(player) = state.roster.get(target) else {
            return 0;
        };
        if !player.alive {
            return 0;
        }
        let scaled = (f64::from(base) * modifier).round() as u32;
        let applied = scaled.min(player.missing_health());
        if applied == 0 {
            return 0;
        }
        let target_name = player.name.clone();

        if let Some(player) = state.roster.get_mut(target) {
            player.health += applied;
        }
        log.push(LogEntry::Healed {
            healer: healer_name,
            target: target_name,
            amount: applied,
        });

        Corruption::attempt_conversion(state, source, target, conversion_scale, log);
        applied
    }

    /// Damage every listed target, skipping dead or missing entries.
    /// Per-target corruption rolls run at half strength.
    ///
    /// Returns how many targets were actually hit.
    pub fn apply_area_damage(
        state: &mut RoomState,
        source: PlayerId,
        amount: u32,
        targets: &[PlayerId],
        exclude_self: bool,
        log: &mut RoundLog,
    ) -> usize {
        let mut hit = 0;
        for &target in targets {
            if exclude_self && target == source {
                continue;
            }
            if !matches!(state.roster.get(target), Some(p) if p.alive) {
                continue;
            }
            if Self::damage_player(
                state,
                target,
                amount,
                Source::Player(source),
                log,
                false,
                AREA_CONVERSION_SCALE,
            ) {
                hit += 1;
            }
        }
        hit
    }

    /// Heal every listed target, skipping dead or missing entries and,
    /// when `exclude_warlocks` is set, Warlocks. Per-target corruption
    /// rolls run at half strength.
    ///
    /// Returns how many targets received healing.
    pub fn apply_area_healing(
        state: &mut RoomState,
        source: PlayerId,
        amount: u32,
        targets: &[PlayerId],
        exclude_self: bool,
        exclude_warlocks: bool,
        log: &mut RoundLog,
    ) -> usize {
        let mut healed = 0;
        for &target in targets {
            if exclude_self && target == source {
                continue;
            }
            let Some(player) = state.roster.get(target) else {
                continue;
            };
            if !player.alive {
                continue;
            }
            if exclude_warlocks && player.is_warlock() {
                continue;
            }
            if Self::heal_player_scaled(state, source, target, amount, AREA_CONVERSION_SCALE, log) > 0
            {
                healed += 1;
            }
        }
        healed
    }

    /// Settle every pending-death marker stamped this round.
    ///
    /// A resurrection one-shot gained since marking cancels the death.
    /// Otherwise the player dies for real: `alive` drops, health zeroes,
    /// the death is logged once, and a dead Warlock shrinks the tally.
    /// Markers are cleared either way, so a second call is a no-op.
    pub fn process_pending_deaths(state: &mut RoomState, log: &mut RoundLog) {
        let ids: Vec<PlayerId> = state.roster.ids().collect();
        for id in ids {
            let Some(player) = state.roster.get_mut(id) else {
                continue;
            };
            let Some(marker) = player.pending_death.take() else {
                continue;
            };

            if let Some(restore) = player.try_consume_resurrection() {
                player.health = restore.min(player.max_health);
                let name = player.name.clone();
                log.push(LogEntry::Resurrected {
                    player: name,
                    effect: OneShotEffect::Resurrection { restore_to: restore }
                        .label()
                        .to_string(),
                    restored: restore,
                });
                continue;
            }

            player.alive = false;
            player.health = 0;
            let was_warlock = player.is_warlock();
            let name = player.name.clone();
            log.push(LogEntry::Died {
                player: name,
                killer: marker.killer,
                cause: marker.cause,
            });
            if was_warlock {
                Corruption::decrement_warlock_count(state);
            }
        }
    }

    /// Swap a hidden player target for someone the caster can actually
    /// hit: a random living visible player other than the caster, or the
    /// monster when `allow_monster` and nobody qualifies.
    ///
    /// Visible targets (and the monster, and the caster themselves) pass
    /// through unchanged. `None` means the cast has nowhere to land.
    pub(crate) fn retarget_if_hidden(
        state: &mut RoomState,
        actor: PlayerId,
        target: Target,
        allow_monster: bool,
    ) -> Option<Target> {
        let hidden = match target {
            Target::Monster => false,
            Target::Player(id) if id == actor => false,
            Target::Player(id) => state
                .roster
                .get(id)
                .is_some_and(|p| p.alive && !p.is_visible()),
        };
        if !hidden {
            return Some(target);
        }

        let candidates: Vec<Target> = state
            .roster
            .alive()
            .filter(|p| p.id != actor && p.is_visible())
            .map(|p| Target::Player(p.id))
            .collect();

        if candidates.is_empty() {
            return allow_monster.then_some(Target::Monster);
        }
        state.rng.pick(&candidates).copied()
    }

    /// Pre-validating submission path: run the synchronous gate checks
    /// and produce a draft for the queue.
    ///
    /// Checks run in a fixed order, so the first failure reported is
    /// stable: actor exists and lives, is not stunned, has no pending
    /// action, the ability exists and is off cooldown, and the target is
    /// legal (hidden targets are silently retargeted).
    pub fn validate_and_queue_action(
        state: &mut RoomState,
        actor: PlayerId,
        ability: AbilityId,
        target: Option<Target>,
        options: ActionOptions,
        pending: &[crate::queue::QueuedAction],
    ) -> Result<ActionDraft, RejectReason> {
        let Some(player) = state.roster.get(actor) else {
            return Err(RejectReason::ActorMissing { player: actor });
        };
        if !player.alive {
            return Err(RejectReason::ActorDead);
        }
        if player.is_stunned() {
            return Err(RejectReason::ActorStunned);
        }
        if pending.iter().any(|a| a.player == actor) {
            return Err(RejectReason::AlreadyActed);
        }

        let Some(def) = state.abilities.get(ability) else {
            return Err(RejectReason::UnknownAbility { ability });
        };
        if !player.knows(ability) {
            return Err(RejectReason::UnknownAbility { ability });
        }
        let remaining = player.cooldown_remaining(ability);
        if remaining > 0 {
            return Err(RejectReason::OnCooldown { remaining });
        }

        let priority = def.priority;
        let targeting = def.targeting;
        let hostile = def.effect.is_hostile();
        let allow_monster = matches!(targeting, crate::abilities::TargetRule::PlayerOrMonster);

        let checked = crate::validation::check_target(state, actor, targeting, target)
            .map_err(|detail| RejectReason::InvalidTarget { detail })?;

        let resolved = match checked {
            Some(t) if hostile => Some(
                Self::retarget_if_hidden(state, actor, t, allow_monster).ok_or_else(|| {
                    RejectReason::InvalidTarget {
                        detail: "no visible target".to_string(),
                    }
                })?,
            ),
            other => other,
        };

        Ok(ActionDraft {
            player: actor,
            ability,
            target: resolved,
            priority,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RoomConfig;
    use crate::core::player::{Class, Race, Role};

    fn arena() -> RoomState {
        let config = RoomConfig::default().with_corruption_chance(0.0);
        let mut state = RoomState::new(config, 3);
        state.roster.add("Kara", Race::Human, Class::Warrior); // armor 2
        state.roster.add("Vex", Race::Elf, Class::Priest); // armor 0
        state.roles_assigned = true;
        state
    }

    #[test]
    fn test_armor_curve() {
        assert_eq!(CombatResolver::armor_reduced(100, 2, 0.10), 80);
        assert_eq!(CombatResolver::armor_reduced(100, 15, 0.10), 0); // capped at 100%
        assert_eq!(CombatResolver::armor_reduced(100, -2, 0.10), 120); // amplified
        assert_eq!(CombatResolver::armor_reduced(0, 5, 0.10), 0);
    }

    #[test]
    fn test_damage_applies_armor_and_logs_reduced_amount() {
        let mut state = arena();
        let target = PlayerId::new(0);
        state.roster.get_mut(target).unwrap().health = 100;
        let mut log = RoundLog::new();

        let applied = CombatResolver::apply_damage_to_player(
            &mut state,
            target,
            100,
            Source::Monster,
            &mut log,
            false,
        );
        assert!(applied);
        assert_eq!(state.roster.get(target).unwrap().health, 20); // 100 - 80
        assert_eq!(
            log.entries()[0],
            LogEntry::Damage {
                attacker: "the Monster".into(),
                target: "Kara".into(),
                amount: 80,
            }
        );
    }

    #[test]
    fn test_immunity_absorbs_and_is_consumed() {
        let mut state = arena();
        let dwarf = state.roster.add("Bron", Race::Dwarf, Class::Warrior);
        let mut log = RoundLog::new();

        let applied = CombatResolver::apply_damage_to_player(
            &mut state,
            dwarf,
            999,
            Source::Monster,
            &mut log,
            false,
        );
        assert!(!applied);
        assert_eq!(state.roster.get(dwarf).unwrap().health, 120);
        assert!(matches!(log.entries()[0], LogEntry::DamageAbsorbed { .. }));

        // Second hit goes through; the one-shot is gone.
        let applied = CombatResolver::apply_damage_to_player(
            &mut state,
            dwarf,
            10,
            Source::Monster,
            &mut log,
            false,
        );
        assert!(applied);
    }

    #[test]
    fn test_zero_health_marks_pending_but_keeps_alive() {
        let mut state = arena();
        let target = PlayerId::new(1);
        state.roster.get_mut(target).unwrap().health = 5;
        let mut log = RoundLog::new();

        CombatResolver::apply_damage_to_player(&mut state, target, 50, Source::Monster, &mut log, false);

        let player = state.roster.get(target).unwrap();
        assert_eq!(player.health, 0);
        assert!(player.alive, "death is deferred to end of round");
        assert_eq!(
            player.pending_death,
            Some(PendingDeath {
                killer: "the Monster".into(),
                cause: DeathCause::Strike,
            })
        );
    }

    #[test]
    fn test_first_killer_is_kept() {
        let mut state = arena();
        let target = PlayerId::new(1);
        state.roster.get_mut(target).unwrap().health = 1;
        let attacker = PlayerId::new(0);
        let mut log = RoundLog::new();

        CombatResolver::apply_damage_to_player(
            &mut state,
            target,
            50,
            Source::Player(attacker),
            &mut log,
            false,
        );
        CombatResolver::apply_damage_to_player(&mut state, target, 50, Source::Monster, &mut log, false);

        let marker = state.roster.get(target).unwrap().pending_death.clone().unwrap();
        assert_eq!(marker.killer, "Kara");
    }

    #[test]
    fn test_pending_deaths_resolve_once() {
        let mut state = arena();
        let target = PlayerId::new(1);
        state.roster.get_mut(target).unwrap().health = 1;
        let mut log = RoundLog::new();
        CombatResolver::apply_damage_to_player(&mut state, target, 99, Source::Monster, &mut log, false);

        CombatResolver::process_pending_deaths(&mut state, &mut log);
        let player = state.roster.get(target).unwrap();
        assert!(!player.alive);
        assert_eq!(player.health, 0);
        let deaths = log
            .entries()
            .iter()
            .filter(|e| matches!(e, LogEntry::Died { .. }))
            .count();
        assert_eq!(deaths, 1);

        // Second pass has no marker left: no double death, no double log.
        CombatResolver::process_pending_deaths(&mut state, &mut log);
        let deaths = log
            .entries()
            .iter()
            .filter(|e| matches!(e, LogEntry::Died { .. }))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_resurrection_cancels_pending_death() {
        let mut state = arena();
        let lich = state.roster.add("Morri", Race::Lich, Class::Oracle);
        state.roster.get_mut(lich).unwrap().health = 1;
        let mut log = RoundLog::new();

        CombatResolver::apply_damage_to_player(&mut state, lich, 500, Source::Monster, &mut log, false);
        let player = state.roster.get(lich).unwrap();
        assert!(player.alive);
        assert_eq!(player.health, 5, "restored to the hook's value");
        assert!(player.pending_death.is_none());
        assert!(log
            .entries()
            .iter()
            .any(|e| matches!(e, LogEntry::Resurrected { restored: 5, .. })));
    }

    #[test]
    fn test_warlock_death_shrinks_tally() {
        let mut state = arena();
        let target = PlayerId::new(1);
        state.roster.get_mut(target).unwrap().set_role(Role::Warlock);
        state.warlock_count = 1;
        state.roster.get_mut(target).unwrap().health = 1;
        let mut log = RoundLog::new();

        CombatResolver::apply_damage_to_player(&mut state, target, 99, Source::Monster, &mut log, false);
        CombatResolver::process_pending_deaths(&mut state, &mut log);
        assert_eq!(state.warlock_count, 0);
    }

    #[test]
    fn test_heal_is_clamped_and_logs_clamped_amount() {
        let mut state = arena();
        let healer = PlayerId::new(1); // priest, modifier 1.2
        let target = PlayerId::new(0);
        state.roster.get_mut(target).unwrap().health = 110; // missing 10 of 120
        let mut log = RoundLog::new();

        let applied = CombatResolver::heal_player(&mut state, healer, target, 30, &mut log);
        assert_eq!(applied, 10);
        assert_eq!(state.roster.get(target).unwrap().health, 120);
        assert_eq!(
            log.entries()[0],
            LogEntry::Healed {
                healer: "Vex".into(),
                target: "Kara".into(),
                amount: 10,
            }
        );
    }

    #[test]
    fn test_heal_on_full_health_does_nothing() {
        let mut state = arena();
        let mut log = RoundLog::new();
        let applied =
            CombatResolver::heal_player(&mut state, PlayerId::new(1), PlayerId::new(0), 30, &mut log);
        assert_eq!(applied, 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_area_damage_skips_dead_and_missing() {
        let mut state = arena();
        let caster = PlayerId::new(0);
        let dead = PlayerId::new(1);
        state.roster.get_mut(dead).unwrap().alive = false;
        let ghost = PlayerId::new(42);
        let mut log = RoundLog::new();

        let hit = CombatResolver::apply_area_damage(
            &mut state,
            caster,
            20,
            &[caster, dead, ghost],
            true,
            &mut log,
        );
        assert_eq!(hit, 0, "self excluded, dead and missing skipped");
    }

    #[test]
    fn test_area_heal_skips_warlocks() {
        let mut state = arena();
        let caster = PlayerId::new(1);
        let warlock = PlayerId::new(0);
        state.roster.get_mut(warlock).unwrap().set_role(Role::Warlock);
        state.roster.get_mut(warlock).unwrap().health = 50;
        state.roster.get_mut(caster).unwrap().health = 50;
        let mut log = RoundLog::new();

        let healed = CombatResolver::apply_area_healing(
            &mut state,
            caster,
            15,
            &[warlock, caster],
            false,
            true,
            &mut log,
        );
        assert_eq!(healed, 1, "only the innocent caster is healed");
        assert_eq!(state.roster.get(warlock).unwrap().health, 50);
    }

    #[test]
    fn test_certain_conversion_on_damage() {
        let config = RoomConfig::default().with_corruption_chance(1.0);
        let mut state = RoomState::new(config, 5);
        let warlock = state.roster.add("Mal", Race::Human, Class::Warrior);
        let victim = state.roster.add("Iva", Race::Elf, Class::Priest);
        state.roster.get_mut(warlock).unwrap().set_role(Role::Warlock);
        state.roles_assigned = true;
        state.warlock_count = 1;
        let mut log = RoundLog::new();

        CombatResolver::apply_damage_to_player(
            &mut state,
            victim,
            10,
            Source::Player(warlock),
            &mut log,
            false,
        );
        assert!(state.roster.get(victim).unwrap().is_warlock());
        assert_eq!(state.warlock_count, 2);
    }

    #[test]
    fn test_retarget_skips_hidden_players() {
        use crate::status::{StatusEffect, StatusKind};

        let mut state = arena();
        let actor = PlayerId::new(0);
        let hidden = PlayerId::new(1);
        state
            .roster
            .get_mut(hidden)
            .unwrap()
            .statuses
            .insert(StatusKind::Invisible, StatusEffect::invisible(1));

        // Only other player is hidden: monster soaks the redirect.
        let redirected =
            CombatResolver::retarget_if_hidden(&mut state, actor, Target::Player(hidden), true);
        assert_eq!(redirected, Some(Target::Monster));

        // Player-only ability with nobody visible has nowhere to go.
        let redirected =
            CombatResolver::retarget_if_hidden(&mut state, actor, Target::Player(hidden), false);
        assert_eq!(redirected, None);

        // Visible targets pass through untouched.
        let visible = state.roster.add("Tam", Race::Human, Class::Tracker);
        let redirected =
            CombatResolver::retarget_if_hidden(&mut state, actor, Target::Player(visible), false);
        assert_eq!(redirected, Some(Target::Player(visible)));
    }
}

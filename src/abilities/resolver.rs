//! Executes queued actions against the room state.
//!
//! The resolver assumes the action already passed validation; it still
//! re-checks targets against the board as it stands now, because earlier
//! actions this round may have hidden or felled the chosen target.

use tracing::trace;

use crate::combat::{CombatResolver, Source};
use crate::core::log::{LogEntry, RoundLog};
use crate::core::player::PlayerId;
use crate::core::request::{ActionKind, Target};
use crate::core::state::RoomState;
use crate::error::RejectReason;
use crate::queue::QueuedAction;
use crate::status::{StatusEffect, StatusScheduler};

use super::definition::{AbilityEffect, TargetRule};

/// Stateless executor for round actions.
pub struct AbilityResolver;

impl AbilityResolver {
    /// Execute one action. Errors become rejections in the queue's
    /// history; they never abort the rest of the round.
    pub fn resolve(
        action: &QueuedAction,
        state: &mut RoomState,
        log: &mut RoundLog,
    ) -> Result<(), RejectReason> {
        trace!(action = %action.id, player = %action.player, "resolving");
        match action.kind {
            ActionKind::Defend => Self::resolve_defend(action.player, state, log),
            ActionKind::UseAbility => Self::resolve_cast(action, state, log),
            // immediate kinds execute at submission and never reach here
            ActionKind::Ready | ActionKind::Validate => Ok(()),
        }
    }

    fn resolve_defend(
        player: PlayerId,
        state: &mut RoomState,
        log: &mut RoundLog,
    ) -> Result<(), RejectReason> {
        let bonus = state.config.defend_armor_bonus;
        let duration = state.config.defend_duration;
        let Some(p) = state.roster.get(player) else {
            return Err(RejectReason::ActorMissing { player });
        };
        if !p.alive {
            return Err(RejectReason::ActorDead);
        }
        log.push(LogEntry::Defended { player: p.name.clone() });
        StatusScheduler::apply_effect(state, player, StatusEffect::shield(bonus, duration), log);
        Ok(())
    }

    fn resolve_cast(
        action: &QueuedAction,
        state: &mut RoomState,
        log: &mut RoundLog,
    ) -> Result<(), RejectReason> {
        let caster = action.player;
        let Some(ability) = action.ability else {
            return Err(RejectReason::ExecutionFailed {
                detail: "ability action without an ability".to_string(),
            });
        };
        let Some(def) = state.abilities.get(ability) else {
            return Err(RejectReason::UnknownAbility { ability });
        };
        let effect = def.effect;
        let targeting = def.targeting;
        let cooldown = def.cooldown;
        let hostile = effect.is_hostile();

        match effect {
            AbilityEffect::Strike { base, inflict, reveal } => {
                let target = Self::require_target(action)?;
                let allow_monster = targeting == TargetRule::PlayerOrMonster;
                let Some(resolved) =
                    CombatResolver::retarget_if_hidden(state, caster, target, allow_monster)
                else {
                    return Err(RejectReason::InvalidTarget {
                        detail: "no visible target".to_string(),
                    });
                };
                let amount = Self::outgoing_damage(state, caster, base, action.options.coordinated);
                match resolved {
                    Target::Monster => {
                        CombatResolver::apply_damage_to_monster(state, amount, caster, log);
                    }
                    Target::Player(victim) => {
                        let landed = CombatResolver::apply_damage_to_player(
                            state,
                            victim,
                            amount,
                            Source::Player(caster),
                            log,
                            reveal,
                        );
                        if landed {
                            if let Some(status) = inflict {
                                StatusScheduler::apply_effect(state, victim, status, log);
                            }
                        }
                    }
                }
            }
            AbilityEffect::Heal { base } => {
                let Target::Player(recipient) = Self::require_target(action)? else {
                    return Err(RejectReason::InvalidTarget {
                        detail: "heals target players".to_string(),
                    });
                };
                CombatResolver::heal_player(state, caster, recipient, base, log);
            }
            AbilityEffect::AreaStrike { base } => {
                let amount = Self::outgoing_damage(state, caster, base, action.options.coordinated);
                let targets: Vec<PlayerId> = state.roster.alive().map(|p| p.id).collect();
                CombatResolver::apply_area_damage(state, caster, amount, &targets, true, log);
            }
            AbilityEffect::AreaHeal { base } => {
                let targets: Vec<PlayerId> = state.roster.alive().map(|p| p.id).collect();
                CombatResolver::apply_area_healing(state, caster, base, &targets, false, true, log);
            }
            AbilityEffect::Afflict { effect: status } => {
                let recipient = match targeting {
                    TargetRule::SelfOnly => caster,
                    _ => {
                        let target = Self::require_target(action)?;
                        let resolved = if hostile {
                            CombatResolver::retarget_if_hidden(state, caster, target, false)
                                .ok_or_else(|| RejectReason::InvalidTarget {
                                    detail: "no visible target".to_string(),
                                })?
                        } else {
                            target
                        };
                        let Target::Player(id) = resolved else {
                            return Err(RejectReason::InvalidTarget {
                                detail: "afflictions target players".to_string(),
                            });
                        };
                        id
                    }
                };
                StatusScheduler::apply_effect(state, recipient, status, log);
            }
            AbilityEffect::Detect => {
                let Target::Player(suspect) = Self::require_target(action)? else {
                    return Err(RejectReason::InvalidTarget {
                        detail: "detection targets players".to_string(),
                    });
                };
                let Some(p) = state.roster.get(suspect) else {
                    return Err(RejectReason::InvalidTarget {
                        detail: format!("no player {suspect} in this room"),
                    });
                };
                let warlock = p.is_warlock();
                log.push(LogEntry::RoleSensed {
                    seer: state.player_name(caster),
                    target: state.player_name(suspect),
                    warlock,
                });
            }
        }

        if cooldown > 0 {
            if let Some(p) = state.roster.get_mut(caster) {
                p.trigger_cooldown(ability, cooldown);
            }
        }
        Ok(())
    }

    /// Outgoing damage after the caster's modifier, a held blood rage
    /// (consumed here), and the coordination bonus.
    fn outgoing_damage(
        state: &mut RoomState,
        caster: PlayerId,
        base: u32,
        coordinated: bool,
    ) -> u32 {
        let coordination_bonus = state.config.coordination_bonus;
        let Some(player) = state.roster.get_mut(caster) else {
            return base;
        };
        let mut multiplier = player.damage_modifier;
        if let Some(rage) = player.try_consume_blood_rage() {
            multiplier *= rage;
        }
        if coordinated {
            multiplier *= 1.0 + coordination_bonus;
        }
        (base as f64 * multiplier).round() as u32
    }

    fn require_target(action: &QueuedAction) -> Result<Target, RejectReason> {
        action.target.ok_or_else(|| RejectReason::InvalidTarget {
            detail: "a target is required".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{
        FIREBALL, HOLY_BOLT, MASS_MEND, SCORCH, SHIELD_BASH, SIXTH_SENSE, SLASH, SMOKE_VEIL,
        VENOM_DART,
    };
    use crate::core::config::RoomConfig;
    use crate::core::player::{Class, Race, Role};
    use crate::core::request::ActionOptions;
    use crate::queue::{ActionId, ActionStatus};
    use crate::status::StatusKind;

    fn arena() -> (RoomState, Vec<PlayerId>) {
        let config = RoomConfig::default().with_corruption_chance(0.0);
        let mut state = RoomState::new(config, 5);
        state.roster.add("Anya", Race::Human, Class::Warrior); // armor 2, dm 1.0
        state.roster.add("Brin", Race::Elf, Class::Priest); // armor 0, dm 0.8
        state.roster.add("Cole", Race::Elf, Class::Pyromancer); // armor 0, dm 1.3
        state.roster.add("Dara", Race::Orc, Class::Tracker); // armor 1, dm 1.0, rage
        state.roles_assigned = true;
        let ids = state.roster.ids().collect();
        (state, ids)
    }

    fn cast(player: PlayerId, ability: crate::abilities::AbilityId, target: Option<Target>) -> QueuedAction {
        QueuedAction {
            id: ActionId::new(1),
            player,
            kind: ActionKind::UseAbility,
            ability: Some(ability),
            target,
            priority: 5,
            sequence: 0,
            status: ActionStatus::Executing,
            options: ActionOptions::default(),
        }
    }

    #[test]
    fn test_slash_applies_modifier_then_armor() {
        let (mut state, ids) = arena();
        let mut log = RoundLog::new();

        // Anya -> Brin: 25 * 1.0 into no armor = 25
        let action = cast(ids[0], SLASH, Some(Target::Player(ids[1])));
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();
        assert_eq!(state.roster.get(ids[1]).unwrap().health, 90 - 25);

        // Brin -> Anya: 25 * 0.8 = 20 raw, armor 2 takes 20% off = 16
        let action = cast(ids[1], SLASH, Some(Target::Player(ids[0])));
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();
        assert_eq!(state.roster.get(ids[0]).unwrap().health, 120 - 16);
    }

    #[test]
    fn test_scorch_scales_with_modifier_and_coordination() {
        let (mut state, ids) = arena();
        let mut log = RoundLog::new();
        // 30 * 1.3 * 1.25 = 48.75 -> 49, Brin has no armor
        let action = QueuedAction {
            options: ActionOptions::coordinated(),
            ..cast(ids[2], SCORCH, Some(Target::Player(ids[1])))
        };
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();
        assert_eq!(state.roster.get(ids[1]).unwrap().health, 90 - 49);
    }

    #[test]
    fn test_blood_rage_doubles_once() {
        let (mut state, ids) = arena();
        let mut log = RoundLog::new();
        // Dara (orc) slash: 25 * 1.0 * 2.0 = 50 into Brin (no armor)
        let action = cast(ids[3], SLASH, Some(Target::Player(ids[1])));
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();
        assert_eq!(state.roster.get(ids[1]).unwrap().health, 90 - 50);
        assert!(state.roster.get(ids[3]).unwrap().one_shot.is_none());

        // second cast is back to normal
        let action = cast(ids[3], SLASH, Some(Target::Player(ids[2])));
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();
        assert_eq!(state.roster.get(ids[2]).unwrap().health, 80 - 25);
    }

    #[test]
    fn test_shield_bash_stuns_and_starts_cooldown() {
        let (mut state, ids) = arena();
        let mut log = RoundLog::new();
        let action = cast(ids[0], SHIELD_BASH, Some(Target::Player(ids[1])));
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();

        assert!(state.roster.get(ids[1]).unwrap().is_stunned());
        assert_eq!(state.roster.get(ids[0]).unwrap().cooldown_remaining(SHIELD_BASH), 2);
    }

    #[test]
    fn test_defend_raises_guard() {
        let (mut state, ids) = arena();
        let mut log = RoundLog::new();
        let action = QueuedAction {
            kind: ActionKind::Defend,
            ability: None,
            ..cast(ids[0], SLASH, None)
        };
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();

        // warrior armor 2 + defend bonus 3
        assert_eq!(state.roster.get(ids[0]).unwrap().effective_armor(), 5);
        assert!(log.render_all()[0].contains("raises their guard"));
    }

    #[test]
    fn test_venom_dart_poisons() {
        let (mut state, ids) = arena();
        let mut log = RoundLog::new();
        let action = cast(ids[3], VENOM_DART, Some(Target::Player(ids[2])));
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();
        assert!(state.roster.get(ids[2]).unwrap().has_status(StatusKind::Poisoned));
    }

    #[test]
    fn test_smoke_veil_hides_the_caster() {
        let (mut state, ids) = arena();
        let mut log = RoundLog::new();
        let action = cast(ids[3], SMOKE_VEIL, None);
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();
        assert!(!state.roster.get(ids[3]).unwrap().is_visible());
    }

    #[test]
    fn test_sixth_sense_reports_secretly() {
        let (mut state, ids) = arena();
        state.roster.get_mut(ids[1]).unwrap().set_role(Role::Warlock);
        let mut log = RoundLog::new();

        // Oracle loadout is irrelevant here; the resolver trusts validation.
        let action = cast(ids[0], SIXTH_SENSE, Some(Target::Player(ids[1])));
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();

        assert_eq!(
            log.entries()[0],
            LogEntry::RoleSensed { seer: "Anya".into(), target: "Brin".into(), warlock: true }
        );
        assert!(log.render_public().is_empty(), "detection stays off the shared feed");
    }

    #[test]
    fn test_fireball_spares_the_caster() {
        let (mut state, ids) = arena();
        let mut log = RoundLog::new();
        let before: Vec<u32> = ids
            .iter()
            .map(|&id| state.roster.get(id).unwrap().health)
            .collect();

        let action = cast(ids[2], FIREBALL, None);
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();

        // 18 * 1.3 = 23.4 -> 23 raw; Anya armor 2 -> 18, Brin 0 -> 23, Dara 1 -> 21
        assert_eq!(state.roster.get(ids[0]).unwrap().health, before[0] - 18);
        assert_eq!(state.roster.get(ids[1]).unwrap().health, before[1] - 23);
        assert_eq!(state.roster.get(ids[2]).unwrap().health, before[2], "caster untouched");
        assert_eq!(state.roster.get(ids[3]).unwrap().health, before[3] - 21);
    }

    #[test]
    fn test_mass_mend_heals_everyone_but_warlocks() {
        let (mut state, ids) = arena();
        state.roster.get_mut(ids[3]).unwrap().set_role(Role::Warlock);
        for &id in &ids {
            state.roster.get_mut(id).unwrap().health = 40;
        }
        let mut log = RoundLog::new();

        // Brin's heal modifier: 2.0 - 0.8 = 1.2; 15 * 1.2 = 18
        let action = cast(ids[1], MASS_MEND, None);
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();

        assert_eq!(state.roster.get(ids[0]).unwrap().health, 58);
        assert_eq!(state.roster.get(ids[1]).unwrap().health, 58, "caster heals too");
        assert_eq!(state.roster.get(ids[2]).unwrap().health, 58);
        assert_eq!(state.roster.get(ids[3]).unwrap().health, 40, "dark pacts resist mending");
    }

    #[test]
    fn test_holy_bolt_reveals_the_target() {
        let (mut state, ids) = arena();
        state.roster.get_mut(ids[1]).unwrap().set_role(Role::Warlock);
        let mut log = RoundLog::new();

        let action = cast(ids[0], HOLY_BOLT, Some(Target::Player(ids[1])));
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();

        assert!(log
            .entries()
            .iter()
            .any(|e| matches!(e, LogEntry::RoleSensed { warlock: true, .. })));
    }

    #[test]
    fn test_strike_redirects_off_hidden_target() {
        let (mut state, ids) = arena();
        let mut log = RoundLog::new();
        StatusScheduler::apply_effect(
            &mut state,
            ids[1],
            StatusEffect::invisible(1),
            &mut log,
        );

        let action = cast(ids[0], SLASH, Some(Target::Player(ids[1])));
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();

        assert_eq!(state.roster.get(ids[1]).unwrap().health, 90, "hidden target untouched");
        let struck_someone_else = state.roster.get(ids[2]).unwrap().health < 80
            || state.roster.get(ids[3]).unwrap().health < 110;
        assert!(struck_someone_else);
    }

    #[test]
    fn test_strike_on_downed_monster_whiffs() {
        let (mut state, ids) = arena();
        state.monster.health = 0;
        let mut log = RoundLog::new();

        let action = cast(ids[0], SLASH, Some(Target::Monster));
        AbilityResolver::resolve(&action, &mut state, &mut log).unwrap();
        assert!(log.render_all()[0].contains("already down"));
    }
}

//! Scored rule validation.
//!
//! Every check the engine performs on a submitted action, on overall
//! room health, on readiness to start, or on a phase transition runs
//! through [`validate`], which evaluates an ordered list of named rules
//! and returns a [`ValidationResult`] carrying per-rule verdicts and a
//! 0-100 score. Callers can restrict the run to a rule subset and can
//! opt into strict mode, where warnings block acceptance too.

mod result;

pub use result::{RuleId, RuleOutcome, RuleStatus, ValidationResult};

use crate::abilities::{AbilityId, TargetRule};
use crate::core::phase::Phase;
use crate::core::player::PlayerId;
use crate::core::request::{ActionKind, Target};
use crate::core::state::RoomState;
use crate::queue::{ActionStatus, QueuedAction};

/// What to validate.
#[derive(Debug, Clone, Copy)]
pub enum ValidationRequest<'a> {
    /// A player's submitted (or hypothetical) action.
    Submission {
        player: PlayerId,
        kind: ActionKind,
        ability: Option<AbilityId>,
        target: Option<Target>,
        /// Actions already queued this round, for duplicate detection.
        pending: &'a [QueuedAction],
    },
    /// Structural health of the room as a whole.
    GameState,
    /// Whether the room can move into (or start) play.
    StartReadiness,
    /// A specific phase transition.
    Transition { from: Phase, to: Phase },
}

/// Tuning knobs for a validation run.
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Restrict the run to these rules; `None` runs every applicable rule.
    pub rules: Option<Vec<RuleId>>,
    /// Treat warnings as disqualifying.
    pub strict: bool,
}

impl ValidationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = RuleId>) -> Self {
        self.rules = Some(rules.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn should_run(&self, rule: RuleId) -> bool {
        self.rules.as_ref().is_none_or(|list| list.contains(&rule))
    }
}

/// Run a validation request against the current room state.
#[must_use]
pub fn validate(
    state: &RoomState,
    request: ValidationRequest<'_>,
    options: &ValidationOptions,
) -> ValidationResult {
    let mut result = ValidationResult::new();
    match request {
        ValidationRequest::Submission { player, kind, ability, target, pending } => {
            validate_submission(state, player, kind, ability, target, pending, options, &mut result);
        }
        ValidationRequest::GameState => validate_game_state(state, options, &mut result),
        ValidationRequest::StartReadiness => validate_start_readiness(state, options, &mut result),
        ValidationRequest::Transition { from, to } => {
            validate_transition(state, from, to, options, &mut result);
        }
    }
    result
}

#[allow(clippy::too_many_arguments)]
fn validate_submission(
    state: &RoomState,
    player: PlayerId,
    kind: ActionKind,
    ability: Option<AbilityId>,
    target: Option<Target>,
    pending: &[QueuedAction],
    options: &ValidationOptions,
    result: &mut ValidationResult,
) {
    if options.should_run(RuleId::ActorExists) {
        if !state.roster.contains(player) {
            result.fail(RuleId::ActorExists, format!("no player {player} in this room"));
            return; // nothing below can be evaluated
        }
        result.pass(RuleId::ActorExists);
    }
    let Some(actor) = state.roster.get(player) else {
        return;
    };

    if options.should_run(RuleId::ActorAlive) {
        if actor.alive {
            result.pass(RuleId::ActorAlive);
        } else {
            result.fail(RuleId::ActorAlive, format!("{} is dead", actor.name));
        }
    }

    if options.should_run(RuleId::ActorNotStunned) {
        if actor.is_stunned() {
            result.fail(RuleId::ActorNotStunned, format!("{} is stunned", actor.name));
        } else {
            result.pass(RuleId::ActorNotStunned);
        }
    }

    // Ready and validate requests execute outside the round loop, so the
    // queue-facing rules below only apply to round actions.
    if !kind.is_immediate() {
        if options.should_run(RuleId::PhaseIsAction) {
            if matches!(state.phase, Phase::Action | Phase::Resolution) {
                result.pass(RuleId::PhaseIsAction);
            } else {
                result.fail(
                    RuleId::PhaseIsAction,
                    format!("actions are not accepted during {}", state.phase),
                );
            }
        }

        if options.should_run(RuleId::NoDuplicatePending) {
            let duplicate = pending
                .iter()
                .any(|a| a.player == player && a.status == ActionStatus::Pending);
            if duplicate {
                result.fail(
                    RuleId::NoDuplicatePending,
                    format!("{} already has an action queued", actor.name),
                );
            } else {
                result.pass(RuleId::NoDuplicatePending);
            }
        }
    }

    if kind == ActionKind::UseAbility {
        if options.should_run(RuleId::AbilityKnown) {
            match ability {
                None => result.fail(RuleId::AbilityKnown, "no ability named"),
                Some(id) if !state.abilities.contains(id) => {
                    result.fail(RuleId::AbilityKnown, format!("{id} does not exist"));
                }
                Some(id) if !actor.knows(id) => {
                    result.fail(
                        RuleId::AbilityKnown,
                        format!("{} has not unlocked {id}", actor.name),
                    );
                }
                Some(_) => result.pass(RuleId::AbilityKnown),
            }
        }

        if options.should_run(RuleId::AbilityReady) {
            if let Some(id) = ability {
                let remaining = actor.cooldown_remaining(id);
                if remaining > 0 {
                    result.fail(
                        RuleId::AbilityReady,
                        format!("{id} is on cooldown for {remaining} more rounds"),
                    );
                } else {
                    result.pass(RuleId::AbilityReady);
                }
            }
        }

        if options.should_run(RuleId::TargetLegal) {
            if let Some(def) = ability.and_then(|id| state.abilities.get(id)) {
                match check_target(state, player, def.targeting, target) {
                    Ok(_) => result.pass(RuleId::TargetLegal),
                    Err(detail) => result.fail(RuleId::TargetLegal, detail),
                }
            }
        }
    }
}

fn validate_game_state(state: &RoomState, options: &ValidationOptions, result: &mut ValidationResult) {
    let joined = state.roster.len();

    if options.should_run(RuleId::MinPlayers) {
        if joined >= state.config.min_players {
            result.pass(RuleId::MinPlayers);
        } else {
            result.fail(
                RuleId::MinPlayers,
                format!("{joined} players joined, minimum is {}", state.config.min_players),
            );
        }
    }

    if options.should_run(RuleId::MaxPlayers) {
        if joined > state.config.max_players {
            result.fail(
                RuleId::MaxPlayers,
                format!("{joined} players exceed the cap of {}", state.config.max_players),
            );
        } else if joined == state.config.max_players {
            result.warn(RuleId::MaxPlayers, "room is at capacity");
        } else {
            result.pass(RuleId::MaxPlayers);
        }
    }

    if options.should_run(RuleId::AlivePlayersExist) {
        if state.roster.alive_count() > 0 {
            result.pass(RuleId::AlivePlayersExist);
        } else {
            result.fail(RuleId::AlivePlayersExist, "no players are alive");
        }
    }

    if options.should_run(RuleId::MonsterHealthBounds) {
        if state.monster.health <= state.monster.max_health {
            result.pass(RuleId::MonsterHealthBounds);
        } else {
            result.fail(
                RuleId::MonsterHealthBounds,
                format!(
                    "monster health {} exceeds maximum {}",
                    state.monster.health, state.monster.max_health
                ),
            );
        }
    }

    if options.should_run(RuleId::PhaseValid) {
        let round_ok = match state.phase {
            Phase::Waiting | Phase::Preparation => state.round == 0,
            Phase::Action | Phase::Resolution => state.round >= 1,
            Phase::Ended => true,
        };
        if round_ok {
            result.pass(RuleId::PhaseValid);
        } else {
            result.fail(
                RuleId::PhaseValid,
                format!("round counter {} is impossible during {}", state.round, state.phase),
            );
        }
    }

    if options.should_run(RuleId::CountersNonNegative) {
        if state.level < 1 {
            result.fail(RuleId::CountersNonNegative, "monster level fell below 1");
        } else if state.warlock_count as usize > joined {
            result.fail(
                RuleId::CountersNonNegative,
                format!("{} warlocks tallied among {joined} players", state.warlock_count),
            );
        } else {
            result.pass(RuleId::CountersNonNegative);
        }
    }
}

fn validate_start_readiness(
    state: &RoomState,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) {
    if options.should_run(RuleId::MinPlayers) {
        let joined = state.roster.len();
        if joined >= state.config.min_players {
            result.pass(RuleId::MinPlayers);
        } else {
            result.fail(
                RuleId::MinPlayers,
                format!("{joined} players joined, minimum is {}", state.config.min_players),
            );
        }
    }

    if options.should_run(RuleId::LoadoutsValid) {
        match state.roster.iter().find(|p| !p.race.allows(p.class)) {
            Some(p) => result.fail(
                RuleId::LoadoutsValid,
                format!("{:?} cannot play {:?} ({})", p.race, p.class, p.name),
            ),
            None => result.pass(RuleId::LoadoutsValid),
        }
    }

    // Roles and ready flags only exist once the preparation phase has
    // begun; checking them earlier would always fail.
    if state.phase == Phase::Preparation {
        if options.should_run(RuleId::RolesAssigned) {
            if state.roles_assigned {
                result.pass(RuleId::RolesAssigned);
            } else {
                result.fail(RuleId::RolesAssigned, "roles have not been dealt");
            }
        }

        if options.should_run(RuleId::AllReady) {
            let ready = state.roster.iter().filter(|p| p.ready).count();
            let total = state.roster.len();
            if ready == total {
                result.pass(RuleId::AllReady);
            } else {
                result.fail(RuleId::AllReady, format!("{ready} of {total} players ready"));
            }
        }
    }
}

fn validate_transition(
    state: &RoomState,
    from: Phase,
    to: Phase,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) {
    if options.should_run(RuleId::TransitionLegal) {
        if from != state.phase {
            result.fail(
                RuleId::TransitionLegal,
                format!("room is in {}, not {from}", state.phase),
            );
        } else if from.can_transition_to(to) {
            result.pass(RuleId::TransitionLegal);
        } else {
            result.fail(RuleId::TransitionLegal, format!("{from} cannot move to {to}"));
        }
    }

    if options.should_run(RuleId::WinConsistent) {
        let outcome = state.win_outcome();
        let verdict = match (to, outcome) {
            (Phase::Ended, None) => Err("no side has won yet".to_string()),
            (Phase::Action, Some(o)) if from == Phase::Resolution => {
                Err(format!("the game is decided: {o}"))
            }
            _ => Ok(()),
        };
        match verdict {
            Ok(()) => result.pass(RuleId::WinConsistent),
            Err(detail) => result.fail(RuleId::WinConsistent, detail),
        }
    }
}

/// Resolve a raw target against an ability's targeting rule.
///
/// Returns the normalized target (self-only abilities land on the actor
/// even when no target was named). Visibility is deliberately not
/// checked here; hidden targets are redirected at execution time.
pub(crate) fn check_target(
    state: &RoomState,
    actor: PlayerId,
    targeting: TargetRule,
    target: Option<Target>,
) -> Result<Option<Target>, String> {
    match targeting {
        TargetRule::None => Ok(None),
        TargetRule::SelfOnly => match target {
            None => Ok(Some(Target::Player(actor))),
            Some(Target::Player(id)) if id == actor => Ok(Some(Target::Player(actor))),
            Some(_) => Err("this ability can only target yourself".to_string()),
        },
        TargetRule::AnyPlayer => {
            let id = require_player_target(target)?;
            ensure_living_player(state, id)?;
            Ok(Some(Target::Player(id)))
        }
        TargetRule::OtherPlayer => {
            let id = require_player_target(target)?;
            if id == actor {
                return Err("this ability cannot target yourself".to_string());
            }
            ensure_living_player(state, id)?;
            Ok(Some(Target::Player(id)))
        }
        TargetRule::PlayerOrMonster => match target {
            None => Err("a target is required".to_string()),
            Some(Target::Monster) => Ok(Some(Target::Monster)),
            Some(Target::Player(id)) => {
                ensure_living_player(state, id)?;
                Ok(Some(Target::Player(id)))
            }
        },
    }
}

fn require_player_target(target: Option<Target>) -> Result<PlayerId, String> {
    match target {
        None => Err("a target is required".to_string()),
        Some(Target::Monster) => Err("this ability targets players".to_string()),
        Some(Target::Player(id)) => Ok(id),
    }
}

fn ensure_living_player(state: &RoomState, id: PlayerId) -> Result<(), String> {
    match state.roster.get(id) {
        None => Err(format!("no player {id} in this room")),
        Some(p) if !p.alive => Err(format!("{} is dead", p.name)),
        Some(_) => Ok(()),
    }
}

//! The game room: lifecycle, submissions, and the round pipeline.
//!
//! A [`GameRoom`] owns the state, the action queue, and the event
//! buffer. Transports drive it with five calls: `add_player`, `start`,
//! `submit_action`, `resolve_round`, and `drain_events`. Everything a
//! client may see comes out through the view structs, which never carry
//! hidden roles.

use serde::Serialize;
use tracing::info;

use crate::combat::CombatResolver;
use crate::core::config::RoomConfig;
use crate::core::log::RoundLog;
use crate::core::phase::Phase;
use crate::core::player::{Class, PlayerId, Race, Role};
use crate::core::request::{ActionKind, ActionRequest};
use crate::core::state::{GameOutcome, RoomState};
use crate::error::{RejectReason, RoomError, SubmitError};
use crate::events::{EngineEvent, EventBuffer, EventSink};
use crate::monster::{MonsterController, MonsterView};
use crate::queue::{ActionId, ActionQueue, QueueStats};
use crate::status::{StatusEffect, StatusKind, StatusScheduler};
use crate::validation::{validate, ValidationOptions, ValidationRequest, ValidationResult};

/// Everything that happened in one resolved round, ready to broadcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSummary {
    pub round: u32,
    pub level: u32,
    /// Phase after resolution: `Action` for the next round, or `Ended`.
    pub phase: Phase,
    pub processed: usize,
    pub rejected: usize,
    /// Public log lines, in resolution order.
    pub log: Vec<String>,
    pub outcome: Option<GameOutcome>,
}

/// Client-safe snapshot of one player. Carries no role.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub race: Race,
    pub class: Class,
    pub health: u32,
    pub max_health: u32,
    /// Armor including status bonuses.
    pub armor: i32,
    pub alive: bool,
    pub ready: bool,
    pub visible: bool,
    pub stunned: bool,
    pub statuses: Vec<StatusEffect>,
}

/// Client-safe snapshot of the whole room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    pub phase: Phase,
    pub round: u32,
    pub level: u32,
    pub players: Vec<PlayerView>,
    pub monster: MonsterView,
    pub pending_actions: usize,
}

/// One line of the end-of-game reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleReveal {
    pub player: PlayerId,
    pub name: String,
    pub role: Role,
}

/// A running game room.
pub struct GameRoom {
    state: RoomState,
    queue: ActionQueue,
    events: EventBuffer,
    last_log: RoundLog,
}

impl GameRoom {
    /// Create a lobby-phase room with a fixed seed.
    #[must_use]
    pub fn new(config: RoomConfig, seed: u64) -> Self {
        let queue = ActionQueue::new(&config);
        Self {
            state: RoomState::new(config, seed),
            queue,
            events: EventBuffer::new(),
            last_log: RoundLog::new(),
        }
    }

    /// Add a player to the lobby.
    pub fn add_player(
        &mut self,
        name: impl Into<String>,
        race: Race,
        class: Class,
    ) -> Result<PlayerId, RoomError> {
        let name = name.into();
        if self.state.phase != Phase::Waiting {
            return Err(RoomError::NotAcceptingPlayers { phase: self.state.phase });
        }
        if self.state.roster.len() >= self.state.config.max_players {
            return Err(RoomError::RoomFull { capacity: self.state.config.max_players });
        }
        if self.state.roster.name_taken(&name) {
            return Err(RoomError::NameTaken { name });
        }
        let id = self.state.roster.add(name, race, class);
        info!(player = %id, joined = self.state.roster.len(), "player joined");
        Ok(id)
    }

    /// Deal roles and open the preparation phase.
    pub fn start(&mut self) -> Result<(), RoomError> {
        if self.state.phase != Phase::Waiting {
            return Err(RoomError::TransitionBlocked {
                from: self.state.phase,
                to: Phase::Preparation,
            });
        }
        let readiness = validate(
            &self.state,
            ValidationRequest::StartReadiness,
            &ValidationOptions::new(),
        );
        if let Some(failure) = readiness.first_failure() {
            return Err(RoomError::NotReadyToStart {
                detail: failure.detail.clone().unwrap_or_else(|| failure.rule.to_string()),
            });
        }

        self.state.assign_roles();
        self.state.phase = Phase::Preparation;
        info!(
            players = self.state.roster.len(),
            warlocks = self.state.warlock_count,
            "game starting"
        );
        Ok(())
    }

    /// Submit a player request for the current phase.
    ///
    /// Ability and defend requests are accepted only during the action
    /// phase; ready only during preparation; validate any time before
    /// the game ends. When the last player readies up, the room moves
    /// into round one on its own.
    pub fn submit_action(
        &mut self,
        player: PlayerId,
        request: ActionRequest,
    ) -> Result<ActionId, SubmitError> {
        let phase = self.state.phase;
        let allowed = match request.kind {
            ActionKind::UseAbility | ActionKind::Defend => phase == Phase::Action,
            ActionKind::Ready => phase == Phase::Preparation,
            ActionKind::Validate => phase != Phase::Ended,
        };
        if !allowed {
            return Err(SubmitError::Rejected { reason: RejectReason::WrongPhase { phase } });
        }

        let was_ready = request.kind == ActionKind::Ready;
        let id = self.queue.submit(&mut self.state, player, request, &mut self.events)?;

        if was_ready && self.state.phase == Phase::Preparation {
            let readiness = validate(
                &self.state,
                ValidationRequest::StartReadiness,
                &ValidationOptions::new(),
            );
            if readiness.accepted(false) {
                self.state.phase = Phase::Action;
                self.state.round = 1;
                info!("all players ready, round 1 begins");
            }
        }
        Ok(id)
    }

    /// Withdraw a pending action. Returns whether anything was cancelled.
    pub fn cancel_action(&mut self, id: ActionId) -> bool {
        self.queue.cancel(id, &mut self.events)
    }

    /// Resolve the current round end to end.
    ///
    /// The pipeline: cooldowns come off, queued actions execute in
    /// priority order, the monster strikes, statuses tick, deaths land,
    /// the monster ages or respawns, and the win condition decides
    /// whether the room re-opens for actions or ends.
    pub fn resolve_round(&mut self) -> Result<RoundSummary, RoomError> {
        match self.state.phase {
            Phase::Ended => return Err(RoomError::GameOver),
            Phase::Action => {}
            actual => {
                return Err(RoomError::NotResolvable { expected: Phase::Action, actual });
            }
        }
        if self.queue.is_processing() {
            return Err(RoomError::ResolutionInProgress);
        }

        let round = self.state.round;
        self.state.phase = Phase::Resolution;
        let mut log = RoundLog::new();

        // The action phase is over; cooldowns set in earlier rounds count
        // this round as served.
        for player in self.state.roster.iter_mut().filter(|p| p.alive) {
            player.tick_cooldowns();
        }

        let report = self
            .queue
            .process_round(&mut self.state, &mut log, &mut self.events)
            .ok_or(RoomError::ResolutionInProgress)?;

        MonsterController::attack(&mut self.state, &mut log);
        StatusScheduler::process_timed_effects(&mut self.state, &mut log);
        CombatResolver::process_pending_deaths(&mut self.state, &mut log);
        MonsterController::age_monster(&mut self.state);
        MonsterController::handle_death_and_respawn(&mut self.state, &mut log);

        let outcome = self.state.win_outcome();
        match outcome {
            Some(result) => {
                self.state.phase = Phase::Ended;
                info!(round, %result, "game over");
            }
            None => {
                self.state.phase = Phase::Action;
                self.state.round += 1;
            }
        }

        self.events.publish(EngineEvent::RoundResolved {
            round,
            processed: report.processed,
            rejected: report.rejected,
        });
        self.last_log = log;

        Ok(RoundSummary {
            round,
            level: self.state.level,
            phase: self.state.phase,
            processed: report.processed,
            rejected: report.rejected,
            log: self.last_log.render_public(),
            outcome,
        })
    }

    /// Tear the room down: cancel pending actions and end the game.
    pub fn destroy(&mut self) {
        self.queue.destroy(&mut self.events);
        self.state.phase = Phase::Ended;
    }

    /// Take all buffered events, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    /// Structural health of the room, as a scored result.
    #[must_use]
    pub fn health_check(&self) -> ValidationResult {
        validate(&self.state, ValidationRequest::GameState, &ValidationOptions::new())
    }

    /// Whether the room could start (or begin its first round) right now.
    #[must_use]
    pub fn readiness(&self) -> ValidationResult {
        validate(&self.state, ValidationRequest::StartReadiness, &ValidationOptions::new())
    }

    /// Snapshot of one player, role omitted.
    #[must_use]
    pub fn player_view(&self, id: PlayerId) -> Option<PlayerView> {
        let p = self.state.roster.get(id)?;
        Some(PlayerView {
            id: p.id,
            name: p.name.clone(),
            race: p.race,
            class: p.class,
            health: p.health,
            max_health: p.max_health,
            armor: p.effective_armor(),
            alive: p.alive,
            ready: p.ready,
            visible: p.is_visible(),
            stunned: p.is_stunned(),
            statuses: StatusKind::ALL
                .iter()
                .filter_map(|kind| p.statuses.get(kind).copied())
                .collect(),
        })
    }

    /// Snapshot of the monster.
    #[must_use]
    pub fn monster_view(&self) -> MonsterView {
        MonsterController::state(&self.state)
    }

    /// Snapshot of the whole room for broadcasting.
    #[must_use]
    pub fn view(&self) -> RoomView {
        RoomView {
            phase: self.state.phase,
            round: self.state.round,
            level: self.state.level,
            players: self
                .state
                .roster
                .ids()
                .filter_map(|id| self.player_view(id))
                .collect(),
            monster: self.monster_view(),
            pending_actions: self.queue.pending_len(),
        }
    }

    /// The full role list, available only once the game has ended.
    #[must_use]
    pub fn final_reveal(&self) -> Option<Vec<RoleReveal>> {
        if self.state.phase != Phase::Ended {
            return None;
        }
        Some(
            self.state
                .roster
                .iter()
                .map(|p| RoleReveal { player: p.id, name: p.name.clone(), role: p.role() })
                .collect(),
        )
    }

    /// Log of the most recently resolved round, secrets included.
    #[must_use]
    pub fn last_round_log(&self) -> &RoundLog {
        &self.last_log
    }

    /// Queue statistics since the room opened.
    #[must_use]
    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// The seed this room plays under.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.state.rng.seed()
    }

    /// Read access to the raw state, for diagnostics and simulations.
    #[must_use]
    pub fn state(&self) -> &RoomState {
        &self.state
    }

    /// Mutable access to the raw state. Intended for tests and scripted
    /// simulations; transports should stick to the command surface.
    pub fn state_mut(&mut self) -> &mut RoomState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{HOLY_BOLT, SCORCH, SLASH};
    use crate::core::request::Target;

    fn lobby() -> GameRoom {
        let config = RoomConfig::default().with_corruption_chance(0.0);
        GameRoom::new(config, 17)
    }

    fn seated() -> (GameRoom, Vec<PlayerId>) {
        let mut room = lobby();
        let ids = vec![
            room.add_player("Anya", Race::Human, Class::Warrior).unwrap(),
            room.add_player("Brin", Race::Elf, Class::Priest).unwrap(),
            room.add_player("Cole", Race::Elf, Class::Pyromancer).unwrap(),
            room.add_player("Dara", Race::Orc, Class::Tracker).unwrap(),
        ];
        (room, ids)
    }

    fn in_action(mut room: GameRoom, ids: &[PlayerId]) -> GameRoom {
        room.start().unwrap();
        for &id in ids {
            room.submit_action(id, ActionRequest::ready()).unwrap();
        }
        assert_eq!(room.state().phase, Phase::Action);
        assert_eq!(room.state().round, 1);
        room
    }

    #[test]
    fn test_lobby_gatekeeping() {
        let (mut room, _ids) = seated();
        assert_eq!(
            room.add_player("Anya", Race::Human, Class::Warrior),
            Err(RoomError::NameTaken { name: "Anya".into() })
        );

        room.start().unwrap();
        assert_eq!(
            room.add_player("Ezra", Race::Human, Class::Warrior),
            Err(RoomError::NotAcceptingPlayers { phase: Phase::Preparation })
        );
    }

    #[test]
    fn test_start_requires_enough_players() {
        let mut room = lobby();
        room.add_player("Anya", Race::Human, Class::Warrior).unwrap();
        let err = room.start().unwrap_err();
        assert!(matches!(err, RoomError::NotReadyToStart { .. }));
    }

    #[test]
    fn test_ready_up_opens_round_one() {
        let (room, ids) = seated();
        let room = in_action(room, &ids);
        assert!(room.state().roles_assigned);
        assert_eq!(room.state().warlock_count, 1);
    }

    #[test]
    fn test_actions_rejected_outside_action_phase() {
        let (mut room, ids) = seated();
        let err = room
            .submit_action(ids[0], ActionRequest::defend())
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::Rejected {
                reason: RejectReason::WrongPhase { phase: Phase::Waiting }
            }
        );
    }

    #[test]
    fn test_round_resolves_and_advances() {
        let (room, ids) = seated();
        let mut room = in_action(room, &ids);

        room.submit_action(ids[0], ActionRequest::ability(SLASH, Some(Target::Monster)))
            .unwrap();
        room.submit_action(ids[2], ActionRequest::ability(SCORCH, Some(Target::Monster)))
            .unwrap();

        let summary = room.resolve_round().unwrap();
        assert_eq!(summary.round, 1);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.outcome, None);
        assert_eq!(room.state().phase, Phase::Action);
        assert_eq!(room.state().round, 2);

        // Slash 25 + Scorch 30 * 1.3 = 39 -> monster at 100 - 64 = 36
        assert_eq!(room.monster_view().health, 36);
        // The monster struck back at someone.
        let total: u32 = room.state().roster.iter().map(|p| p.health).sum();
        let full: u32 = room.state().roster.iter().map(|p| p.max_health).sum();
        assert_eq!(full - total, 10, "level 1 monster hits for its base damage");
    }

    #[test]
    fn test_monster_respawns_stronger() {
        let (room, ids) = seated();
        let mut room = in_action(room, &ids);
        room.state_mut().monster.health = 5;

        room.submit_action(ids[0], ActionRequest::ability(SLASH, Some(Target::Monster)))
            .unwrap();
        let summary = room.resolve_round().unwrap();

        assert_eq!(summary.level, 2);
        let monster = room.monster_view();
        assert_eq!(monster.health, 150, "base 100 + 50 per extra level");
        assert_eq!(monster.age, 0, "age resets on respawn");
        assert!(summary.log.iter().any(|l| l.contains("fiercer Monster")));
    }

    #[test]
    fn test_cooldown_spans_exactly_its_rounds() {
        let (room, ids) = seated();
        let mut room = in_action(room, &ids);

        // Round 1: Holy Bolt (cooldown 1).
        room.submit_action(ids[1], ActionRequest::ability(HOLY_BOLT, Some(Target::Monster)))
            .unwrap();
        room.resolve_round().unwrap();

        // Round 2: still cooling down.
        let err = room
            .submit_action(ids[1], ActionRequest::ability(HOLY_BOLT, Some(Target::Monster)))
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::Rejected { reason: RejectReason::OnCooldown { remaining: 1 } }
        );
        room.resolve_round().unwrap();

        // Round 3: ready again.
        room.submit_action(ids[1], ActionRequest::ability(HOLY_BOLT, Some(Target::Monster)))
            .unwrap();
    }

    #[test]
    fn test_game_ends_when_warlocks_fall() {
        let (room, ids) = seated();
        let mut room = in_action(room, &ids);

        for player in room.state_mut().roster.iter_mut() {
            if player.is_warlock() {
                player.alive = false;
                player.health = 0;
            }
        }
        let summary = room.resolve_round().unwrap();
        assert_eq!(summary.outcome, Some(GameOutcome::InnocentsWin));
        assert_eq!(room.state().phase, Phase::Ended);

        assert_eq!(room.resolve_round(), Err(RoomError::GameOver));
        let reveal = room.final_reveal().unwrap();
        assert_eq!(reveal.len(), 4);
        assert_eq!(reveal.iter().filter(|r| r.role == Role::Warlock).count(), 1);
    }

    #[test]
    fn test_reveal_hidden_until_the_end() {
        let (room, ids) = seated();
        let room = in_action(room, &ids);
        assert!(room.final_reveal().is_none());
        let view = room.view();
        assert_eq!(view.players.len(), 4);
        // Serialized views must not mention roles.
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("warlock"));
        assert!(!json.contains("innocent"));
    }

    #[test]
    fn test_resolution_requires_action_phase() {
        let (mut room, _ids) = seated();
        assert_eq!(
            room.resolve_round(),
            Err(RoomError::NotResolvable { expected: Phase::Action, actual: Phase::Waiting })
        );
    }

    #[test]
    fn test_destroy_ends_everything() {
        let (room, ids) = seated();
        let mut room = in_action(room, &ids);
        room.submit_action(ids[0], ActionRequest::defend()).unwrap();
        room.destroy();

        assert_eq!(room.state().phase, Phase::Ended);
        assert_eq!(
            room.submit_action(ids[1], ActionRequest::defend()),
            Err(SubmitError::Rejected {
                reason: RejectReason::WrongPhase { phase: Phase::Ended }
            })
        );
        let events = room.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::ActionCancelled { .. })));
    }
}

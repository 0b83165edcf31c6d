//! Players: identity, loadout, vitals, and the room roster.
//!
//! ## Hidden roles
//!
//! Every player is dealt a [`Role`] when the game starts. The role field
//! is private: gameplay code reads it through [`Player::role`], and only
//! the corruption subsystem (via a crate-visible setter) may change it
//! after dealing. Snapshot types never include it.
//!
//! ## Two-phase death
//!
//! Reaching zero health does not kill. It stamps a [`PendingDeath`]
//! marker; the combat resolver turns markers into actual deaths once per
//! round, after all actions have resolved. Until then the player remains
//! `alive` and a legal target.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::abilities::{self, AbilityId};
use crate::status::{StatusEffect, StatusKind};

/// Unique identifier for a player within a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Hidden allegiance. Dealt at game start, changed only by corruption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Innocent,
    Warlock,
}

/// Playable races. A race contributes stat tweaks and at most one
/// single-use survival effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Orc,
    Lich,
}

impl Race {
    /// All races, for iteration in loadout validation.
    pub const ALL: [Race; 5] = [Race::Human, Race::Elf, Race::Dwarf, Race::Orc, Race::Lich];

    /// The one-shot effect this race starts with, if any.
    #[must_use]
    pub fn one_shot(self) -> Option<OneShotEffect> {
        match self {
            Race::Dwarf => Some(OneShotEffect::DamageImmunity),
            Race::Orc => Some(OneShotEffect::BloodRage { multiplier: 2.0 }),
            Race::Lich => Some(OneShotEffect::Resurrection { restore_to: 5 }),
            Race::Human | Race::Elf => None,
        }
    }

    /// Whether this race may take the given class.
    ///
    /// Liches cannot channel the Priest's rites; Orcs lack the Oracle's
    /// patience. Everything else is open.
    #[must_use]
    pub fn allows(self, class: Class) -> bool {
        !matches!(
            (self, class),
            (Race::Lich, Class::Priest) | (Race::Orc, Class::Oracle)
        )
    }

    fn health_bonus(self) -> i32 {
        match self {
            Race::Orc => 10,
            Race::Lich => -10,
            Race::Human | Race::Elf | Race::Dwarf => 0,
        }
    }

    fn armor_bonus(self) -> i32 {
        match self {
            Race::Dwarf => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Race::Human => "Human",
            Race::Elf => "Elf",
            Race::Dwarf => "Dwarf",
            Race::Orc => "Orc",
            Race::Lich => "Lich",
        };
        write!(f, "{name}")
    }
}

/// Playable classes. A class fixes base vitals and the unlocked ability set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Class {
    Warrior,
    Priest,
    Pyromancer,
    Tracker,
    Oracle,
}

impl Class {
    /// All classes, for iteration in loadout validation.
    pub const ALL: [Class; 5] = [
        Class::Warrior,
        Class::Priest,
        Class::Pyromancer,
        Class::Tracker,
        Class::Oracle,
    ];

    /// Abilities unlocked at creation.
    #[must_use]
    pub fn abilities(self) -> &'static [AbilityId] {
        match self {
            Class::Warrior => &[abilities::SLASH, abilities::SHIELD_BASH, abilities::BARKSKIN],
            Class::Priest => &[abilities::MEND, abilities::MASS_MEND, abilities::HOLY_BOLT],
            Class::Pyromancer => &[abilities::SCORCH, abilities::FIREBALL],
            Class::Tracker => &[abilities::SLASH, abilities::VENOM_DART, abilities::SMOKE_VEIL],
            Class::Oracle => &[abilities::SIXTH_SENSE, abilities::MEND, abilities::BARKSKIN],
        }
    }

    fn base_health(self) -> u32 {
        match self {
            Class::Warrior => 120,
            Class::Priest => 90,
            Class::Pyromancer => 80,
            Class::Tracker => 100,
            Class::Oracle => 90,
        }
    }

    fn base_armor(self) -> i32 {
        match self {
            Class::Warrior => 2,
            Class::Tracker => 1,
            Class::Priest | Class::Pyromancer | Class::Oracle => 0,
        }
    }

    fn base_damage_modifier(self) -> f64 {
        match self {
            Class::Warrior => 1.0,
            Class::Priest => 0.8,
            Class::Pyromancer => 1.3,
            Class::Tracker => 1.0,
            Class::Oracle => 0.9,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Class::Warrior => "Warrior",
            Class::Priest => "Priest",
            Class::Pyromancer => "Pyromancer",
            Class::Tracker => "Tracker",
            Class::Oracle => "Oracle",
        };
        write!(f, "{name}")
    }
}

/// Single-use racial effect. Consumed the first time it fires.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneShotEffect {
    /// Negates one instance of incoming damage entirely.
    DamageImmunity,
    /// Cancels the first pending death, restoring this much health.
    Resurrection { restore_to: u32 },
    /// Scales the next outgoing strike.
    BloodRage { multiplier: f64 },
}

impl OneShotEffect {
    /// Display name used in combat logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            OneShotEffect::DamageImmunity => "Stone Resolve",
            OneShotEffect::Resurrection { .. } => "Undying",
            OneShotEffect::BloodRage { .. } => "Blood Rage",
        }
    }
}

/// How a pending death was inflicted. Decides the log line wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Strike,
    Poison,
}

/// Marker stamped when health reaches zero mid-round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDeath {
    /// Display name of whatever dealt the killing blow.
    pub killer: String,
    pub cause: DeathCause,
}

/// One player's full server-side state.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub race: Race,
    pub class: Class,
    pub health: u32,
    pub max_health: u32,
    /// Base armor points. Status bonuses stack on top, see
    /// [`Player::effective_armor`].
    pub armor: i32,
    /// Scales outgoing damage. Healing scales by `2.0 - damage_modifier`.
    pub damage_modifier: f64,
    pub alive: bool,
    pub ready: bool,
    role: Role,
    pub statuses: FxHashMap<StatusKind, StatusEffect>,
    /// Ability loadout. At most three per class, so kept inline.
    pub unlocked: SmallVec<[AbilityId; 4]>,
    pub cooldowns: FxHashMap<AbilityId, u32>,
    pub pending_death: Option<PendingDeath>,
    pub one_shot: Option<OneShotEffect>,
}

impl Player {
    /// Create a player from a loadout. Vitals come from the class with
    /// racial tweaks applied; everyone starts as an Innocent until roles
    /// are dealt.
    pub fn new(id: PlayerId, name: impl Into<String>, race: Race, class: Class) -> Self {
        let health = class.base_health().saturating_add_signed(race.health_bonus());
        Self {
            id,
            name: name.into(),
            race,
            class,
            health,
            max_health: health,
            armor: class.base_armor() + race.armor_bonus(),
            damage_modifier: class.base_damage_modifier(),
            alive: true,
            ready: false,
            role: Role::Innocent,
            statuses: FxHashMap::default(),
            unlocked: class.abilities().iter().copied().collect(),
            cooldowns: FxHashMap::default(),
            pending_death: None,
            one_shot: race.one_shot(),
        }
    }

    /// This player's hidden role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether this player is a Warlock.
    #[must_use]
    pub fn is_warlock(&self) -> bool {
        self.role == Role::Warlock
    }

    pub(crate) fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Healing output modifier, the mirror of the damage modifier.
    /// Floored at zero so heavy hitters heal for nothing, never negative.
    #[must_use]
    pub fn heal_modifier(&self) -> f64 {
        (2.0 - self.damage_modifier).max(0.0)
    }

    /// Base armor plus every active status bonus.
    #[must_use]
    pub fn effective_armor(&self) -> i32 {
        self.armor + self.statuses.values().map(|s| s.armor_bonus).sum::<i32>()
    }

    /// Health missing from the maximum; the cap on incoming heals.
    #[must_use]
    pub fn missing_health(&self) -> u32 {
        self.max_health.saturating_sub(self.health)
    }

    /// Whether the monster and single-target strikes can see this player.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.statuses.contains_key(&StatusKind::Invisible)
    }

    /// Whether new action submissions from this player are rejected.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.statuses.contains_key(&StatusKind::Stunned)
    }

    /// Whether the player has an active status of the given kind.
    #[must_use]
    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.statuses.contains_key(&kind)
    }

    /// Whether the player has unlocked the given ability.
    #[must_use]
    pub fn knows(&self, ability: AbilityId) -> bool {
        self.unlocked.contains(&ability)
    }

    /// Rounds left before the ability can be used again. Zero means ready.
    #[must_use]
    pub fn cooldown_remaining(&self, ability: AbilityId) -> u32 {
        self.cooldowns.get(&ability).copied().unwrap_or(0)
    }

    pub(crate) fn trigger_cooldown(&mut self, ability: AbilityId, rounds: u32) {
        if rounds > 0 {
            self.cooldowns.insert(ability, rounds);
        }
    }

    /// Count down every cooldown by one round, dropping finished entries.
    pub(crate) fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
    }

    /// Consume the damage-immunity one-shot if it is still held.
    /// Returns its display label for logging.
    pub(crate) fn try_consume_immunity(&mut self) -> Option<&'static str> {
        match self.one_shot {
            Some(OneShotEffect::DamageImmunity) => {
                let label = OneShotEffect::DamageImmunity.label();
                self.one_shot = None;
                Some(label)
            }
            _ => None,
        }
    }

    /// Consume the resurrection one-shot if it is still held.
    /// Returns the health value to restore to.
    pub(crate) fn try_consume_resurrection(&mut self) -> Option<u32> {
        match self.one_shot {
            Some(OneShotEffect::Resurrection { restore_to }) => {
                self.one_shot = None;
                Some(restore_to)
            }
            _ => None,
        }
    }

    /// Consume the blood-rage one-shot if it is still held.
    /// Returns the outgoing-damage multiplier.
    pub(crate) fn try_consume_blood_rage(&mut self) -> Option<f64> {
        match self.one_shot {
            Some(OneShotEffect::BloodRage { multiplier }) => {
                self.one_shot = None;
                Some(multiplier)
            }
            _ => None,
        }
    }
}

/// All players in a room, indexed by [`PlayerId`].
///
/// IDs are dense indices assigned at join time; a player is never removed
/// from the roster, only marked dead.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player and return the assigned ID.
    pub fn add(&mut self, name: impl Into<String>, race: Race, class: Class) -> PlayerId {
        let id = PlayerId::new(self.players.len() as u8);
        self.players.push(Player::new(id, name, race, class));
        id
    }

    /// Look up a player by ID.
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.raw() as usize)
    }

    /// Look up a player mutably by ID.
    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.raw() as usize)
    }

    /// Whether the ID belongs to this roster.
    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        (id.raw() as usize) < self.players.len()
    }

    /// Whether a display name is already in use.
    #[must_use]
    pub fn name_taken(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    /// Number of players ever added.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// All player IDs, in join order.
    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        (0..self.players.len()).map(|i| PlayerId::new(i as u8))
    }

    /// Iterate all players in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Iterate all players mutably in join order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    /// Iterate living players in join order.
    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    /// Number of living players.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    /// Number of living Warlocks.
    #[must_use]
    pub fn alive_warlocks(&self) -> usize {
        self.players.iter().filter(|p| p.alive && p.is_warlock()).count()
    }

    /// Display name for an ID, falling back to the ID itself for
    /// out-of-roster values.
    #[must_use]
    pub fn display_name(&self, id: PlayerId) -> String {
        self.get(id).map_or_else(|| id.to_string(), |p| p.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id() {
        let id = PlayerId::new(3);
        assert_eq!(id.raw(), 3);
        assert_eq!(format!("{id}"), "Player 3");
    }

    #[test]
    fn test_loadout_stats() {
        let p = Player::new(PlayerId::new(0), "Kara", Race::Dwarf, Class::Warrior);
        assert_eq!(p.max_health, 120);
        assert_eq!(p.armor, 3); // class 2 + dwarf 1
        assert!(p.knows(abilities::SLASH));
        assert!(!p.knows(abilities::FIREBALL));
        assert_eq!(p.one_shot, Some(OneShotEffect::DamageImmunity));
    }

    #[test]
    fn test_race_class_compatibility() {
        assert!(!Race::Lich.allows(Class::Priest));
        assert!(!Race::Orc.allows(Class::Oracle));
        assert!(Race::Human.allows(Class::Priest));
        assert!(Race::Lich.allows(Class::Pyromancer));
    }

    #[test]
    fn test_heal_modifier_mirrors_damage_modifier() {
        let mut p = Player::new(PlayerId::new(0), "Vex", Race::Human, Class::Priest);
        assert!((p.heal_modifier() - 1.2).abs() < 1e-9);

        p.damage_modifier = 2.5;
        assert_eq!(p.heal_modifier(), 0.0); // floored, never negative
    }

    #[test]
    fn test_effective_armor_includes_status_bonus() {
        let mut p = Player::new(PlayerId::new(0), "Bron", Race::Human, Class::Warrior);
        assert_eq!(p.effective_armor(), 2);
        p.statuses
            .insert(StatusKind::Shielded, StatusEffect::shield(3, 1));
        assert_eq!(p.effective_armor(), 5);
    }

    #[test]
    fn test_one_shot_consumed_once() {
        let mut p = Player::new(PlayerId::new(0), "Morri", Race::Lich, Class::Oracle);
        assert_eq!(p.try_consume_immunity(), None); // holds resurrection, not immunity
        assert_eq!(p.try_consume_resurrection(), Some(5));
        assert_eq!(p.try_consume_resurrection(), None);
    }

    #[test]
    fn test_cooldown_tick() {
        let mut p = Player::new(PlayerId::new(0), "Kara", Race::Human, Class::Warrior);
        p.trigger_cooldown(abilities::SHIELD_BASH, 2);
        assert_eq!(p.cooldown_remaining(abilities::SHIELD_BASH), 2);
        p.tick_cooldowns();
        assert_eq!(p.cooldown_remaining(abilities::SHIELD_BASH), 1);
        p.tick_cooldowns();
        assert_eq!(p.cooldown_remaining(abilities::SHIELD_BASH), 0);
        assert!(p.cooldowns.is_empty());
    }

    #[test]
    fn test_roster_ids_are_dense() {
        let mut roster = Roster::new();
        let a = roster.add("Kara", Race::Human, Class::Warrior);
        let b = roster.add("Vex", Race::Elf, Class::Priest);
        assert_eq!(a.raw(), 0);
        assert_eq!(b.raw(), 1);
        assert!(roster.contains(b));
        assert!(!roster.contains(PlayerId::new(2)));
        assert_eq!(roster.display_name(a), "Kara");
        assert_eq!(roster.display_name(PlayerId::new(9)), "Player 9");
    }
}

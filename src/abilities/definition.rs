//! Ability definitions: the static data an action executes against.
//!
//! Definitions are immutable templates. Runtime state that varies per
//! player (cooldown counters, unlocks) lives on the player, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::status::{StatusEffect, StatusKind};

/// Unique identifier for an ability definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilityId(u16);

impl AbilityId {
    /// Create a new ability ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ability {}", self.0)
    }
}

/// What an ability may legally point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRule {
    /// No target field allowed.
    None,
    /// Caster only.
    SelfOnly,
    /// Any living player, including the caster.
    AnyPlayer,
    /// Any living player other than the caster.
    OtherPlayer,
    /// A living player or the monster.
    PlayerOrMonster,
}

/// What happens when an ability resolves.
///
/// Numbers here are pre-modifier bases; the combat resolver applies the
/// caster's damage or healing modifier and the target's armor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityEffect {
    /// Single-target damage, optionally inflicting a status on a player
    /// target and optionally revealing whether the target is a Warlock.
    Strike {
        base: u32,
        inflict: Option<StatusEffect>,
        reveal: bool,
    },
    /// Single-target healing.
    Heal { base: u32 },
    /// Damage to every other living player.
    AreaStrike { base: u32 },
    /// Healing to every living player the caster's side can reach.
    AreaHeal { base: u32 },
    /// Pure status application, no damage roll.
    Afflict { effect: StatusEffect },
    /// Reveal whether the target is a Warlock, dealing no damage.
    Detect,
}

impl AbilityEffect {
    /// Whether invisibility shields a player target from this effect.
    ///
    /// Strikes and harmful afflictions cannot land on a hidden player;
    /// heals, friendly shields, and detection reach through the veil.
    #[must_use]
    pub fn is_hostile(&self) -> bool {
        match self {
            AbilityEffect::Strike { .. } | AbilityEffect::AreaStrike { .. } => true,
            AbilityEffect::Afflict { effect } => {
                matches!(effect.kind, StatusKind::Poisoned | StatusKind::Stunned)
            }
            AbilityEffect::Heal { .. } | AbilityEffect::AreaHeal { .. } | AbilityEffect::Detect => {
                false
            }
        }
    }
}

/// An ability template: identity, arbitration priority, cooldown, and effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityDef {
    pub id: AbilityId,
    pub name: String,
    /// Higher resolves earlier within a round.
    pub priority: u8,
    /// Rounds the caster must wait between uses. Zero means every round.
    pub cooldown: u32,
    pub targeting: TargetRule,
    pub effect: AbilityEffect,
}

impl AbilityDef {
    /// Create a definition with the default priority and no cooldown.
    pub fn new(id: AbilityId, name: impl Into<String>, targeting: TargetRule, effect: AbilityEffect) -> Self {
        Self {
            id,
            name: name.into(),
            priority: crate::queue::DEFAULT_PRIORITY,
            cooldown: 0,
            targeting,
            effect,
        }
    }

    /// Set the arbitration priority (builder style).
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Set the cooldown in rounds (builder style).
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Whether this ability requires an explicit target field.
    #[must_use]
    pub fn needs_target(&self) -> bool {
        !matches!(self.targeting, TargetRule::None | TargetRule::SelfOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_id() {
        let id = AbilityId::new(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(format!("{id}"), "Ability 7");
    }

    #[test]
    fn test_builder_defaults() {
        let def = AbilityDef::new(
            AbilityId::new(1),
            "Slash",
            TargetRule::PlayerOrMonster,
            AbilityEffect::Strike { base: 25, inflict: None, reveal: false },
        );
        assert_eq!(def.priority, crate::queue::DEFAULT_PRIORITY);
        assert_eq!(def.cooldown, 0);
        assert!(def.needs_target());
    }

    #[test]
    fn test_builder_overrides() {
        let def = AbilityDef::new(
            AbilityId::new(2),
            "Smoke Veil",
            TargetRule::SelfOnly,
            AbilityEffect::Afflict { effect: StatusEffect::invisible(1) },
        )
        .with_priority(8)
        .with_cooldown(3);
        assert_eq!(def.priority, 8);
        assert_eq!(def.cooldown, 3);
        assert!(!def.needs_target());
    }
}

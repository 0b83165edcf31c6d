//! The ability book: every castable ability, looked up by ID.
//!
//! IDs of the built-in catalog are exported as constants so class
//! loadouts and tests can name abilities without magic numbers.

use rustc_hash::FxHashMap;

use super::definition::{AbilityDef, AbilityEffect, AbilityId, TargetRule};
use crate::status::StatusEffect;

pub const SLASH: AbilityId = AbilityId::new(1);
pub const SHIELD_BASH: AbilityId = AbilityId::new(2);
pub const BARKSKIN: AbilityId = AbilityId::new(3);
pub const MEND: AbilityId = AbilityId::new(4);
pub const MASS_MEND: AbilityId = AbilityId::new(5);
pub const HOLY_BOLT: AbilityId = AbilityId::new(6);
pub const SCORCH: AbilityId = AbilityId::new(7);
pub const FIREBALL: AbilityId = AbilityId::new(8);
pub const VENOM_DART: AbilityId = AbilityId::new(9);
pub const SMOKE_VEIL: AbilityId = AbilityId::new(10);
pub const SIXTH_SENSE: AbilityId = AbilityId::new(11);

/// Lookup table of ability definitions.
#[derive(Clone, Debug, Default)]
pub struct AbilityBook {
    abilities: FxHashMap<AbilityId, AbilityDef>,
}

impl AbilityBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard catalog every room starts with.
    #[must_use]
    pub fn builtin() -> Self {
        let mut book = Self::new();

        book.register(
            AbilityDef::new(
                SLASH,
                "Slash",
                TargetRule::PlayerOrMonster,
                AbilityEffect::Strike { base: 25, inflict: None, reveal: false },
            ),
        );
        book.register(
            AbilityDef::new(
                SHIELD_BASH,
                "Shield Bash",
                TargetRule::PlayerOrMonster,
                AbilityEffect::Strike {
                    base: 15,
                    inflict: Some(StatusEffect::stun(1)),
                    reveal: false,
                },
            )
            .with_priority(7)
            .with_cooldown(2),
        );
        book.register(
            AbilityDef::new(
                BARKSKIN,
                "Barkskin",
                TargetRule::AnyPlayer,
                AbilityEffect::Afflict { effect: StatusEffect::shield(3, 2) },
            )
            .with_priority(8)
            .with_cooldown(2),
        );
        book.register(
            AbilityDef::new(
                MEND,
                "Mend",
                TargetRule::AnyPlayer,
                AbilityEffect::Heal { base: 30 },
            )
            .with_priority(6),
        );
        book.register(
            AbilityDef::new(
                MASS_MEND,
                "Mass Mend",
                TargetRule::None,
                AbilityEffect::AreaHeal { base: 15 },
            )
            .with_priority(6)
            .with_cooldown(3),
        );
        book.register(
            AbilityDef::new(
                HOLY_BOLT,
                "Holy Bolt",
                TargetRule::PlayerOrMonster,
                AbilityEffect::Strike { base: 20, inflict: None, reveal: true },
            )
            .with_cooldown(1),
        );
        book.register(
            AbilityDef::new(
                SCORCH,
                "Scorch",
                TargetRule::PlayerOrMonster,
                AbilityEffect::Strike { base: 30, inflict: None, reveal: false },
            )
            .with_priority(4)
            .with_cooldown(1),
        );
        book.register(
            AbilityDef::new(
                FIREBALL,
                "Fireball",
                TargetRule::None,
                AbilityEffect::AreaStrike { base: 18 },
            )
            .with_priority(4)
            .with_cooldown(3),
        );
        book.register(
            AbilityDef::new(
                VENOM_DART,
                "Venom Dart",
                TargetRule::OtherPlayer,
                AbilityEffect::Afflict { effect: StatusEffect::poison(10, 2) },
            )
            .with_priority(4)
            .with_cooldown(1),
        );
        book.register(
            AbilityDef::new(
                SMOKE_VEIL,
                "Smoke Veil",
                TargetRule::SelfOnly,
                AbilityEffect::Afflict { effect: StatusEffect::invisible(1) },
            )
            .with_priority(8)
            .with_cooldown(3),
        );
        book.register(
            AbilityDef::new(
                SIXTH_SENSE,
                "Sixth Sense",
                TargetRule::OtherPlayer,
                AbilityEffect::Detect,
            )
            .with_priority(9)
            .with_cooldown(2),
        );

        book
    }

    /// Register an ability definition.
    ///
    /// Panics if the ID is already taken; the catalog is built once at
    /// startup and duplicate IDs are a configuration bug.
    pub fn register(&mut self, def: AbilityDef) {
        if self.abilities.contains_key(&def.id) {
            panic!("ability {} already registered", def.id);
        }
        self.abilities.insert(def.id, def);
    }

    /// Look up a definition by ID.
    #[must_use]
    pub fn get(&self, id: AbilityId) -> Option<&AbilityDef> {
        self.abilities.get(&id)
    }

    /// Whether an ID is registered.
    #[must_use]
    pub fn contains(&self, id: AbilityId) -> bool {
        self.abilities.contains_key(&id)
    }

    /// Number of registered abilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    /// Whether the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// Iterate all definitions in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &AbilityDef> {
        self.abilities.values()
    }
}

//! Ability definitions, the builtin catalog, and the executor.

mod definition;
mod registry;
mod resolver;

pub use definition::{AbilityDef, AbilityEffect, AbilityId, TargetRule};
pub use registry::{
    AbilityBook, BARKSKIN, FIREBALL, HOLY_BOLT, MASS_MEND, MEND, SCORCH, SHIELD_BASH,
    SIXTH_SENSE, SLASH, SMOKE_VEIL, VENOM_DART,
};
pub use resolver::AbilityResolver;

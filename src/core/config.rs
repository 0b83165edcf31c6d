//! Room configuration.
//!
//! All tunables live here so balance passes touch one struct. A room
//! takes a config at creation and never rereads it from outside, which
//! keeps resolved games replayable even if defaults shift later.

use serde::{Deserialize, Serialize};

/// Tunable parameters for one room.
///
/// `Default` gives the standard ruleset; builder methods override
/// individual knobs for tests and balance experiments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Players required before the game can start.
    pub min_players: usize,
    /// Hard cap on roster size.
    pub max_players: usize,
    /// Fraction of the starting roster dealt the Warlock role.
    /// At least one Warlock is always dealt.
    pub warlock_fraction: f64,
    /// Fractional damage reduction per point of armor. Total reduction
    /// is capped at 100%; negative armor amplifies damage.
    pub armor_reduction_per_point: f64,
    /// Base probability that a Warlock's strike or heal converts the
    /// target. Area effects roll at half this value per target.
    pub corruption_chance: f64,
    /// Fractional damage bonus for actions flagged as coordinated.
    pub coordination_bonus: f64,
    /// Armor points granted by the defend command.
    pub defend_armor_bonus: i32,
    /// Rounds a defend shield lasts.
    pub defend_duration: u32,
    /// Monster health at level 1.
    pub monster_base_health: u32,
    /// Monster damage before age scaling.
    pub monster_base_damage: u32,
    /// Extra monster health per level past the first.
    pub monster_health_per_level: u32,
    /// Actions executed per batch during round resolution.
    pub batch_size: usize,
    /// Resolved actions kept in the queue history.
    pub history_limit: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 20,
            warlock_fraction: 0.25,
            armor_reduction_per_point: 0.10,
            corruption_chance: 0.30,
            coordination_bonus: 0.25,
            defend_armor_bonus: 3,
            defend_duration: 1,
            monster_base_health: 100,
            monster_base_damage: 10,
            monster_health_per_level: 50,
            batch_size: 4,
            history_limit: 100,
        }
    }
}

impl RoomConfig {
    /// Standard ruleset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum roster size (builder style).
    #[must_use]
    pub fn with_min_players(mut self, min: usize) -> Self {
        self.min_players = min;
        self
    }

    /// Set the maximum roster size (builder style).
    #[must_use]
    pub fn with_max_players(mut self, max: usize) -> Self {
        self.max_players = max;
        self
    }

    /// Set the Warlock fraction (builder style).
    #[must_use]
    pub fn with_warlock_fraction(mut self, fraction: f64) -> Self {
        self.warlock_fraction = fraction;
        self
    }

    /// Set the base corruption chance (builder style).
    #[must_use]
    pub fn with_corruption_chance(mut self, chance: f64) -> Self {
        self.corruption_chance = chance;
        self
    }

    /// Set the per-point armor reduction (builder style).
    #[must_use]
    pub fn with_armor_reduction(mut self, per_point: f64) -> Self {
        self.armor_reduction_per_point = per_point;
        self
    }

    /// Set the coordination damage bonus (builder style).
    #[must_use]
    pub fn with_coordination_bonus(mut self, bonus: f64) -> Self {
        self.coordination_bonus = bonus;
        self
    }

    /// Set the resolution batch size (builder style).
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the queue history cap (builder style).
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Number of Warlocks to deal for a roster of `player_count`.
    #[must_use]
    pub fn warlock_count(&self, player_count: usize) -> usize {
        let dealt = (player_count as f64 * self.warlock_fraction).round() as usize;
        dealt.max(1).min(player_count)
    }

    /// Monster health when respawning at the given level.
    #[must_use]
    pub fn monster_health_at(&self, level: u32) -> u32 {
        self.monster_base_health + level.saturating_sub(1) * self.monster_health_per_level
    }
}

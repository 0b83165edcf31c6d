use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a single validation rule.
///
/// Codes are stable and wire-safe; callers use them to request rule
/// subsets and to map failures back to rejection reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    ActorExists,
    ActorAlive,
    ActorNotStunned,
    PhaseIsAction,
    NoDuplicatePending,
    AbilityKnown,
    AbilityReady,
    TargetLegal,
    MinPlayers,
    MaxPlayers,
    AlivePlayersExist,
    MonsterHealthBounds,
    PhaseValid,
    CountersNonNegative,
    RolesAssigned,
    LoadoutsValid,
    AllReady,
    TransitionLegal,
    WinConsistent,
}

impl RuleId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActorExists => "actor_exists",
            Self::ActorAlive => "actor_alive",
            Self::ActorNotStunned => "actor_not_stunned",
            Self::PhaseIsAction => "phase_is_action",
            Self::NoDuplicatePending => "no_duplicate_pending",
            Self::AbilityKnown => "ability_known",
            Self::AbilityReady => "ability_ready",
            Self::TargetLegal => "target_legal",
            Self::MinPlayers => "min_players",
            Self::MaxPlayers => "max_players",
            Self::AlivePlayersExist => "alive_players_exist",
            Self::MonsterHealthBounds => "monster_health_bounds",
            Self::PhaseValid => "phase_valid",
            Self::CountersNonNegative => "counters_non_negative",
            Self::RolesAssigned => "roles_assigned",
            Self::LoadoutsValid => "loadouts_valid",
            Self::AllReady => "all_ready",
            Self::TransitionLegal => "transition_legal",
            Self::WinConsistent => "win_consistent",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single rule came out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Passed,
    Failed,
    /// Suspicious but not disqualifying; weighs half a failure in the
    /// score and only blocks strict validation.
    Warning,
}

/// One rule's verdict, with an optional human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule: RuleId,
    pub status: RuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcome of a validation pass: per-rule verdicts plus a 0-100 score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    outcomes: Vec<RuleOutcome>,
}

impl ValidationResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pass(&mut self, rule: RuleId) {
        self.record(rule, RuleStatus::Passed, None);
    }

    pub fn fail(&mut self, rule: RuleId, detail: impl Into<String>) {
        self.record(rule, RuleStatus::Failed, Some(detail.into()));
    }

    pub fn warn(&mut self, rule: RuleId, detail: impl Into<String>) {
        self.record(rule, RuleStatus::Warning, Some(detail.into()));
    }

    pub fn record(&mut self, rule: RuleId, status: RuleStatus, detail: Option<String>) {
        self.outcomes.push(RuleOutcome { rule, status, detail });
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter()
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(RuleStatus::Passed)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(RuleStatus::Failed)
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(RuleStatus::Warning)
    }

    fn count(&self, status: RuleStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Health score out of 100. Warnings count half a failure; a run
    /// with no rules evaluated scores a clean 100.
    #[must_use]
    pub fn score(&self) -> u32 {
        let passed = self.passed_count() as f64;
        let failed = self.failed_count() as f64;
        let warnings = self.warning_count() as f64;
        let total = passed + failed + 0.5 * warnings;
        if total == 0.0 {
            return 100;
        }
        (passed / total * 100.0).round() as u32
    }

    /// Whether this result clears the bar: no failures, and under
    /// strict mode no warnings either.
    #[must_use]
    pub fn accepted(&self, strict: bool) -> bool {
        self.failed_count() == 0 && (!strict || self.warning_count() == 0)
    }

    /// The first failed rule, for turning a result into a rejection.
    #[must_use]
    pub fn first_failure(&self) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|o| o.status == RuleStatus::Failed)
    }
}

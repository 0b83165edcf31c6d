//! The round log: everything that happened during resolution, in order.
//!
//! Entries are structured so transports can localize or re-render them;
//! `Display` gives the stock English line. Each entry carries a
//! visibility class: `Secret` entries (corruption, detection results)
//! stay server-side and are stripped from the public render.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::player::DeathCause;
use crate::status::StatusKind;

/// Who may see a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogVisibility {
    /// Broadcast with the round summary.
    Public,
    /// Server-side only; leaking it would unmask a hidden role.
    Secret,
}

/// One thing that happened during round resolution.
///
/// Names in entries are display names, resolved at log time, so the log
/// stays meaningful even after the roster changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum LogEntry {
    Damage {
        attacker: String,
        target: String,
        amount: u32,
    },
    DamageAbsorbed {
        target: String,
        effect: String,
    },
    Healed {
        healer: String,
        target: String,
        amount: u32,
    },
    PoisonTick {
        target: String,
        damage: u32,
    },
    StatusApplied {
        target: String,
        kind: StatusKind,
        turns: u32,
    },
    StatusRefreshed {
        target: String,
        kind: StatusKind,
        turns: u32,
    },
    StatusExpired {
        target: String,
        kind: StatusKind,
    },
    StatusRejected {
        target: String,
        name: String,
    },
    Defended {
        player: String,
    },
    RoleSensed {
        seer: String,
        target: String,
        warlock: bool,
    },
    ActionFailed {
        player: String,
        reason: String,
    },
    Died {
        player: String,
        killer: String,
        cause: DeathCause,
    },
    Resurrected {
        player: String,
        effect: String,
        restored: u32,
    },
    MonsterDamaged {
        attacker: String,
        amount: u32,
        remaining: u32,
    },
    MonsterSlain {
        slayer: String,
    },
    MonsterAlreadyDown,
    MonsterIdle,
    MonsterFell {
        level: u32,
    },
    MonsterRespawned {
        level: u32,
        health: u32,
    },
    Corrupted {
        player: String,
    },
}

impl LogEntry {
    /// Visibility class for this entry.
    ///
    /// Role knowledge stays secret: conversions and detection results
    /// never reach the shared feed.
    #[must_use]
    pub fn visibility(&self) -> LogVisibility {
        match self {
            LogEntry::Corrupted { .. } | LogEntry::RoleSensed { .. } => LogVisibility::Secret,
            _ => LogVisibility::Public,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Damage { attacker, target, amount } => {
                write!(f, "{target} takes {amount} damage from {attacker}")
            }
            LogEntry::DamageAbsorbed { target, effect } => {
                write!(f, "{target}'s {effect} absorbs the blow")
            }
            LogEntry::Healed { healer, target, amount } => {
                write!(f, "{healer} heals {target} for {amount}")
            }
            LogEntry::PoisonTick { target, damage } => {
                write!(f, "{target} suffers {damage} poison damage")
            }
            LogEntry::StatusApplied { target, kind, turns } => {
                write!(f, "{target} is {kind} ({turns} rounds)")
            }
            LogEntry::StatusRefreshed { target, kind, turns } => {
                write!(f, "{target} is {kind} again ({turns} rounds)")
            }
            LogEntry::StatusExpired { target, kind } => {
                write!(f, "{target} is no longer {kind}")
            }
            LogEntry::StatusRejected { target, name } => {
                write!(f, "nothing happens to {target} ({name} is not a known affliction)")
            }
            LogEntry::Defended { player } => write!(f, "{player} raises their guard"),
            LogEntry::RoleSensed { seer, target, warlock } => {
                if *warlock {
                    write!(f, "{seer} senses a dark pact around {target}")
                } else {
                    write!(f, "{seer} senses no corruption in {target}")
                }
            }
            LogEntry::ActionFailed { player, reason } => {
                write!(f, "{player}'s action fails ({reason})")
            }
            LogEntry::Died { player, killer, cause } => match cause {
                DeathCause::Strike => write!(f, "{player} is slain by {killer}"),
                DeathCause::Poison => write!(f, "{player} succumbs to poison"),
            },
            LogEntry::Resurrected { player, effect, restored } => {
                write!(f, "{player}'s {effect} denies death ({restored} health)")
            }
            LogEntry::MonsterDamaged { attacker, amount, remaining } => {
                write!(f, "{attacker} hits the Monster for {amount} ({remaining} left)")
            }
            LogEntry::MonsterSlain { slayer } => {
                write!(f, "{slayer} lands the killing blow on the Monster")
            }
            LogEntry::MonsterAlreadyDown => write!(f, "the Monster is already down"),
            LogEntry::MonsterIdle => write!(f, "the Monster finds no one to strike"),
            LogEntry::MonsterFell { level } => {
                write!(f, "the level {level} Monster has fallen")
            }
            LogEntry::MonsterRespawned { level, health } => {
                write!(f, "a fiercer Monster rises (level {level}, {health} health)")
            }
            LogEntry::Corrupted { player } => {
                write!(f, "{player} is bound to the coven")
            }
        }
    }
}

/// Ordered log for one round of resolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundLog {
    entries: Vec<LogEntry>,
}

impl RoundLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// All entries, secret ones included.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rendered lines safe to broadcast: secret entries are stripped.
    #[must_use]
    pub fn render_public(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.visibility() == LogVisibility::Public)
            .map(ToString::to_string)
            .collect()
    }

    /// Rendered lines for server-side inspection, secrets included.
    #[must_use]
    pub fn render_all(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_render_strips_secrets() {
        let mut log = RoundLog::new();
        log.push(LogEntry::Damage {
            attacker: "the Monster".into(),
            target: "Kara".into(),
            amount: 18,
        });
        log.push(LogEntry::Corrupted { player: "Kara".into() });

        assert_eq!(log.len(), 2);
        let public = log.render_public();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0], "Kara takes 18 damage from the Monster");
        assert_eq!(log.render_all().len(), 2);
    }

    #[test]
    fn test_death_lines_follow_cause() {
        let strike = LogEntry::Died {
            player: "Bron".into(),
            killer: "the Monster".into(),
            cause: DeathCause::Strike,
        };
        assert_eq!(strike.to_string(), "Bron is slain by the Monster");

        let poison = LogEntry::Died {
            player: "Bron".into(),
            killer: "Vex".into(),
            cause: DeathCause::Poison,
        };
        assert_eq!(poison.to_string(), "Bron succumbs to poison");
    }

    #[test]
    fn test_status_lines_read_as_adjectives() {
        let applied = LogEntry::StatusApplied {
            target: "Kara".into(),
            kind: StatusKind::Poisoned,
            turns: 2,
        };
        assert_eq!(applied.to_string(), "Kara is poisoned (2 rounds)");

        let expired = LogEntry::StatusExpired {
            target: "Kara".into(),
            kind: StatusKind::Invisible,
        };
        assert_eq!(expired.to_string(), "Kara is no longer invisible");
    }
}

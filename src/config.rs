//! Per-table configuration (§6 "Configuration"). Validated once, at
//! table-creation time, never re-checked mid-hand.

use crate::error::{EngineError, EngineResult};
use crate::Chips;
use serde::{Deserialize, Serialize};

/// `bombPot.variant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombPotVariant {
    SingleBoard,
    DoubleBoard,
}

/// `bombPot.trigger`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BombPotTrigger {
    /// Fires every Nth hand.
    Interval(u32),
    /// Fires with probability `pct` (0.0..=1.0) each eligible hand.
    Random(f32),
    /// Fires once a table vote crosses `threshold` (fraction of seated
    /// players). Vote collection itself is out of scope (§1); the
    /// Orchestrator is told the outcome via `record_vote`.
    Voting(f32),
    /// Fires only when the host explicitly calls `startBombPot`.
    Manual,
    /// Fires on the hand immediately following one the button seat won
    /// without a showdown.
    ButtonMoneyWin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BombPotConfig {
    pub variant: BombPotVariant,
    pub ante: Chips,
    pub trigger: BombPotTrigger,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TableConfig {
    pub small_blind: Chips,
    pub big_blind: Chips,
    /// 0 means unlimited (no timer).
    pub action_timer_seconds: u32,
    pub time_bank_enabled: bool,
    pub time_bank_seconds: u32,
    pub bomb_pot: Option<BombPotConfig>,
    pub max_seats: u8,
}

impl TableConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.big_blind != 2 * self.small_blind {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "big blind ({}) must be exactly 2x small blind ({})",
                    self.big_blind, self.small_blind
                ),
            });
        }
        if self.small_blind <= 0 {
            return Err(EngineError::InvalidConfig {
                reason: "small blind must be positive".into(),
            });
        }
        if self.time_bank_enabled && self.time_bank_seconds == 0 {
            return Err(EngineError::InvalidConfig {
                reason: "time bank enabled but time_bank_seconds is 0".into(),
            });
        }
        if !(1..=10).contains(&self.max_seats) {
            return Err(EngineError::InvalidConfig {
                reason: "max_seats must be between 1 and 10".into(),
            });
        }
        if let Some(bomb) = &self.bomb_pot {
            if bomb.ante <= 0 {
                return Err(EngineError::InvalidConfig {
                    reason: "bomb pot ante must be positive".into(),
                });
            }
            if let BombPotTrigger::Random(pct) = bomb.trigger {
                if !(0.0..=1.0).contains(&pct) {
                    return Err(EngineError::InvalidConfig {
                        reason: "bomb pot random trigger pct must be in [0,1]".into(),
                    });
                }
            }
            if let BombPotTrigger::Voting(threshold) = bomb.trigger {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(EngineError::InvalidConfig {
                        reason: "bomb pot voting threshold must be in [0,1]".into(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            small_blind: 1,
            big_blind: 2,
            action_timer_seconds: 30,
            time_bank_enabled: true,
            time_bank_seconds: 60,
            bomb_pot: None,
            max_seats: 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_blinds() {
        let cfg = TableConfig {
            small_blind: 1,
            big_blind: 3,
            ..TableConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn accepts_default() {
        assert!(TableConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_timebank_without_seconds() {
        let cfg = TableConfig {
            time_bank_enabled: true,
            time_bank_seconds: 0,
            ..TableConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}

//! BombPotScheduler: decides, ahead of each new hand, whether the
//! Orchestrator's next entrypoint should be `start_new_hand` or
//! `start_bomb_pot` (§4.8). Not named as its own component in the
//! distilled component table, but required to make `BombPotTrigger`
//! (§6 "Configuration") anything more than inert configuration data;
//! grounded on the same `Random`/interval style triggers as the
//! teacher's MCCFR `Exploration` sampling policy
//! (`mccfr::Exploration`), generalized from a solver's bandit choice
//! to a per-hand boolean decision.

use rand::Rng;

use crate::config::{BombPotConfig, BombPotTrigger};

#[derive(Debug, Clone, Copy, Default)]
pub struct BombPotSchedulerState {
    /// Hands played since the last bomb pot (or table start).
    pub hands_since_last: u32,
    /// Set by the Orchestrator when the most recently completed hand
    /// ended without a showdown and the button seat won it — feeds
    /// `ButtonMoneyWin`.
    pub last_hand_button_won_uncontested: bool,
    /// Set externally when a table vote crosses the table's
    /// configured `Voting` threshold; consumed on the next decision.
    pub vote_triggered: bool,
}

pub struct BombPotScheduler;

impl BombPotScheduler {
    /// Returns `true` if the next hand should be a bomb pot. `rng` is
    /// threaded in explicitly (rather than reached for internally) so
    /// callers can supply a seeded generator in tests.
    pub fn should_trigger<R: Rng + ?Sized>(
        config: Option<&BombPotConfig>,
        state: &BombPotSchedulerState,
        rng: &mut R,
    ) -> bool {
        let Some(config) = config else {
            return false;
        };
        match config.trigger {
            BombPotTrigger::Interval(n) => n > 0 && state.hands_since_last >= n,
            BombPotTrigger::Random(pct) => rng.random::<f32>() < pct,
            BombPotTrigger::Voting(_) => state.vote_triggered,
            BombPotTrigger::Manual => false,
            BombPotTrigger::ButtonMoneyWin => state.last_hand_button_won_uncontested,
        }
    }

    /// Advances `state` after a hand completes (whether or not it was
    /// itself a bomb pot).
    pub fn record_hand_completed(
        state: &mut BombPotSchedulerState,
        was_bomb_pot: bool,
        button_won_uncontested: bool,
    ) {
        if was_bomb_pot {
            state.hands_since_last = 0;
        } else {
            state.hands_since_last += 1;
        }
        state.last_hand_button_won_uncontested = button_won_uncontested;
        state.vote_triggered = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BombPotVariant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn config(trigger: BombPotTrigger) -> BombPotConfig {
        BombPotConfig {
            variant: BombPotVariant::SingleBoard,
            ante: 5,
            trigger,
        }
    }

    #[test]
    fn no_config_never_triggers() {
        let state = BombPotSchedulerState::default();
        let mut rng = test_rng();
        assert!(!BombPotScheduler::should_trigger(None, &state, &mut rng));
    }

    #[test]
    fn interval_trigger_fires_at_threshold() {
        let cfg = config(BombPotTrigger::Interval(10));
        let mut state = BombPotSchedulerState::default();
        let mut rng = test_rng();
        state.hands_since_last = 9;
        assert!(!BombPotScheduler::should_trigger(Some(&cfg), &state, &mut rng));
        state.hands_since_last = 10;
        assert!(BombPotScheduler::should_trigger(Some(&cfg), &state, &mut rng));
    }

    #[test]
    fn manual_trigger_never_fires_automatically() {
        let cfg = config(BombPotTrigger::Manual);
        let state = BombPotSchedulerState::default();
        let mut rng = test_rng();
        assert!(!BombPotScheduler::should_trigger(Some(&cfg), &state, &mut rng));
    }

    #[test]
    fn record_hand_completed_resets_counter_on_bomb_pot() {
        let mut state = BombPotSchedulerState { hands_since_last: 5, ..Default::default() };
        BombPotScheduler::record_hand_completed(&mut state, true, false);
        assert_eq!(state.hands_since_last, 0);
    }
}

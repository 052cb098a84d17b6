//! ActionTimer (§4.6): per-table single-shot countdown with warning,
//! time-bank escalation, and auto-fold on expiry. Grounded on the
//! teacher's `Room::ask` timeout (`tokio::time::timeout` racing the
//! player's action against a deadline) generalized from one fixed
//! `Duration` into the tick/warning/time-bank state machine §4.6
//! specifies, and on `hosting::handle`'s lock-then-release-before-send
//! pattern for keeping broadcasts outside the state lock (§5).

use crate::ids::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTickKind {
    Tick,
    Warning,
    TimeBankActivated,
    Expired,
}

#[derive(Debug, Clone, Copy)]
pub struct TimerBroadcast {
    pub player: PlayerId,
    pub remaining_seconds: u32,
    pub is_time_bank_active: bool,
    pub time_bank_remaining: u32,
    pub kind: TimerTickKind,
}

/// One table's single active countdown. `None` means no timer is
/// running (disabled, or between turns).
#[derive(Debug, Clone)]
pub struct ActionTimer {
    player: PlayerId,
    remaining_seconds: u32,
    time_bank_enabled: bool,
    time_bank_remaining: u32,
    in_time_bank: bool,
    warned: bool,
    time_bank_consumed: u32,
}

impl ActionTimer {
    /// Returns `None` if `action_seconds <= 0` (§4.6 "the timer is
    /// disabled; player has unlimited time").
    pub fn start(
        player: PlayerId,
        action_seconds: u32,
        time_bank_enabled: bool,
        time_bank_remaining: u32,
    ) -> Option<Self> {
        if action_seconds == 0 {
            return None;
        }
        Some(Self {
            player,
            remaining_seconds: action_seconds,
            time_bank_enabled,
            time_bank_remaining,
            in_time_bank: false,
            warned: false,
            time_bank_consumed: 0,
        })
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Advances one second. Returns every broadcast this tick produces
    /// in order (a plain tick may be accompanied by a one-shot warning
    /// or time-bank-activation event on the same second) plus whether
    /// the timer has now fully expired (action timer and, if enabled,
    /// time bank both exhausted) and should be removed by the caller.
    pub fn tick(&mut self) -> (Vec<TimerBroadcast>, bool) {
        let mut events = Vec::new();
        if self.in_time_bank {
            self.time_bank_remaining = self.time_bank_remaining.saturating_sub(1);
            self.time_bank_consumed += 1;
            events.push(self.broadcast(TimerTickKind::Tick));
            if self.time_bank_remaining == 0 {
                events.push(self.broadcast(TimerTickKind::Expired));
                return (events, true);
            }
            return (events, false);
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        events.push(self.broadcast(TimerTickKind::Tick));
        if !self.warned && self.remaining_seconds <= 10 {
            self.warned = true;
            events.push(self.broadcast(TimerTickKind::Warning));
        }
        if self.remaining_seconds == 0 {
            if self.time_bank_enabled && self.time_bank_remaining > 0 {
                self.in_time_bank = true;
                events.push(self.broadcast(TimerTickKind::TimeBankActivated));
                return (events, false);
            }
            events.push(self.broadcast(TimerTickKind::Expired));
            return (events, true);
        }
        (events, false)
    }

    /// Seconds of time bank actually spent so far (debited by
    /// `Orchestrator::force_timeout_fold` on expiry, or by a cancel
    /// that arrives mid-bank).
    pub fn time_bank_consumed(&self) -> u32 {
        self.time_bank_consumed
    }

    /// Read-only projection of the current countdown, for an
    /// on-demand query (`GetTimerState`) rather than a tick-driven
    /// push. Does not mutate or consume any time.
    pub fn snapshot(&self) -> TimerBroadcast {
        self.broadcast(TimerTickKind::Tick)
    }

    fn broadcast(&self, kind: TimerTickKind) -> TimerBroadcast {
        TimerBroadcast {
            player: self.player,
            remaining_seconds: if self.in_time_bank { self.time_bank_remaining } else { self.remaining_seconds },
            is_time_bank_active: self.in_time_bank,
            time_bank_remaining: self.time_bank_remaining,
            kind,
        }
    }
}

/// Owns at most one `ActionTimer` per table. A `cancel`/`expire` call
/// first removes the timer from this map (§4.6/§5: "remove the timer
/// first to prevent further ticks"); a stale caller racing an already
/// removed timer observes `None` and must no-op rather than error
/// (`EngineError::TimerRace` is for the orchestrator layer, which
/// knows which player it expected; this map itself just reports
/// presence).
#[derive(Debug, Default)]
pub struct TableTimerSlot {
    timer: Option<ActionTimer>,
    paused: bool,
}

impl TableTimerSlot {
    pub fn replace(&mut self, timer: Option<ActionTimer>) {
        self.timer = timer;
    }

    pub fn get_mut(&mut self) -> Option<&mut ActionTimer> {
        if self.paused {
            None
        } else {
            self.timer.as_mut()
        }
    }

    /// Read-only access regardless of `paused`, for status queries
    /// that must not themselves be blocked by a pause.
    pub fn peek(&self) -> Option<&ActionTimer> {
        self.timer.as_ref()
    }

    /// Removes and returns the current timer, consuming it. Returns
    /// `None` if there was nothing to cancel (a race already resolved
    /// it): that case is expected and must not be treated as an
    /// error by the caller.
    pub fn remove(&mut self) -> Option<ActionTimer> {
        self.timer.take()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_seconds_disables_timer() {
        assert!(ActionTimer::start(PlayerId::new(), 0, true, 60).is_none());
    }

    #[test]
    fn warning_fires_once_at_ten_seconds() {
        let mut timer = ActionTimer::start(PlayerId::new(), 12, false, 0).unwrap();
        for _ in 0..2 {
            timer.tick();
        }
        let (events, done) = timer.tick();
        assert!(!done);
        assert!(events.iter().any(|e| e.kind == TimerTickKind::Warning));
        let (events2, _) = timer.tick();
        assert!(!events2.iter().any(|e| e.kind == TimerTickKind::Warning));
    }

    #[test]
    fn expiry_without_time_bank_after_action_timer_zero() {
        let mut timer = ActionTimer::start(PlayerId::new(), 1, false, 0).unwrap();
        let (events, done) = timer.tick();
        assert!(done);
        assert!(events.iter().any(|e| e.kind == TimerTickKind::Expired));
    }

    #[test]
    fn escalates_to_time_bank_then_expires() {
        let mut timer = ActionTimer::start(PlayerId::new(), 1, true, 2).unwrap();
        let (events, done) = timer.tick();
        assert!(!done);
        assert!(events.iter().any(|e| e.kind == TimerTickKind::TimeBankActivated));
        let (_, done2) = timer.tick();
        assert!(!done2);
        let (events3, done3) = timer.tick();
        assert!(done3);
        assert!(events3.iter().any(|e| e.kind == TimerTickKind::Expired));
        assert_eq!(timer.time_bank_consumed(), 2);
    }

    #[test]
    fn remove_on_missing_timer_is_a_no_op_not_an_error() {
        let mut slot = TableTimerSlot::default();
        assert!(slot.remove().is_none());
    }
}

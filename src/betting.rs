//! BettingRound (§3): one street's betting cycle. Replaced at each
//! street transition (§3 lifecycle).

use crate::action::ActionKind;
use crate::ids::PlayerId;
use crate::Chips;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct RecordedAction {
    pub player: PlayerId,
    pub kind: ActionKind,
    pub amount: Chips,
}

#[derive(Debug, Clone)]
pub struct BettingRound {
    /// Smallest legal raise increment; floor is the big blind at open
    /// of every street, and becomes the size of the last full raise
    /// thereafter.
    pub min_raise: Chips,
    /// The to-match amount for this round.
    pub current_bet: Chips,
    pub contributions: HashMap<PlayerId, Chips>,
    pub acted: HashSet<PlayerId>,
    pub actions: Vec<RecordedAction>,
    pub folded: HashSet<PlayerId>,
    pub raises_this_round: u32,
}

impl BettingRound {
    pub fn new(big_blind: Chips) -> Self {
        Self {
            min_raise: big_blind,
            current_bet: 0,
            contributions: HashMap::new(),
            acted: HashSet::new(),
            actions: Vec::new(),
            folded: HashSet::new(),
            raises_this_round: 0,
        }
    }

    /// Seeds a fresh preflop round with blind contributions already
    /// posted, per §4.8 step 7.
    pub fn seeded_preflop(big_blind: Chips, small_blind: Chips, sb: PlayerId, bb: PlayerId) -> Self {
        let mut round = Self::new(big_blind);
        round.current_bet = big_blind;
        round.contributions.insert(sb, small_blind);
        round.contributions.insert(bb, big_blind);
        round
    }

    pub fn contribution_of(&self, player: PlayerId) -> Chips {
        self.contributions.get(&player).copied().unwrap_or(0)
    }

    pub fn has_acted(&self, player: PlayerId) -> bool {
        self.acted.contains(&player)
    }

    pub fn record(&mut self, player: PlayerId, kind: ActionKind, amount: Chips) {
        self.actions.push(RecordedAction { player, kind, amount });
        self.acted.insert(player);
        if matches!(kind, ActionKind::Fold) {
            self.folded.insert(player);
        } else {
            *self.contributions.entry(player).or_insert(0) += amount;
        }
    }
}

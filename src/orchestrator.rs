//! Orchestrator (§4.8): the table actor. Owns a single logical
//! mutation queue per table — in this crate, a `TableActor` draining
//! an `mpsc` inbox, generalizing the teacher's `gameroom::Room::run`
//! loop (`match self.game().turn() { Chance, Terminal, Choice(i) }`)
//! from a three-way dispatch on the whole game's turn into the richer
//! `Command` set this engine's wire protocol needs, and from a single
//! in-process `Game` to the full `Table`/`Hand`/`EventStore`/
//! `ActionTimer` bundle that state actually spans.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};

use crate::action::{ActionIntent, ActionKind, ActionValidator};
use crate::bomb_pot::{BombPotScheduler, BombPotSchedulerState};
use crate::cards::{Card, Deck};
use crate::config::BombPotConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::{EventKind, EventStore, HandSummary};
use crate::hand::Hand;
use crate::ids::{HandId, PlayerId};
use crate::player::PlayerStatus;
use crate::pot::PotManager;
use crate::showdown::ShowdownHandler;
use crate::state_machine::{Phase, Trigger};
use crate::table::{Table, TableStatus};
use crate::Chips;

/// Outcome of applying one player action, consumed by the caller
/// (typically the hosting layer) to drive the Broadcaster.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub player_id: PlayerId,
    pub kind: ActionKind,
    pub amount: Chips,
    pub next_player_id: Option<PlayerId>,
    pub betting_round_complete: bool,
    pub hand_complete: bool,
    /// Set only when this action ended the hand by folding everyone
    /// else out (§4.8 step 5: no showdown). `None` when the hand is
    /// still live, or when it ended by reaching Showdown instead — that
    /// case is resolved by a separate `execute_showdown` call, since
    /// showdown evaluation needs to walk the show order first.
    pub uncontested_winner: Option<(PlayerId, Chips, u64)>,
}

/// The table actor's authoritative state, mutated only from inside
/// `TableActor::run`'s single-writer loop.
pub struct TableState {
    pub table: Table,
    pub deck: Deck,
    pub event_store: EventStore,
    pub bomb_pot_state: BombPotSchedulerState,
    pub shown_cards: HashMap<PlayerId, Vec<Card>>,
    next_pot_id: u64,
}

impl TableState {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            deck: Deck::new(),
            event_store: EventStore::new(),
            bomb_pot_state: BombPotSchedulerState::default(),
            shown_cards: HashMap::new(),
            next_pot_id: 1,
        }
    }

    /// §4.8 per-hand entrypoint: consults the table's `BombPotConfig`
    /// before falling back to a normal hand, so a configured
    /// `BombPotTrigger` actually fires instead of sitting inert data.
    /// `Command::StartNewHand` calls this rather than `start_new_hand`
    /// directly.
    pub fn start_next_hand(&mut self, now_ms: u64) -> EngineResult<()> {
        let bomb = self.table.config.bomb_pot;
        if let Some(bomb) = bomb {
            let mut rng = StdRng::from_os_rng();
            if BombPotScheduler::should_trigger(Some(&bomb), &self.bomb_pot_state, &mut rng) {
                return self.start_bomb_pot(&bomb, now_ms);
            }
        }
        self.start_new_hand(now_ms)
    }

    /// §4.8 step 1-9: seat order, button rotation, blinds, shuffle,
    /// deal, seed the preflop betting round.
    pub fn start_new_hand(&mut self, now_ms: u64) -> EngineResult<()> {
        let active_seats = self.table.active_seat_order();
        if active_seats.len() < 2 {
            return Err(EngineError::ValidationRejected {
                reason: "need at least two active players to start a hand".into(),
            });
        }

        let button_seat = self.rotate_button(&active_seats);
        let (sb_seat, bb_seat) = self.blind_seats(&active_seats, button_seat);

        for seat in &active_seats {
            if let Some(player) = self.table.seats.get_mut(seat) {
                player.reset_for_new_hand();
            }
        }

        let player_ids: Vec<PlayerId> = active_seats
            .iter()
            .filter_map(|s| self.table.seats.get(s).map(|p| p.id))
            .collect();

        let small_blind = self.table.config.small_blind;
        let big_blind = self.table.config.big_blind;
        let sb_id = self.table.seats.get(&sb_seat).map(|p| p.id).unwrap();
        let bb_id = self.table.seats.get(&bb_seat).map(|p| p.id).unwrap();
        let button_id = self.table.seats.get(&button_seat).map(|p| p.id).unwrap();

        let hand_id = HandId::new();
        self.table.hand_count += 1;
        let mut hand = Hand::new(
            hand_id,
            self.table.hand_count,
            sb_id,
            bb_id,
            button_id,
            player_ids.clone(),
            false,
            false,
            now_ms,
        );

        self.deck.shuffle();
        self.deal_hole_cards(&active_seats, button_seat)?;

        if let Some(sb) = self.table.seats.get_mut(&sb_seat) {
            sb.commit(small_blind.min(sb.stack));
        }
        if let Some(bb) = self.table.seats.get_mut(&bb_seat) {
            bb.commit(big_blind.min(bb.stack));
        }

        hand.current_bet = big_blind;
        hand.min_raise = big_blind;
        hand.state_machine().apply(Trigger::StartHand)?;
        hand.current_player_id = self.first_to_act_preflop(bb_seat, player_ids.len());

        self.table.button_seat = Some(button_seat);
        self.table.status = TableStatus::Playing;

        self.event_store.append(
            hand_id,
            self.table.id,
            now_ms,
            EventKind::HandStarted { is_bomb_pot: false, is_double_board: false, ante: None },
        )?;
        self.event_store.append(
            hand_id,
            self.table.id,
            now_ms,
            EventKind::BlindsPosted { small_blind: sb_id, big_blind: bb_id },
        )?;
        self.event_store.append(hand_id, self.table.id, now_ms, EventKind::HoleCardsDealt)?;

        self.table.current_hand = Some(hand);
        Ok(())
    }

    /// §4.8 "startBombPot": no blinds, an ante from every active
    /// player, straight to a Flop betting round.
    pub fn start_bomb_pot(&mut self, bomb: &BombPotConfig, now_ms: u64) -> EngineResult<()> {
        let active_seats = self.table.active_seat_order();
        if active_seats.len() < 2 {
            return Err(EngineError::ValidationRejected {
                reason: "need at least two active players to start a bomb pot".into(),
            });
        }
        for seat in &active_seats {
            let player = self.table.seats.get(seat).unwrap();
            if player.stack < bomb.ante {
                return Err(EngineError::ValidationRejected {
                    reason: format!("player {} cannot cover the bomb pot ante", player.id),
                });
            }
        }

        let button_seat = self.table.button_seat.unwrap_or(active_seats[0]);
        let is_double_board = matches!(bomb.variant, crate::config::BombPotVariant::DoubleBoard);

        for seat in &active_seats {
            if let Some(player) = self.table.seats.get_mut(seat) {
                player.reset_for_new_hand();
            }
        }

        let player_ids: Vec<PlayerId> = active_seats
            .iter()
            .filter_map(|s| self.table.seats.get(s).map(|p| p.id))
            .collect();

        let hand_id = HandId::new();
        self.table.hand_count += 1;
        // Bomb pots post no blinds; Hand still wants SB/BB ids to
        // identify a reference seat for tie-breaks, so both point at
        // the button itself.
        let sb_id_placeholder = player_ids[0];
        let bb_id_placeholder = sb_id_placeholder;
        let button_id = self.table.seats.get(&button_seat).map(|p| p.id).unwrap_or(sb_id_placeholder);

        let mut hand = Hand::new(
            hand_id,
            self.table.hand_count,
            sb_id_placeholder,
            bb_id_placeholder,
            button_id,
            player_ids.clone(),
            true,
            is_double_board,
            now_ms,
        );

        self.deck.shuffle();
        self.deal_hole_cards(&active_seats, button_seat)?;

        for seat in &active_seats {
            if let Some(player) = self.table.seats.get_mut(seat) {
                player.commit(bomb.ante);
                self.event_store.append(
                    hand_id,
                    self.table.id,
                    now_ms,
                    EventKind::AntePosted { player: player.id, amount: bomb.ante },
                )?;
            }
        }

        self.deck.burn()?;
        let flop = self.deck.deal(3)?;
        hand.community_cards = flop;
        if is_double_board {
            self.deck.burn()?;
            hand.second_board = Some(self.deck.deal(3)?);
        }

        hand.current_bet = 0;
        hand.min_raise = self.table.config.big_blind;
        hand.state_machine().apply(Trigger::StartHand)?;
        hand.state_machine().apply(Trigger::BettingComplete)?; // Preflop -> Flop, skipped
        hand.current_player_id = self.first_to_act_postflop(button_seat);

        self.table.status = TableStatus::Playing;

        self.event_store.append(
            hand_id,
            self.table.id,
            now_ms,
            EventKind::HandStarted { is_bomb_pot: true, is_double_board, ante: Some(bomb.ante) },
        )?;
        self.event_store.append(hand_id, self.table.id, now_ms, EventKind::HoleCardsDealt)?;
        self.event_store.append(
            hand_id,
            self.table.id,
            now_ms,
            EventKind::CommunityCardsDealt { phase: Phase::Flop },
        )?;

        self.table.current_hand = Some(hand);
        Ok(())
    }

    /// §4.8 executePlayerAction.
    pub fn execute_player_action(
        &mut self,
        player_id: PlayerId,
        intent: ActionIntent,
        now_ms: u64,
    ) -> EngineResult<ActionOutcome> {
        let hand_id;
        let validated;
        let seat_of_player;
        {
            let hand = self.table.current_hand.as_ref().ok_or_else(|| EngineError::ValidationRejected {
                reason: "no hand in progress".into(),
            })?;
            let is_turn = hand.current_player_id == Some(player_id);
            let player = self.table.player(player_id).ok_or_else(|| EngineError::ValidationRejected {
                reason: "player not seated at this table".into(),
            })?;
            let round = self.current_round_view(hand);
            validated = ActionValidator::validate(player, &round, intent, is_turn)?;
            hand_id = hand.id;
            seat_of_player = player.seat;
        }

        if let Some(player) = self.table.player_mut(player_id) {
            match validated.kind {
                ActionKind::Fold => player.status = PlayerStatus::Folded,
                _ => player.commit(validated.amount),
            }
        }

        {
            let hand = self.table.current_hand.as_mut().unwrap();
            if validated.is_raise {
                let raise_size = validated.new_total_bet - hand.current_bet;
                hand.current_bet = validated.new_total_bet;
                hand.last_aggressor_id = Some(player_id);
                if validated.reopens_action {
                    hand.raises_this_round += 1;
                    hand.min_raise = raise_size;
                    // A full raise reopens action for everyone else;
                    // an under-min all-in does not (§4.4/§8), so only
                    // the raiser's own acted-flag is set below.
                    hand.acted_this_round.clear();
                }
            }
            hand.acted_this_round.insert(player_id);
        }

        self.event_store.append(
            hand_id,
            self.table.id,
            now_ms,
            EventKind::PlayerActed { player: player_id, kind: validated.kind, amount: validated.amount },
        )?;

        let live: Vec<PlayerId> = self
            .table
            .seats
            .values()
            .filter(|p| p.is_in_hand())
            .map(|p| p.id)
            .collect();

        if live.len() == 1 {
            let winner = live[0];
            self.collect_bets_into_pots()?;
            let total = self.table.current_hand.as_ref().unwrap().total_pot();
            if let Some(player) = self.table.player_mut(winner) {
                player.stack += total;
            }
            if let Some(hand) = self.table.current_hand.as_mut() {
                for pot in hand.pots.iter_mut() {
                    pot.amount = 0;
                }
                hand.state_machine().apply(Trigger::AllFolded)?;
                hand.completed_at_ms = Some(now_ms);
            }
            self.event_store.append(
                hand_id,
                self.table.id,
                now_ms,
                EventKind::PotAwarded { pot_id: 0, winners: vec![winner], amount: total },
            )?;
            let mut awarded = HashMap::new();
            awarded.insert(winner, total);
            let summary = self.build_hand_summary(hand_id, now_ms, false, vec![winner], Phase::Complete, &awarded);
            self.event_store.append(hand_id, self.table.id, now_ms, EventKind::HandCompleted(summary))?;
            self.table.current_hand = None;
            let button_won = self.table.button_seat.and_then(|seat| self.table.seats.get(&seat)).map(|p| p.id) == Some(winner);
            BombPotScheduler::record_hand_completed(&mut self.bomb_pot_state, false, button_won);
            return Ok(ActionOutcome {
                player_id,
                kind: validated.kind,
                amount: validated.amount,
                next_player_id: None,
                betting_round_complete: true,
                hand_complete: true,
                uncontested_winner: Some((winner, total, self.table.hand_count)),
            });
        }

        if self.betting_round_complete() {
            self.event_store.append(hand_id, self.table.id, now_ms, EventKind::BettingRoundCompleted)?;
            self.advance_street(now_ms)?;
            let hand_complete = self.table.current_hand.is_none();
            let next_player_id = self.table.current_hand.as_ref().and_then(|h| h.current_player_id);
            return Ok(ActionOutcome {
                player_id,
                kind: validated.kind,
                amount: validated.amount,
                next_player_id,
                betting_round_complete: true,
                hand_complete,
                uncontested_winner: None,
            });
        }

        let next_player_id = self.compute_next_to_act(seat_of_player);
        if let Some(hand) = self.table.current_hand.as_mut() {
            hand.current_player_id = next_player_id;
        }
        Ok(ActionOutcome {
            player_id,
            kind: validated.kind,
            amount: validated.amount,
            next_player_id,
            betting_round_complete: false,
            hand_complete: false,
            uncontested_winner: None,
        })
    }

    /// §4.8 forceTimeoutFold.
    pub fn force_timeout_fold(&mut self, player_id: PlayerId, time_bank_consumed: u32, now_ms: u64) -> EngineResult<ActionOutcome> {
        if let Some(player) = self.table.player_mut(player_id) {
            let debit = time_bank_consumed.min(player.time_bank_seconds);
            player.time_bank_seconds -= debit;
        }
        self.execute_player_action(player_id, ActionIntent { kind: ActionKind::Fold, amount: 0 }, now_ms)
    }

    /// §4.8 executeShowdown.
    pub fn execute_showdown(&mut self, now_ms: u64) -> EngineResult<ShowdownOutcome> {
        let hand_id;
        let result;
        {
            let hand = self.table.current_hand.as_ref().ok_or_else(|| EngineError::ValidationRejected {
                reason: "no hand in progress".into(),
            })?;
            if hand.phase() != Phase::Showdown {
                return Err(EngineError::InvalidTransition {
                    from: format!("{:?}", hand.phase()),
                    trigger: Trigger::ShowdownComplete.to_string(),
                });
            }
            hand_id = hand.id;
            let priority: HashMap<PlayerId, u32> = hand
                .player_ids
                .iter()
                .enumerate()
                .map(|(i, id)| (*id, i as u32))
                .collect();
            let live_players: Vec<&crate::player::Player> = self
                .table
                .seats
                .values()
                .filter(|p| p.is_in_hand())
                .collect();
            result = ShowdownHandler::run(hand, &live_players, &priority)?;
        }

        for (player_id, amount) in &result.awarded {
            if let Some(player) = self.table.player_mut(*player_id) {
                player.stack += *amount;
            }
        }
        for (player_id, decision) in &result.decisions {
            let kind = match decision {
                crate::showdown::ShowdownDecision::Showed => {
                    if let Some(player) = self.table.player(*player_id) {
                        self.shown_cards.entry(*player_id).or_insert_with(|| player.hole_cards.clone());
                    }
                    EventKind::PlayerShowedCards { player: *player_id }
                }
                crate::showdown::ShowdownDecision::Mucked => EventKind::PlayerMuckedCards { player: *player_id },
            };
            self.event_store.append(hand_id, self.table.id, now_ms, kind)?;
        }
        for (pot_id, winners) in &result.winners_by_pot {
            let amount = winners.iter().filter_map(|w| result.awarded.get(w)).sum();
            self.event_store.append(
                hand_id,
                self.table.id,
                now_ms,
                EventKind::PotAwarded { pot_id: *pot_id, winners: winners.clone(), amount },
            )?;
        }

        if let Some(hand) = self.table.current_hand.as_mut() {
            hand.state_machine().apply(Trigger::ShowdownComplete)?;
            hand.completed_at_ms = Some(now_ms);
        }

        let winner_ids: Vec<PlayerId> = result.awarded.keys().copied().collect();
        let summary = self.build_hand_summary(hand_id, now_ms, true, winner_ids, Phase::Showdown, &result.awarded);
        self.event_store.append(hand_id, self.table.id, now_ms, EventKind::HandCompleted(summary))?;
        self.table.current_hand = None;
        BombPotScheduler::record_hand_completed(&mut self.bomb_pot_state, false, false);

        Ok(ShowdownOutcome { result })
    }

    fn build_hand_summary(
        &self,
        hand_id: HandId,
        now_ms: u64,
        went_to_showdown: bool,
        winner_ids: Vec<PlayerId>,
        final_phase: Phase,
        awarded: &HashMap<PlayerId, Chips>,
    ) -> HandSummary {
        let total_pot = self
            .event_store
            .get_events(hand_id)
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::PotAwarded { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum();
        let started_at_ms = self.table.current_hand.as_ref().map(|h| h.started_at_ms).unwrap_or(now_ms);
        let player_ids = self.table.current_hand.as_ref().map(|h| h.player_ids.clone()).unwrap_or_default();
        let player_results: HashMap<PlayerId, i64> = player_ids
            .iter()
            .map(|id| {
                let won = awarded.get(id).copied().unwrap_or(0);
                let committed = self.table.player(*id).map(|p| p.total_bet_this_hand).unwrap_or(0);
                (*id, won - committed)
            })
            .collect();
        HandSummary {
            hand_id,
            table_id: self.table.id,
            hand_number: self.table.hand_count,
            total_pot,
            duration_ms: now_ms.saturating_sub(started_at_ms),
            player_count: self.table.seats.len(),
            went_to_showdown,
            final_phase,
            winner_ids,
            player_results,
        }
    }

    fn current_round_view(&self, hand: &Hand) -> crate::betting::BettingRound {
        let mut round = crate::betting::BettingRound::new(self.table.config.big_blind);
        round.current_bet = hand.current_bet;
        round.min_raise = hand.min_raise;
        for player in self.table.seats.values() {
            round.contributions.insert(player.id, player.current_bet);
        }
        round
    }

    fn betting_round_complete(&self) -> bool {
        let Some(hand) = &self.table.current_hand else { return false };
        self.table
            .seats
            .values()
            .filter(|p| p.status == PlayerStatus::Active)
            .all(|p| p.current_bet == hand.current_bet && hand.acted_this_round.contains(&p.id))
    }

    fn compute_next_to_act(&self, from_seat: u8) -> Option<PlayerId> {
        let hand_bet = self.table.current_hand.as_ref().map(|h| h.current_bet).unwrap_or(0);
        let mut seat = from_seat;
        for _ in 0..self.table.config.max_seats {
            seat = self.table.next_occupied_seat(seat)?;
            if seat == from_seat {
                break;
            }
            if let Some(player) = self.table.seats.get(&seat) {
                if player.status == PlayerStatus::Active {
                    let needs_to_act = player.current_bet < hand_bet
                        || !self
                            .table
                            .current_hand
                            .as_ref()
                            .map(|h| h.acted_this_round.contains(&player.id))
                            .unwrap_or(false);
                    if needs_to_act {
                        return Some(player.id);
                    }
                }
            }
        }
        None
    }

    fn collect_bets_into_pots(&mut self) -> EngineResult<()> {
        let mut contributions = BTreeMap::new();
        let mut all_in = HashSet::new();
        let mut folded = HashSet::new();
        for player in self.table.seats.values() {
            contributions.insert(player.id, player.total_bet_this_hand);
            if player.status == PlayerStatus::AllIn {
                all_in.insert(player.id);
            }
            if player.status == PlayerStatus::Folded {
                folded.insert(player.id);
            }
        }
        let calc = PotManager::calculate_pots(&contributions, &all_in, &folded, &mut self.next_pot_id);
        for (player_id, amount) in calc.returned_overage {
            if let Some(player) = self.table.player_mut(player_id) {
                player.stack += amount;
            }
        }
        if let Some(hand) = self.table.current_hand.as_mut() {
            hand.pots = calc.pots;
        }
        Ok(())
    }

    fn advance_street(&mut self, now_ms: u64) -> EngineResult<()> {
        self.collect_bets_into_pots()?;
        for player in self.table.seats.values_mut() {
            player.reset_for_new_round();
        }

        let hand_id = self.table.current_hand.as_ref().unwrap().id;
        let big_blind = self.table.config.big_blind;
        let phase = self.table.current_hand.as_ref().unwrap().phase();

        let can_act = self.table.seats.values().filter(|p| p.status == PlayerStatus::Active).count();

        let next_phase = {
            let hand = self.table.current_hand.as_mut().unwrap();
            hand.state_machine().apply(Trigger::BettingComplete)?
        };

        match next_phase {
            Phase::Flop => {
                self.deck.burn()?;
                let cards = self.deck.deal(3)?;
                self.deal_community(cards, now_ms, hand_id, Phase::Flop)?;
            }
            Phase::Turn => {
                self.deck.burn()?;
                let cards = self.deck.deal(1)?;
                self.deal_community(cards, now_ms, hand_id, Phase::Turn)?;
            }
            Phase::River => {
                self.deck.burn()?;
                let cards = self.deck.deal(1)?;
                self.deal_community(cards, now_ms, hand_id, Phase::River)?;
            }
            Phase::Showdown => {}
            _ => {}
        }

        if let Some(hand) = self.table.current_hand.as_mut() {
            hand.reset_betting_round_state(big_blind);
        }

        if next_phase != Phase::Showdown && can_act <= 1 {
            // only one (or zero) players can still act: run out the
            // board and land on Showdown without further input.
            return self.run_out_remaining_streets(now_ms);
        }

        let button_seat = self.table.button_seat.unwrap_or(1);
        if let Some(hand) = self.table.current_hand.as_mut() {
            hand.current_player_id = if next_phase == Phase::Showdown {
                // No further action is possible; the caller must
                // invoke `execute_showdown` next.
                None
            } else {
                Self::first_occupied_left_of(&self.table, button_seat)
            };
        }
        let _ = phase;
        Ok(())
    }

    fn run_out_remaining_streets(&mut self, now_ms: u64) -> EngineResult<()> {
        loop {
            let phase = self.table.current_hand.as_ref().unwrap().phase();
            if phase == Phase::Showdown {
                if let Some(hand) = self.table.current_hand.as_mut() {
                    hand.current_player_id = None;
                }
                return Ok(());
            }
            let hand_id = self.table.current_hand.as_ref().unwrap().id;
            let next_phase = {
                let hand = self.table.current_hand.as_mut().unwrap();
                hand.state_machine().apply(Trigger::BettingComplete)?
            };
            match next_phase {
                Phase::Flop => {
                    self.deck.burn()?;
                    let cards = self.deck.deal(3)?;
                    self.deal_community(cards, now_ms, hand_id, Phase::Flop)?;
                }
                Phase::Turn => {
                    self.deck.burn()?;
                    let cards = self.deck.deal(1)?;
                    self.deal_community(cards, now_ms, hand_id, Phase::Turn)?;
                }
                Phase::River => {
                    self.deck.burn()?;
                    let cards = self.deck.deal(1)?;
                    self.deal_community(cards, now_ms, hand_id, Phase::River)?;
                }
                Phase::Showdown => {
                    if let Some(hand) = self.table.current_hand.as_mut() {
                        hand.current_player_id = None;
                    }
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
    }

    fn deal_community(&mut self, cards: Vec<Card>, now_ms: u64, hand_id: HandId, phase: Phase) -> EngineResult<()> {
        let is_double_board = self.table.current_hand.as_ref().unwrap().is_double_board;
        if is_double_board {
            self.deck.burn()?;
            let second = self.deck.deal(cards.len())?;
            if let Some(hand) = self.table.current_hand.as_mut() {
                hand.second_board.get_or_insert_with(Vec::new).extend(second);
            }
        }
        if let Some(hand) = self.table.current_hand.as_mut() {
            hand.community_cards.extend(cards);
        }
        self.event_store.append(hand_id, self.table.id, now_ms, EventKind::CommunityCardsDealt { phase })?;
        Ok(())
    }

    fn rotate_button(&self, active_seats: &[u8]) -> u8 {
        match self.table.button_seat {
            Some(current) => self.table.next_occupied_seat(current).unwrap_or(active_seats[0]),
            None => active_seats[0],
        }
    }

    /// Heads-up: button is SB, other player is BB. Otherwise SB is
    /// left of button, BB next.
    fn blind_seats(&self, active_seats: &[u8], button_seat: u8) -> (u8, u8) {
        if active_seats.len() == 2 {
            let other = active_seats.iter().find(|s| **s != button_seat).copied().unwrap_or(button_seat);
            (button_seat, other)
        } else {
            let sb = self.table.next_occupied_seat(button_seat).unwrap_or(button_seat);
            let bb = self.table.next_occupied_seat(sb).unwrap_or(sb);
            (sb, bb)
        }
    }

    fn first_to_act_preflop(&self, bb_seat: u8, player_count: usize) -> Option<PlayerId> {
        if player_count == 2 {
            // heads-up preflop: button/SB acts first
            return self.table.button_seat.and_then(|s| self.table.seats.get(&s)).map(|p| p.id);
        }
        let seat = self.table.next_occupied_seat(bb_seat)?;
        self.table.seats.get(&seat).map(|p| p.id)
    }

    fn first_to_act_postflop(&self, button_seat: u8) -> Option<PlayerId> {
        Self::first_occupied_left_of(&self.table, button_seat)
    }

    /// First Active (still able to act) player strictly left of
    /// `from_seat`, skipping folded/all-in/empty seats. Used to pick
    /// the opening actor of a fresh street, where every remaining
    /// Active player's contribution is 0 and none have acted yet, so
    /// no further eligibility check is needed.
    fn first_occupied_left_of(table: &Table, from_seat: u8) -> Option<PlayerId> {
        let mut seat = from_seat;
        for _ in 0..table.config.max_seats {
            seat = table.next_occupied_seat(seat)?;
            if seat == from_seat {
                return None;
            }
            if let Some(player) = table.seats.get(&seat) {
                if player.status == crate::player::PlayerStatus::Active {
                    return Some(player.id);
                }
            }
        }
        None
    }

    fn deal_hole_cards(&mut self, active_seats: &[u8], button_seat: u8) -> EngineResult<()> {
        let mut order = Vec::new();
        let mut seat = button_seat;
        for _ in 0..active_seats.len() {
            seat = self.table.next_occupied_seat(seat).unwrap_or(seat);
            order.push(seat);
        }
        for _ in 0..2 {
            for seat in &order {
                let card = self.deck.deal_one()?;
                if let Some(player) = self.table.seats.get_mut(seat) {
                    player.hole_cards.push(card);
                }
            }
        }
        Ok(())
    }
}

pub struct ShowdownOutcome {
    pub result: crate::showdown::ShowdownResult,
}

/// A read-only copy of a table's state, handed to readers (the
/// hosting layer's broadcaster) without letting them touch the
/// actor's authoritative copy (§5 "readers may observe snapshots").
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub table: Table,
    pub shown_cards: HashMap<PlayerId, Vec<Card>>,
}

/// Commands accepted on a table's single-writer inbox. Mirrors the
/// teacher's `gameroom::Event` (`Play(Action)`) generalized into the
/// explicit entrypoints §4.8 names, plus a reply channel per command
/// since callers (the hosting layer) need the outcome synchronously.
pub enum Command {
    StartNewHand { now_ms: u64, reply: oneshot::Sender<EngineResult<()>> },
    StartBombPot { now_ms: u64, reply: oneshot::Sender<EngineResult<()>> },
    ExecutePlayerAction { player_id: PlayerId, intent: ActionIntent, now_ms: u64, reply: oneshot::Sender<EngineResult<ActionOutcome>> },
    ForceTimeoutFold { player_id: PlayerId, time_bank_consumed: u32, now_ms: u64, reply: oneshot::Sender<EngineResult<ActionOutcome>> },
    ExecuteShowdown { now_ms: u64, reply: oneshot::Sender<EngineResult<ShowdownOutcome>> },
    SeatPlayer { seat: u8, player: crate::player::Player, reply: oneshot::Sender<()> },
    RemovePlayer { player_id: PlayerId, reply: oneshot::Sender<Option<crate::player::Player>> },
    GetAvailableActions { player_id: PlayerId, reply: oneshot::Sender<Vec<ActionKind>> },
    Snapshot { reply: oneshot::Sender<TableSnapshot> },
}

/// Drains `Command`s for exactly one table, serializing every
/// mutation through this task the way `gameroom::Room::run` serializes
/// a single game through one loop.
pub struct TableActor {
    state: TableState,
    inbox: mpsc::UnboundedReceiver<Command>,
}

impl TableActor {
    pub fn spawn(table: Table) -> mpsc::UnboundedSender<Command> {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = Self { state: TableState::new(table), inbox: rx };
        tokio::spawn(actor.run());
        tx
    }

    async fn run(mut self) {
        while let Some(command) = self.inbox.recv().await {
            match command {
                Command::StartNewHand { now_ms, reply } => {
                    let _ = reply.send(self.state.start_next_hand(now_ms));
                }
                Command::StartBombPot { now_ms, reply } => {
                    let bomb = self.state.table.config.bomb_pot;
                    let result = match bomb {
                        Some(bomb) => self.state.start_bomb_pot(&bomb, now_ms),
                        None => Err(EngineError::InvalidConfig { reason: "table has no bomb pot configured".into() }),
                    };
                    let _ = reply.send(result);
                }
                Command::ExecutePlayerAction { player_id, intent, now_ms, reply } => {
                    let _ = reply.send(self.state.execute_player_action(player_id, intent, now_ms));
                }
                Command::ForceTimeoutFold { player_id, time_bank_consumed, now_ms, reply } => {
                    let _ = reply.send(self.state.force_timeout_fold(player_id, time_bank_consumed, now_ms));
                }
                Command::ExecuteShowdown { now_ms, reply } => {
                    let _ = reply.send(self.state.execute_showdown(now_ms));
                }
                Command::SeatPlayer { seat, player, reply } => {
                    self.state.table.seat_player(seat, player);
                    let _ = reply.send(());
                }
                Command::RemovePlayer { player_id, reply } => {
                    let _ = reply.send(self.state.table.remove_player(player_id));
                }
                Command::GetAvailableActions { player_id, reply } => {
                    let actions = match (self.state.table.player(player_id), &self.state.table.current_hand) {
                        (Some(p), Some(hand)) => {
                            let round = self.state.current_round_view(hand);
                            ActionValidator::legal_actions(p, &round)
                        }
                        _ => Vec::new(),
                    };
                    let _ = reply.send(actions);
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(TableSnapshot {
                        table: self.state.table.clone(),
                        shown_cards: self.state.shown_cards.clone(),
                    });
                }
            }
        }
    }
}

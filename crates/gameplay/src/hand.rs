use super::action::Action;
use super::error::TableError;
use super::event::TableEvent;
use super::phase::Phase;
use super::pots;
use super::pots::Contribution;
use super::pots::PotLayer;
use super::showdown::BoardOutcome;
use super::showdown::Reveal;
use super::showdown::Showdown;
use super::table::Table;
use rvb_core::Chips;
use rvb_core::MIN_PLAYERS;
use rvb_core::Position;
use rvb_core::SessionId;
use rvb_cards::Board;
use rvb_cards::Card;
use rvb_cards::Deck;
use rvb_cards::Hand;
use rvb_cards::Hole;
use rvb_cards::Strength;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;

// ============================================================================
// Hand lifecycle
// ============================================================================
impl Table {
    /// Starts a hand from WAITING if the room is ready. Safe to call after
    /// any command; does nothing unless the game is running, unpaused, and
    /// two or more seated players have chips.
    pub fn poll_begin(&mut self) -> Vec<TableEvent> {
        let mut events = Vec::new();
        if !self.running() || self.paused() || self.phase != Phase::Waiting {
            return events;
        }
        self.vacate_busted(&mut events);
        if self.eligible_count() < MIN_PLAYERS {
            return events;
        }
        self.begin_hand(&mut events);
        events
    }

    /// The settle timer fired: leave SHOWDOWN for the next hand, or back
    /// to WAITING when the table can no longer field one.
    pub fn next_hand(&mut self) -> Vec<TableEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Showdown {
            return events;
        }
        self.showdown = None;
        self.vacate_busted(&mut events);
        if !self.running() || self.paused() || self.eligible_count() < MIN_PLAYERS {
            self.clear_hand_state();
            return events;
        }
        self.begin_hand(&mut events);
        events
    }

    /// True once a hand has settled and the next-hand timer should run.
    pub fn awaiting_settle(&self) -> bool {
        self.phase == Phase::Showdown
    }

    /// Seats whose bankroll hit zero bust out before the next hand: the
    /// seat opens up and the player stays on as a spectator.
    fn vacate_busted(&mut self, events: &mut Vec<TableEvent>) {
        let busted = self
            .players()
            .iter()
            .filter(|p| p.seat().is_some() && p.bankroll() == 0)
            .map(|p| (p.seat().expect("filtered on seat"), p.session()))
            .collect::<Vec<(Position, SessionId)>>();
        if busted.is_empty() {
            return;
        }
        for (seat, session) in busted.iter() {
            self.clear_seat(*seat, *session);
            log::info!("seat {} busted out", seat);
        }
        events.push(TableEvent::Busted { seats: busted });
    }

    fn begin_hand(&mut self, events: &mut Vec<TableEvent>) {
        debug_assert!(self.eligible_count() >= MIN_PLAYERS);
        // fresh per-hand state
        self.board = Board::empty();
        self.second = None;
        self.pot = 0;
        self.rit = Default::default();
        self.showdown = None;
        self.ghosts.clear();
        self.acted.clear();
        self.opened.clear();
        self.capped = false;
        for player in self.players_mut() {
            player.reset_for_hand();
        }
        self.hand += 1;
        // rotate the button to the next occupied seat clockwise
        self.dealer = self
            .next_occupied(self.dealer)
            .expect("eligible players are seated");
        // heads-up: the dealer posts the small blind and acts first preflop
        let order = self.deal_order();
        if order.len() == 2 {
            self.sb = self.dealer;
            self.bb = order[0];
        } else {
            self.sb = order[0];
            self.bb = order[1];
        }
        self.deck = self.build_deck(&order);
        self.phase = Phase::Preflop;
        events.push(TableEvent::HandStarted {
            hand: self.hand,
            dealer: self.dealer,
            small: self.sb,
            big: self.bb,
        });
        // post blinds; short stacks post what they have and are all-in
        let (small, big) = self.blinds();
        let posted = self.commit_at(self.sb, small);
        events.push(TableEvent::Posted {
            seat: self.sb,
            amount: posted,
        });
        let posted = self.commit_at(self.bb, big);
        events.push(TableEvent::Posted {
            seat: self.bb,
            amount: posted,
        });
        // the big blind is owed even when posted short; the BB seat is the
        // opening aggressor but has NOT acted: the option is theirs
        self.current_bet = big;
        self.min_raise = big;
        self.aggressor = Some(self.bb);
        // two hole cards each, one at a time, starting left of the dealer
        let mut first = Vec::with_capacity(order.len());
        for _ in order.iter() {
            first.push(self.deck.draw().expect("fresh deck"));
        }
        for (i, seat) in order.iter().enumerate() {
            let second = self.deck.draw().expect("fresh deck");
            let hole = Hole::from((first[i], second));
            self.deal_to(*seat, hole);
        }
        log::debug!(
            "hand {} started: dealer {} sb {} bb {}",
            self.hand,
            self.dealer,
            self.sb,
            self.bb
        );
        // first to act preflop is left of the BB (the dealer, heads-up)
        self.turn = self.next_can_act(self.bb);
        if self.can_act_count() == 0 {
            // both blinds went all-in from the forced posts
            self.turn = None;
            self.offer_rit(events);
        }
    }

    /// Dealt-in seats in clockwise deal order, starting left of the dealer.
    fn deal_order(&self) -> Vec<Position> {
        let mut order = Vec::new();
        let mut seat = self
            .next_occupied(self.dealer)
            .expect("at least two seats occupied");
        loop {
            order.push(seat);
            seat = self.next_occupied(seat).expect("seat ring is nonempty");
            if seat == order[0] {
                return order;
            }
        }
    }

    /// A fresh shuffled deck, unless a planted deck or a rigged fixture is
    /// pending. Rigging stacks the deck so the fixture's cards land on the
    /// rigged player's draws and the single board.
    fn build_deck(&mut self, order: &[Position]) -> Deck {
        if let Some(deck) = self.planted.take() {
            return deck;
        }
        let Some((session, fixture)) = self.rigged.take() else {
            return Deck::shuffled();
        };
        let Some(target) = self.seat_of(session).filter(|s| order.contains(s)) else {
            log::warn!("rigged player is not dealt in; dealing honestly");
            return Deck::shuffled();
        };
        let n = order.len();
        let k = order.iter().position(|&s| s == target).expect("target dealt in");
        let hole = fixture.hole();
        let board = fixture.board();
        let mut plants = HashMap::new();
        plants.insert(k, hole[0]);
        plants.insert(n + k, hole[1]);
        for (i, card) in board.iter().enumerate().take(3) {
            plants.insert(2 * n + 1 + i, *card); // flop, after one burn
        }
        plants.insert(2 * n + 5, board[3]); // turn, after another burn
        plants.insert(2 * n + 7, board[4]); // river
        let reserved = Hand::from(hole.into_iter().chain(board).collect::<Vec<Card>>());
        let mut filler = Vec::<Card>::from(reserved.complement());
        use rand::seq::SliceRandom;
        filler.shuffle(&mut rand::rng());
        let top = (0..2 * n + 8)
            .map(|i| {
                plants
                    .get(&i)
                    .copied()
                    .unwrap_or_else(|| filler.pop().expect("45 fillers for at most 28 draws"))
            })
            .collect::<Vec<Card>>();
        Deck::stacked(top)
    }
}

// ============================================================================
// Betting
// ============================================================================
impl Table {
    /// Validates and applies one betting action from the seat whose turn
    /// it is. Every rule violation returns a typed error with state
    /// untouched.
    pub fn apply(
        &mut self,
        session: SessionId,
        action: Action,
    ) -> Result<Vec<TableEvent>, TableError> {
        if !self.phase.is_betting() {
            return Err(TableError::NoBettingRound);
        }
        if self.paused() {
            return Err(TableError::GamePaused);
        }
        let seat = self.seat_of(session).ok_or(TableError::NotSeated)?;
        if self.turn != Some(seat) {
            return Err(TableError::NotYourTurn);
        }
        let idx = self.idx(session).expect("seated player is present");
        debug_assert!(self.players()[idx].can_act());
        let owed = self.to_call(seat);
        let bankroll = self.players()[idx].bankroll();
        let paid = match action {
            Action::Fold => {
                self.fold_at(idx);
                0
            }
            Action::Check => {
                if owed > 0 {
                    return Err(TableError::CannotCheck(owed));
                }
                0
            }
            Action::Call => {
                if owed == 0 {
                    return Err(TableError::NothingToCall);
                }
                self.commit_at(seat, owed)
            }
            Action::Raise(increment) => {
                if increment == 0 {
                    return Err(TableError::MinRaise(self.min_raise));
                }
                if bankroll <= owed {
                    // cannot even cover the call: an all-in call, not a raise
                    self.commit_at(seat, bankroll)
                } else {
                    let target = owed + increment;
                    if !self.may_raise(seat) {
                        return Err(TableError::BettingCapped);
                    }
                    if increment < self.min_raise && target < bankroll {
                        return Err(TableError::MinRaise(self.min_raise));
                    }
                    self.commit_at(seat, target.min(bankroll))
                }
            }
            Action::AllIn => {
                debug_assert!(bankroll > 0, "can_act player has chips");
                let total = self.players()[idx].round_bet() + bankroll;
                if total > self.current_bet && !self.may_raise(seat) {
                    return Err(TableError::BettingCapped);
                }
                self.commit_at(seat, bankroll)
            }
        };
        // aggression bookkeeping
        let round_bet = self.players()[idx].round_bet();
        let raise_by = round_bet.saturating_sub(self.current_bet);
        if raise_by > 0 && raise_by >= self.min_raise {
            // full raise: reopens the round and resets raise rights
            self.current_bet = round_bet;
            self.min_raise = raise_by;
            self.acted.clear();
            self.aggressor = Some(seat);
            self.capped = false;
        } else {
            if raise_by > 0 {
                self.current_bet = round_bet;
            }
            if self.players()[idx].all_in() && raise_by < self.min_raise {
                // all-in for less than a full raise: the street is capped
                // for seats that already acted
                self.capped = true;
            }
        }
        self.acted.insert(seat);
        self.opened.insert(seat);
        let mut events = vec![TableEvent::Acted {
            seat,
            action,
            paid,
            pot: self.pot,
        }];
        self.settle_action(seat, &mut events);
        Ok(events)
    }

    /// Folds a seat out of turn (leave-seat, disconnect). May end the
    /// hand, resolve a pending run-it-twice vote, or advance the turn.
    pub(crate) fn force_fold(&mut self, seat: Position) -> Vec<TableEvent> {
        let mut events = Vec::new();
        let Some(session) = self.seat_holder(seat) else {
            return events;
        };
        let Some(idx) = self.idx(session) else {
            return events;
        };
        if !self.players()[idx].live() || !self.phase.is_betting() {
            return events;
        }
        self.fold_at(idx);
        self.acted.remove(&seat);
        events.push(TableEvent::Acted {
            seat,
            action: Action::Fold,
            paid: 0,
            pot: self.pot,
        });
        if self.rit().open() {
            self.rit.excuse(seat);
            if let Some(accepted) = self.rit.tally() {
                events.push(TableEvent::RitDecided { accepted });
                self.settle_rit(accepted);
            }
        }
        if self.live_count() == 1 {
            self.award_walkover(&mut events);
        } else if self.turn == Some(seat) {
            if self.round_complete() {
                self.close_street(&mut events);
            } else {
                self.turn = self.next_can_act(seat);
            }
        }
        events
    }

    fn settle_action(&mut self, seat: Position, events: &mut Vec<TableEvent>) {
        if self.live_count() == 1 {
            self.award_walkover(events);
        } else if self.round_complete() {
            self.close_street(events);
        } else {
            self.turn = self.next_can_act(seat);
            debug_assert!(self.turn.is_some(), "incomplete round has a next actor");
        }
    }

    /// The round is done when every live seat with chips has acted since
    /// the last full raise and matched the current bet. The big blind is
    /// not in the acted set after posting, so a limped pot still comes
    /// back around with the option to check or raise.
    fn round_complete(&self) -> bool {
        self.players()
            .iter()
            .filter(|p| p.can_act())
            .all(|p| {
                let seat = p.seat().expect("can_act player is seated");
                self.acted.contains(&seat) && p.round_bet() == self.current_bet
            })
    }

    fn close_street(&mut self, events: &mut Vec<TableEvent>) {
        self.turn = None;
        if self.phase == Phase::River {
            self.resolve_showdown(events);
            return;
        }
        if self.can_act_count() == 0 && !self.rit().offered() {
            self.offer_rit(events);
            return;
        }
        if self.can_act_count() >= 2 {
            self.deal_street(events);
        }
        // otherwise the board runs out on delayed ticks
    }
}

// ============================================================================
// Dealing
// ============================================================================
impl Table {
    /// Streets that deal without awaiting anyone: betting is over but the
    /// board is short, and no run-it-twice vote is pending.
    pub fn pending_auto_street(&self) -> bool {
        self.phase.is_betting()
            && self.turn.is_none()
            && !self.rit().open()
            && self.showdown().is_none()
            && !self.paused()
    }

    /// The street timer fired: deal the next street if one is still due.
    pub fn auto_deal(&mut self) -> Vec<TableEvent> {
        let mut events = Vec::new();
        if self.pending_auto_street() {
            self.deal_street(&mut events);
        }
        events
    }

    fn deal_street(&mut self, events: &mut Vec<TableEvent>) {
        debug_assert!(self.phase.is_betting() && self.phase != Phase::River);
        let phase = self.phase.next_street();
        self.phase = phase;
        for player in self.players_mut() {
            player.reset_for_street();
        }
        self.current_bet = 0;
        self.min_raise = self.blinds().1;
        self.acted.clear();
        self.opened.clear();
        self.capped = false;
        self.deck.burn();
        let cards = self.deck.deal(phase.n_revealed());
        self.board.add(cards);
        let second = match self.rit().active() {
            true => {
                self.deck.burn();
                let extra = self.deck.deal(phase.n_revealed());
                self.second
                    .as_mut()
                    .expect("second board exists while running twice")
                    .add(extra);
                Some(extra)
            }
            false => None,
        };
        log::debug!("dealt {}: {}", phase, cards);
        events.push(TableEvent::StreetDealt {
            phase,
            cards,
            second,
        });
        if self.can_act_count() >= 2 {
            // first to act is the first live seat with chips left of the
            // button (the SB seat in a ring game, the non-dealer heads-up)
            self.turn = self.next_can_act(self.dealer);
        } else if phase == Phase::River {
            self.resolve_showdown(events);
        }
    }
}

// ============================================================================
// Run it twice
// ============================================================================
impl Table {
    fn offer_rit(&mut self, events: &mut Vec<TableEvent>) {
        let voters = self.live_seats();
        debug_assert!(voters.len() >= 2);
        self.rit.offer(voters.iter().copied());
        log::debug!("run-it-twice offered to {:?}", voters);
        events.push(TableEvent::RitOffered { voters });
    }

    pub fn vote_rit(
        &mut self,
        session: SessionId,
        accept: bool,
    ) -> Result<Vec<TableEvent>, TableError> {
        if !self.rit().open() {
            return Err(TableError::NoRunItTwiceOffer);
        }
        let seat = self.seat_of(session).ok_or(TableError::NotEligibleToVote)?;
        if !self.rit().voters().any(|v| v == seat) {
            return Err(TableError::NotEligibleToVote);
        }
        if self.rit().vote_of(seat).is_some() {
            return Err(TableError::AlreadyVoted);
        }
        self.rit.vote(seat, accept);
        let mut events = vec![TableEvent::RitVoted { seat, accept }];
        if let Some(accepted) = self.rit.tally() {
            events.push(TableEvent::RitDecided { accepted });
            self.settle_rit(accepted);
        }
        Ok(events)
    }

    /// The voting window elapsed: missing votes decline, one board deals.
    pub fn expire_rit(&mut self) -> Vec<TableEvent> {
        match self.rit.expire() {
            Some(accepted) => {
                self.settle_rit(accepted);
                vec![TableEvent::RitDecided { accepted }]
            }
            None => Vec::new(),
        }
    }

    fn settle_rit(&mut self, accepted: bool) {
        if accepted {
            // the second board inherits everything dealt before activation
            self.second = Some(self.board);
        }
        log::debug!("run-it-twice {}", if accepted { "accepted" } else { "declined" });
    }
}

// ============================================================================
// Resolution
// ============================================================================
impl Table {
    fn award_walkover(&mut self, events: &mut Vec<TableEvent>) {
        let seat = *self
            .live_seats()
            .first()
            .expect("exactly one live player remains");
        let amount = self.pot;
        self.award_at(seat, amount);
        self.pot = 0;
        self.turn = None;
        self.phase = Phase::Showdown;
        self.showdown = Some(Showdown::walkover(seat, amount));
        log::debug!("seat {} wins {} uncontested", seat, amount);
        events.push(TableEvent::HandWon { seat, amount });
    }

    fn resolve_showdown(&mut self, events: &mut Vec<TableEvent>) {
        self.turn = None;
        let mut contributions = self
            .players()
            .iter()
            .filter(|p| p.hand_bet() > 0)
            .map(|p| Contribution {
                seat: p.seat(),
                amount: p.hand_bet(),
                live: p.live(),
            })
            .collect::<Vec<Contribution>>();
        contributions.extend(self.ghosts.iter().map(|&amount| Contribution {
            seat: None,
            amount,
            live: false,
        }));
        let pots = pots::layers(&contributions);
        debug_assert!(
            pots.iter().map(|p| p.amount).sum::<Chips>() == self.pot,
            "pot layers must account for every chip"
        );
        let boards = std::iter::once(self.board)
            .chain(self.second)
            .collect::<Vec<Board>>();
        let twice = boards.len() == 2;
        let mut outcomes = Vec::new();
        let mut totals: BTreeMap<Position, Chips> = BTreeMap::new();
        let mut first_strengths: BTreeMap<Position, Strength> = BTreeMap::new();
        for (which, board) in boards.iter().enumerate() {
            let strengths = self
                .players()
                .iter()
                .filter(|p| p.live())
                .map(|p| {
                    let hole = Hand::from(p.hole().expect("live player has cards"));
                    let seat = p.seat().expect("live player is seated");
                    (seat, Strength::from(Hand::add(hole, Hand::from(*board))))
                })
                .collect::<BTreeMap<Position, Strength>>();
            if which == 0 {
                first_strengths = strengths.clone();
            }
            let mut results = Vec::new();
            for layer in pots.iter() {
                // each layer halves across the boards, odd chip to board one
                let amount = match (twice, which) {
                    (false, _) => layer.amount,
                    (true, 0) => layer.amount / 2 + layer.amount % 2,
                    (true, _) => layer.amount / 2,
                };
                if amount == 0 {
                    continue;
                }
                let half = PotLayer {
                    amount,
                    eligible: layer.eligible.clone(),
                };
                let result = pots::award(&half, &strengths, self.sb, self.n_seats());
                for (seat, chips) in pots::payouts(&result) {
                    *totals.entry(seat).or_default() += chips;
                }
                results.push(result);
            }
            outcomes.push(BoardOutcome {
                board: *board,
                pots: results,
            });
        }
        for (&seat, &chips) in totals.iter() {
            self.award_at(seat, chips);
        }
        debug_assert!(
            totals.values().sum::<Chips>() == self.pot,
            "awards must equal the pot"
        );
        self.pot = 0;
        let winners = totals.keys().copied().collect::<BTreeSet<Position>>();
        let reveals = self
            .players()
            .iter()
            .filter(|p| p.live())
            .map(|p| {
                let seat = p.seat().expect("live player is seated");
                let must_show = winners.contains(&seat) || self.aggressor == Some(seat);
                Reveal {
                    seat,
                    session: p.session(),
                    hole: p.hole().expect("live player has cards"),
                    must_show,
                    shown: must_show,
                    description: first_strengths
                        .get(&seat)
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                }
            })
            .collect::<Vec<Reveal>>();
        self.phase = Phase::Showdown;
        self.showdown = Some(Showdown {
            boards: outcomes,
            payouts: totals.into_iter().collect(),
            reveals,
            walked: false,
        });
        events.push(TableEvent::ShowdownStarted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableConfig;
    use crate::rig::Fixture;

    /// Seats players at the given (seat, stack) pairs under a spectator
    /// host, starts the game, and deals the first hand.
    fn game(stacks: &[(Position, Chips)]) -> (Table, SessionId) {
        game_with_deck(stacks, None)
    }

    fn game_with_deck(stacks: &[(Position, Chips)], deck: Option<Deck>) -> (Table, SessionId) {
        let founder = SessionId::default();
        let mut table = Table::new(TableConfig {
            seats: 8,
            small: 10,
            big: 20,
            founder,
        });
        table.join(founder, "host".into()).unwrap();
        for (seat, stack) in stacks {
            let session = SessionId::default();
            table.join(session, format!("s{}", seat)).unwrap();
            // buy in at the floor, then shrink to the scripted stack: mid-
            // session stacks run below the entry minimum all the time
            let (id, _) = table
                .request_seat(session, *seat, (*stack).max(200))
                .unwrap();
            table.approve_seat(founder, id.unwrap()).unwrap();
            if *stack < 200 {
                for player in table.players_mut() {
                    if player.seat() == Some(*seat) {
                        player.sit(*seat, *stack, false);
                    }
                }
            }
        }
        table.planted = deck;
        table.start_game(founder).unwrap();
        let events = table.poll_begin();
        assert!(matches!(events[0], TableEvent::HandStarted { .. }));
        (table, founder)
    }

    fn sid(table: &Table, seat: Position) -> SessionId {
        table.seat_holder(seat).expect("seat occupied")
    }
    fn bankroll(table: &Table, seat: Position) -> Chips {
        table.player_at(seat).expect("seat occupied").bankroll()
    }
    fn act(table: &mut Table, seat: Position, action: Action) -> Vec<TableEvent> {
        let session = sid(table, seat);
        table.apply(session, action).expect("legal action")
    }
    /// Sum of all bankrolls plus the pot: must never change mid-hand.
    fn chips_in_play(table: &Table) -> Chips {
        table.players().iter().map(|p| p.bankroll()).sum::<Chips>() + table.pot()
    }

    #[test]
    fn heads_up_preflop_fold() {
        let (mut table, _) = game(&[(0, 1000), (1, 1000)]);
        // heads-up: the dealer posts the small blind and acts first
        assert_eq!(table.dealer(), 0);
        assert_eq!(table.small_blind_seat(), 0);
        assert_eq!(table.big_blind_seat(), 1);
        assert_eq!(table.turn(), Some(0));
        assert_eq!(table.pot(), 30);
        let events = act(&mut table, 0, Action::Fold);
        assert!(events
            .iter()
            .any(|e| matches!(e, TableEvent::HandWon { seat: 1, amount: 30 })));
        assert_eq!(bankroll(&table, 0), 990);
        assert_eq!(bankroll(&table, 1), 1010);
        assert_eq!(table.phase(), Phase::Showdown);
        let showdown = table.showdown().unwrap();
        assert!(showdown.walked);
        assert!(showdown.reveals.is_empty(), "no cards revealed on a walk");
    }

    #[test]
    fn three_way_min_raise_reopens_action() {
        let (mut table, _) = game(&[(0, 1000), (1, 1000), (2, 1000)]);
        assert_eq!(table.dealer(), 0);
        assert_eq!(table.small_blind_seat(), 1);
        assert_eq!(table.big_blind_seat(), 2);
        assert_eq!(table.turn(), Some(0));
        act(&mut table, 0, Action::Raise(20)); // to 40
        act(&mut table, 1, Action::Call);
        act(&mut table, 2, Action::Raise(40)); // to 80: full raise, reopens
        assert_eq!(table.current_bet(), 80);
        assert_eq!(table.min_raise(), 40);
        assert_eq!(table.turn(), Some(0), "seat 0 must act again");
        act(&mut table, 0, Action::Call); // 40 more
        assert_eq!(table.phase(), Phase::Preflop, "seat 1 still owes");
        act(&mut table, 1, Action::Call); // 40 more
        assert_eq!(table.phase(), Phase::Flop);
        assert_eq!(table.pot(), 240);
        // first to act postflop: first live seat clockwise from the button
        assert_eq!(table.turn(), Some(1));
    }

    #[test]
    fn big_blind_keeps_the_option_after_limps() {
        let (mut table, _) = game(&[(0, 1000), (1, 1000), (2, 1000)]);
        act(&mut table, 0, Action::Call);
        act(&mut table, 1, Action::Call); // sb completes
        // limped pot returns to the big blind with nothing to call
        assert_eq!(table.turn(), Some(2));
        assert_eq!(table.to_call(2), 0);
        let options = table.options(sid(&table, 2));
        assert!(options.contains(&"check"));
        assert!(options.contains(&"raise"));
        // and the option to raise is real: it reopens the round
        act(&mut table, 2, Action::Raise(40));
        assert_eq!(table.turn(), Some(0));
        assert_eq!(table.phase(), Phase::Preflop);
    }

    #[test]
    fn short_all_in_does_not_reopen() {
        // dealer 2, sb 3 (1000), bb 4 (35)
        let (mut table, _) = game(&[(2, 1000), (3, 1000), (4, 35)]);
        assert_eq!(table.dealer(), 2);
        assert_eq!(table.small_blind_seat(), 3);
        assert_eq!(table.big_blind_seat(), 4);
        assert_eq!(bankroll(&table, 4), 15); // posted the 20 blind
        act(&mut table, 2, Action::Call); // 20
        act(&mut table, 3, Action::Raise(40)); // to 60, full raise
        assert_eq!(table.min_raise(), 40);
        act(&mut table, 4, Action::AllIn); // 15 more: all-in under the bet
        assert!(table.player_at(4).unwrap().all_in());
        assert_eq!(table.current_bet(), 60, "a short all-in moves no bet line");
        assert_eq!(table.min_raise(), 40, "min-raise unchanged");
        // the round is not reopened: seat 2 may only call or fold
        let s2 = sid(&table, 2);
        assert_eq!(table.apply(s2, Action::Raise(40)), Err(TableError::BettingCapped));
        assert_eq!(table.apply(s2, Action::AllIn), Err(TableError::BettingCapped));
        act(&mut table, 2, Action::Call); // 40 more
        assert_eq!(table.phase(), Phase::Flop);
        // main pot 105 three ways plus a 50 side pot between seats 2 and 3
        assert_eq!(table.pot(), 155);
        assert_eq!(table.min_raise(), 20, "fresh street resets the min-raise");
        assert_eq!(table.turn(), Some(3));
    }

    #[test]
    fn split_pot_on_identical_two_pair() {
        // board As Ad 5c 5h 9s; seat 0 holds Kc Qd, seat 1 holds Ks Jd:
        // both play aces and fives with a king kicker
        let deck = Deck::stacked(
            "Ks Kc Jd Qd 2c As Ad 5c 2d 5h 2h 9s"
                .split_whitespace()
                .map(|c| Card::try_from(c).unwrap())
                .collect(),
        );
        let (mut table, _) = game_with_deck(&[(0, 1000), (1, 1000)], Some(deck));
        act(&mut table, 0, Action::Raise(180)); // to 200
        act(&mut table, 1, Action::Call);
        assert_eq!(table.pot(), 400);
        for _ in 0..3 {
            act(&mut table, 1, Action::Check);
            act(&mut table, 0, Action::Check);
        }
        assert_eq!(table.phase(), Phase::Showdown);
        let showdown = table.showdown().unwrap();
        assert_eq!(showdown.payouts.len(), 2);
        assert!(showdown.payouts.iter().all(|(_, chips)| *chips == 200));
        assert_eq!(bankroll(&table, 0), 1000);
        assert_eq!(bankroll(&table, 1), 1000);
    }

    #[test]
    fn side_pot_goes_to_best_eligible_hand() {
        // seat 1 is all-in short with the best hand: they win only the
        // main pot, the side pot goes to the best of the deep stacks
        let deck = Deck::stacked(
            "As Qs Kd Ah Qh Kc Tc 2c 7d 9h Td 3s Th Jc"
                .split_whitespace()
                .map(|c| Card::try_from(c).unwrap())
                .collect(),
        );
        let (mut table, _) = game_with_deck(&[(0, 500), (1, 100), (2, 1000)], Some(deck));
        let start = chips_in_play(&table);
        act(&mut table, 0, Action::Raise(80)); // to 100
        act(&mut table, 1, Action::AllIn); // 90 more: exactly calls
        act(&mut table, 2, Action::Call);
        assert_eq!(table.phase(), Phase::Flop);
        assert_eq!(table.pot(), 300);
        act(&mut table, 2, Action::Raise(200));
        act(&mut table, 0, Action::Call);
        assert_eq!(table.phase(), Phase::Turn);
        act(&mut table, 2, Action::Check);
        act(&mut table, 0, Action::Check);
        act(&mut table, 2, Action::Check);
        act(&mut table, 0, Action::Check);
        assert_eq!(table.phase(), Phase::Showdown);
        let showdown = table.showdown().unwrap();
        // contributions 300/100/300: main 300 to seat 1, side 400 to seat 0
        assert!(showdown.payouts.contains(&(1, 300)));
        assert!(showdown.payouts.contains(&(0, 400)));
        assert_eq!(bankroll(&table, 0), 600);
        assert_eq!(bankroll(&table, 1), 300);
        assert_eq!(bankroll(&table, 2), 700);
        assert_eq!(chips_in_play(&table), start);
        // winners and the flop aggressor all must show
        assert!(showdown.reveals.iter().all(|r| r.must_show));
    }

    #[test]
    fn run_it_twice_chops_when_boards_split() {
        let deck = Deck::stacked(
            "Kd As Kc Ah Qc 2c 7d 9h Qd Ks 4s 8d Qh 3c Qs 5h Tc Jh Td 6d"
                .split_whitespace()
                .map(|c| Card::try_from(c).unwrap())
                .collect(),
        );
        let (mut table, _) = game_with_deck(&[(0, 1000), (1, 1000)], Some(deck));
        act(&mut table, 0, Action::AllIn);
        let events = act(&mut table, 1, Action::Call);
        assert!(events.iter().any(|e| matches!(e, TableEvent::RitOffered { .. })));
        assert!(table.rit().open());
        table.vote_rit(sid(&table, 0), true).unwrap();
        let events = table.vote_rit(sid(&table, 1), true).unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, TableEvent::RitDecided { accepted: true })));
        // board deals twice from the same deck, street by street
        for _ in 0..3 {
            assert!(table.pending_auto_street());
            let events = table.auto_deal();
            assert!(events
                .iter()
                .any(|e| matches!(e, TableEvent::StreetDealt { second: Some(_), .. })));
        }
        assert_eq!(table.phase(), Phase::Showdown);
        let showdown = table.showdown().unwrap();
        assert_eq!(showdown.boards.len(), 2);
        // each board goes to a different player: the pot chops
        assert_eq!(bankroll(&table, 0), 1000);
        assert_eq!(bankroll(&table, 1), 1000);
    }

    #[test]
    fn run_it_twice_declined_deals_one_board() {
        let (mut table, _) = game(&[(0, 1000), (1, 1000)]);
        act(&mut table, 0, Action::AllIn);
        act(&mut table, 1, Action::Call);
        table.vote_rit(sid(&table, 0), true).unwrap();
        let events = table.vote_rit(sid(&table, 1), false).unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, TableEvent::RitDecided { accepted: false })));
        for _ in 0..3 {
            let events = table.auto_deal();
            assert!(events
                .iter()
                .any(|e| matches!(e, TableEvent::StreetDealt { second: None, .. })));
        }
        assert_eq!(table.phase(), Phase::Showdown);
        assert_eq!(table.showdown().unwrap().boards.len(), 1);
    }

    #[test]
    fn run_it_twice_vote_window_expires_as_decline() {
        let (mut table, _) = game(&[(0, 1000), (1, 1000)]);
        act(&mut table, 0, Action::AllIn);
        act(&mut table, 1, Action::Call);
        table.vote_rit(sid(&table, 0), true).unwrap();
        let events = table.expire_rit();
        assert!(matches!(events[..], [TableEvent::RitDecided { accepted: false }]));
        assert!(!table.rit().active());
        assert!(table.pending_auto_street());
    }

    #[test]
    fn lone_caller_with_chips_fast_forwards_without_rit() {
        // seat 1 covers seat 0's all-in: not everyone is all-in, so no
        // run-it-twice offer, but betting is dead and the board runs out
        let (mut table, _) = game(&[(0, 300), (1, 1000)]);
        act(&mut table, 0, Action::AllIn);
        act(&mut table, 1, Action::Call);
        assert!(!table.rit().offered());
        assert_eq!(table.turn(), None);
        for _ in 0..3 {
            assert!(table.pending_auto_street());
            table.auto_deal();
        }
        assert_eq!(table.phase(), Phase::Showdown);
    }

    #[test]
    fn chip_conservation_through_a_raisy_hand() {
        let (mut table, _) = game(&[(0, 1000), (1, 600), (2, 1500)]);
        let start = chips_in_play(&table);
        act(&mut table, 0, Action::Raise(40));
        assert_eq!(chips_in_play(&table), start);
        act(&mut table, 1, Action::Raise(80));
        assert_eq!(chips_in_play(&table), start);
        act(&mut table, 2, Action::Fold);
        act(&mut table, 0, Action::Call);
        assert_eq!(chips_in_play(&table), start);
        act(&mut table, 1, Action::Check);
        act(&mut table, 0, Action::Raise(100));
        act(&mut table, 1, Action::Fold);
        assert_eq!(table.phase(), Phase::Showdown);
        assert_eq!(chips_in_play(&table), start);
    }

    #[test]
    fn turn_always_points_at_a_live_actor() {
        // dealer 0, sb 1, bb 2: seat 3 opens the preflop action
        let (mut table, _) = game(&[(0, 1000), (1, 600), (2, 1500), (3, 300)]);
        assert_eq!(table.turn(), Some(3));
        let script: &[(Position, Action)] = &[
            (3, Action::AllIn),
            (0, Action::Call),
            (1, Action::Call),
            (2, Action::Fold),
        ];
        for (seat, action) in script {
            act(&mut table, *seat, *action);
            if let Some(turn) = table.turn() {
                let player = table.player_at(turn).expect("turn seat occupied");
                assert!(player.can_act());
            }
        }
        // seat 3 is all-in, seat 2 folded: the flop action skips both
        assert_eq!(table.phase(), Phase::Flop);
        assert_eq!(table.turn(), Some(1));
    }

    #[test]
    fn busted_seats_vacate_before_the_next_hand() {
        // seat 0 draws aces, seat 1 kings on a dry board: seat 1 busts
        let deck = Deck::stacked(
            "Kd As Kc Ah Qc 2c 7d 9h Qd 3s Qh Jd"
                .split_whitespace()
                .map(|c| Card::try_from(c).unwrap())
                .collect(),
        );
        let (mut table, _) = game_with_deck(&[(0, 1000), (1, 200)], Some(deck));
        act(&mut table, 0, Action::AllIn);
        act(&mut table, 1, Action::Call);
        table.vote_rit(sid(&table, 0), false).unwrap();
        for _ in 0..3 {
            table.auto_deal();
        }
        assert_eq!(table.phase(), Phase::Showdown);
        assert_eq!(bankroll(&table, 1), 0);
        let session = sid(&table, 1);
        let events = table.next_hand();
        assert!(events.iter().any(|e| matches!(e, TableEvent::Busted { .. })));
        assert!(table.seat_holder(1).is_none());
        assert!(table.player(session).is_some(), "busted player spectates");
        // one player cannot field a hand
        assert_eq!(table.phase(), Phase::Waiting);
    }

    #[test]
    fn late_seat_waits_for_the_next_hand() {
        let (mut table, founder) = game(&[(0, 1000), (1, 1000)]);
        let late = SessionId::default();
        table.join(late, "late".into()).unwrap();
        let (id, _) = table.request_seat(late, 5, 400).unwrap();
        table.approve_seat(founder, id.unwrap()).unwrap();
        let player = table.player(late).unwrap();
        assert!(player.waiting());
        assert!(!player.in_hand());
        // hand plays out heads-up without them
        act(&mut table, 0, Action::Fold);
        table.next_hand();
        let player = table.player(late).unwrap();
        assert!(!player.waiting());
        assert!(player.in_hand(), "dealt in from the next hand");
    }

    #[test]
    fn departing_player_folds_and_leaves_dead_money() {
        let (mut table, _) = game(&[(0, 1000), (1, 1000), (2, 1000)]);
        let start = chips_in_play(&table);
        act(&mut table, 0, Action::Raise(40));
        act(&mut table, 1, Action::Call);
        act(&mut table, 2, Action::Call);
        // seat 1 contributed 60 and walks out mid-hand
        let quitter = sid(&table, 1);
        let took = table.player(quitter).unwrap().bankroll();
        table.leave(quitter).unwrap();
        assert_eq!(table.pot(), 180);
        assert_eq!(table.live_count(), 2);
        // the hand still settles every chip
        while table.phase().is_betting() {
            match table.turn() {
                Some(seat) => {
                    act(&mut table, seat, Action::Check);
                }
                None => {
                    table.auto_deal();
                }
            }
        }
        assert_eq!(table.phase(), Phase::Showdown);
        let awarded = table.showdown().unwrap().total_awarded();
        assert_eq!(awarded, 180, "dead money is paid out with the pot");
        assert_eq!(chips_in_play(&table) + took, start, "only the quitter's stack left");
    }

    #[test]
    fn departing_turn_holder_passes_the_action() {
        let (mut table, _) = game(&[(0, 1000), (1, 1000), (2, 1000)]);
        assert_eq!(table.turn(), Some(0));
        table.leave(sid(&table, 0)).unwrap();
        assert_eq!(table.turn(), Some(1));
        assert_eq!(table.live_count(), 2);
    }

    #[test]
    fn stop_game_refunds_the_hand() {
        let (mut table, founder) = game(&[(0, 1000), (1, 1000)]);
        act(&mut table, 0, Action::Raise(80));
        let events = table.stop_game(founder).unwrap();
        assert!(matches!(events[..], [TableEvent::HandAborted]));
        assert_eq!(table.phase(), Phase::Waiting);
        assert!(!table.running());
        assert_eq!(bankroll(&table, 0), 1000);
        assert_eq!(bankroll(&table, 1), 1000);
        assert_eq!(table.pot(), 0);
    }

    #[test]
    fn losers_may_muck_but_winners_must_show() {
        // seat 1 (the big blind) wins with aces; seat 0 loses with kings
        let deck = Deck::stacked(
            "As Kd Ah Kc 2c 7c 9h 2s 2d 5h 2h Jd"
                .split_whitespace()
                .map(|c| Card::try_from(c).unwrap())
                .collect(),
        );
        let (mut table, _) = game_with_deck(&[(0, 1000), (1, 1000)], Some(deck));
        act(&mut table, 0, Action::Call);
        act(&mut table, 1, Action::Check);
        for _ in 0..3 {
            act(&mut table, 1, Action::Check);
            act(&mut table, 0, Action::Check);
        }
        assert_eq!(table.phase(), Phase::Showdown);
        let winner = sid(&table, 1);
        let loser = sid(&table, 0);
        assert_eq!(table.muck_hand(winner), Err(TableError::MustShow));
        table.muck_hand(loser).unwrap();
        table.show_hand(loser).unwrap();
        let showdown = table.showdown().unwrap();
        assert!(showdown.reveals.iter().any(|r| r.seat == 0 && r.shown));
    }

    #[test]
    fn rigged_hand_deals_the_fixture() {
        let (mut table, _) = game(&[(0, 1000), (1, 1000)]);
        let rigger = sid(&table, 0);
        table.enable_god(rigger).unwrap();
        table.set_rigged(rigger, Fixture::Quads).unwrap();
        // finish the current hand, then the rigged one deals
        act(&mut table, 0, Action::Fold);
        table.next_hand();
        assert_eq!(table.phase(), Phase::Preflop);
        let hole = table.player(rigger).unwrap().hole().unwrap();
        let expected = Fixture::Quads.hole();
        assert_eq!(
            Hand::from(hole),
            Hand::from(expected.to_vec()),
            "rigger holds the fixture's cards"
        );
        // play it out: the fixture board must appear
        while table.phase().is_betting() {
            match table.turn() {
                Some(seat) => {
                    let owed = table.to_call(seat);
                    let action = if owed > 0 { Action::Call } else { Action::Check };
                    act(&mut table, seat, action);
                }
                None => {
                    table.auto_deal();
                }
            }
        }
        let board = Hand::from(table.board());
        let fixture = Hand::from(Fixture::Quads.board().to_vec());
        assert_eq!(board, fixture);
        let showdown = table.showdown().unwrap();
        let reveal = showdown.reveals.iter().find(|r| r.session == rigger).unwrap();
        assert!(reveal.description.contains("Four of a Kind"));
    }

    /// One uniformly random action that is legal for this seat right now.
    fn random_action(rng: &mut rand::rngs::SmallRng, table: &Table, seat: Position) -> Action {
        use rand::Rng;
        let owed = table.to_call(seat);
        let bankroll = table.player_at(seat).expect("seat occupied").bankroll();
        let mut choices = Vec::new();
        if owed == 0 {
            choices.extend([Action::Check, Action::Check, Action::Check]);
        } else {
            choices.extend([Action::Call, Action::Call, Action::Fold]);
        }
        if table.may_raise(seat) && bankroll > owed {
            let increment = table.min_raise() + rng.random_range(0..3u32) * 10;
            choices.push(Action::Raise(increment));
        }
        if bankroll <= owed || table.may_raise(seat) {
            choices.push(Action::AllIn);
        }
        choices[rng.random_range(0..choices.len())]
    }

    /// Drives whole hands of randomized legal actions: chips are conserved
    /// and the turn stays legal after every command, and at showdown every
    /// pot layer lands on seats that reached its depth.
    #[test]
    fn randomized_hands_hold_the_table_invariants() {
        use rand::Rng;
        use rand::SeedableRng;
        use rand::rngs::SmallRng;
        for seed in 0..96u64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let n = rng.random_range(2..=5usize);
            let stacks = (0..n)
                .map(|seat| (seat, rng.random_range(2..=60u32) * 20))
                .collect::<Vec<(Position, Chips)>>();
            let (mut table, _) = game(&stacks);
            let start = chips_in_play(&table);
            let mut guard = 0;
            while table.phase().is_betting() {
                guard += 1;
                assert!(guard < 1000, "seed {} never terminated", seed);
                match table.turn() {
                    Some(seat) => {
                        let player = table.player_at(seat).expect("turn seat is occupied");
                        assert!(player.can_act(), "seed {}: turn on a dead seat", seed);
                        let action = random_action(&mut rng, &table, seat);
                        let session = sid(&table, seat);
                        table.apply(session, action).expect("generated action is legal");
                    }
                    None if table.rit().open() => {
                        // decline, so the layer check below sees one board
                        let voter = table.rit().voters().next().expect("offer has voters");
                        table.vote_rit(sid(&table, voter), false).unwrap();
                    }
                    None => {
                        table.auto_deal();
                    }
                }
                assert_eq!(chips_in_play(&table), start, "seed {} leaked chips", seed);
            }
            assert_eq!(table.phase(), Phase::Showdown);
            let showdown = table.showdown().expect("hand settled");
            if showdown.walked {
                continue;
            }
            // recompute the layers the engine saw: per-hand bets stay on
            // the players until the next hand starts
            let contributions = table
                .players()
                .iter()
                .filter(|p| p.hand_bet() > 0)
                .map(|p| Contribution {
                    seat: p.seat(),
                    amount: p.hand_bet(),
                    live: p.live(),
                })
                .collect::<Vec<Contribution>>();
            let layers = pots::layers(&contributions);
            let results = &showdown.boards[0].pots;
            assert_eq!(layers.len(), results.len(), "seed {}", seed);
            for (layer, result) in layers.iter().zip(results) {
                assert_eq!(layer.amount, result.amount, "seed {}", seed);
                for winner in result.winners.iter() {
                    assert!(
                        layer.eligible.contains(winner),
                        "seed {}: winner below the layer's depth",
                        seed
                    );
                }
            }
        }
    }

    /// Fuzzes the reopen rule: an all-in for less than a full raise must
    /// leave the acted set, min-raise, and aggressor alone, and cap raise
    /// rights for every seat that already acted this street.
    #[test]
    fn short_all_ins_never_reopen_fuzz() {
        use rand::Rng;
        use rand::SeedableRng;
        use rand::rngs::SmallRng;
        for seed in 0..128u64 {
            let mut rng = SmallRng::seed_from_u64(0xA11 + seed);
            let n = rng.random_range(3..=5usize);
            let short = rng.random_range(0..n);
            let stacks = (0..n)
                .map(|seat| {
                    let stack = match seat == short {
                        true => rng.random_range(25..120u32),
                        false => 1000 + rng.random_range(0..20u32) * 20,
                    };
                    (seat, stack)
                })
                .collect::<Vec<(Position, Chips)>>();
            let (mut table, _) = game(&stacks);
            let mut guard = 0;
            while table.phase() == Phase::Preflop && table.turn().is_some() {
                guard += 1;
                assert!(guard < 64, "seed {} never reached the short stack", seed);
                let seat = table.turn().expect("betting continues");
                let session = sid(&table, seat);
                if seat != short {
                    // deep stacks raise the minimum or flat the line
                    let action = if rng.random_bool(0.5) && table.may_raise(seat) {
                        Action::Raise(table.min_raise())
                    } else if table.to_call(seat) > 0 {
                        Action::Call
                    } else {
                        Action::Check
                    };
                    table.apply(session, action).unwrap();
                    continue;
                }
                // the short stack jams their first turn
                let before_bet = table.current_bet();
                let before_min = table.min_raise();
                let before_aggressor = table.aggressor;
                let before_acted = table.acted.clone();
                table.apply(session, Action::AllIn).unwrap();
                let total = table.player_at(seat).expect("still seated").round_bet();
                let full = total.saturating_sub(before_bet) >= before_min;
                if !full && table.phase() == Phase::Preflop && table.turn().is_some() {
                    assert_eq!(table.min_raise(), before_min, "seed {}", seed);
                    assert_eq!(table.aggressor, before_aggressor, "seed {}", seed);
                    assert!(
                        before_acted.iter().all(|s| table.acted.contains(s)),
                        "seed {}: short all-in reset the acted set",
                        seed
                    );
                    assert!(table.capped, "seed {}", seed);
                    for acted in table.opened.iter() {
                        assert!(!table.may_raise(*acted), "seed {}", seed);
                    }
                }
                break;
            }
        }
    }
}

use rvb_core::Chips;
use rvb_core::Position;
use rvb_core::SessionId;
use rvb_cards::Hole;

/// A room member, keyed by durable session identity.
///
/// Spectators and seated players share this type; a spectator simply has no
/// seat. Connection identity is not recorded here at all; it belongs to
/// the fan-out layer and may change across reconnects.
#[derive(Debug, Clone)]
pub struct Player {
    session: SessionId,
    name: String,
    bankroll: Chips,
    seat: Option<Position>,
    hole: Option<Hole>,
    round_bet: Chips,
    hand_bet: Chips,
    folded: bool,
    all_in: bool,
    waiting: bool,
}

impl Player {
    pub fn new(session: SessionId, name: String) -> Self {
        Self {
            session,
            name,
            bankroll: 0,
            seat: None,
            hole: None,
            round_bet: 0,
            hand_bet: 0,
            folded: false,
            all_in: false,
            waiting: false,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn rename(&mut self, name: String) {
        self.name = name;
    }
    pub fn bankroll(&self) -> Chips {
        self.bankroll
    }
    pub fn seat(&self) -> Option<Position> {
        self.seat
    }
    pub fn hole(&self) -> Option<Hole> {
        self.hole
    }
    pub fn round_bet(&self) -> Chips {
        self.round_bet
    }
    pub fn hand_bet(&self) -> Chips {
        self.hand_bet
    }
    pub fn folded(&self) -> bool {
        self.folded
    }
    pub fn all_in(&self) -> bool {
        self.all_in
    }
    pub fn waiting(&self) -> bool {
        self.waiting
    }

    /// Dealt into the current hand (folded players still count: their chips
    /// are in the pot).
    pub fn in_hand(&self) -> bool {
        self.hole.is_some()
    }
    /// In the hand and still contesting the pot.
    pub fn live(&self) -> bool {
        self.in_hand() && !self.folded
    }
    /// Live with chips behind: the only players the turn may point at.
    pub fn can_act(&self) -> bool {
        self.live() && !self.all_in
    }

    /// Commits up to `amount` chips, clamped by the remaining bankroll.
    /// Exhausting the stack marks the player all-in. Returns what was
    /// actually committed.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let chips = amount.min(self.bankroll);
        self.bankroll -= chips;
        self.round_bet += chips;
        self.hand_bet += chips;
        if self.bankroll == 0 {
            self.all_in = true;
        }
        chips
    }
    pub fn award(&mut self, chips: Chips) {
        self.bankroll += chips;
    }
    pub fn fold(&mut self) {
        self.folded = true;
    }

    pub fn sit(&mut self, seat: Position, buyin: Chips, waiting: bool) {
        self.seat = Some(seat);
        self.bankroll = buyin;
        self.waiting = waiting;
    }
    pub fn stand(&mut self) {
        self.seat = None;
        self.hole = None;
        self.waiting = false;
    }
    pub fn deal(&mut self, hole: Hole) {
        self.hole = Some(hole);
    }

    /// Clears per-hand state at the start of a new hand. The
    /// waiting-for-next-hand flag lifts here.
    pub fn reset_for_hand(&mut self) {
        self.hole = None;
        self.round_bet = 0;
        self.hand_bet = 0;
        self.folded = false;
        self.all_in = false;
        self.waiting = false;
    }
    /// Clears per-street state between betting rounds.
    pub fn reset_for_street(&mut self) {
        self.round_bet = 0;
    }
    /// Abandons the hand on the way out of a seat: the chips already
    /// committed stay behind as dead money. Returns the abandoned amount.
    pub(crate) fn surrender(&mut self) -> Chips {
        let chips = self.hand_bet;
        self.hand_bet = 0;
        self.round_bet = 0;
        chips
    }
    /// Returns this hand's contribution to its owner, for a stopped game.
    pub fn refund(&mut self) -> Chips {
        let chips = self.hand_bet;
        self.bankroll += chips;
        self.hand_bet = 0;
        self.round_bet = 0;
        chips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        let mut p = Player::new(SessionId::default(), "tester".into());
        p.sit(0, 1000, false);
        p
    }

    #[test]
    fn commit_clamps_to_bankroll() {
        let mut p = player();
        assert_eq!(p.commit(300), 300);
        assert_eq!(p.bankroll(), 700);
        assert_eq!(p.commit(900), 700);
        assert!(p.all_in());
        assert_eq!(p.hand_bet(), 1000);
    }

    #[test]
    fn street_reset_keeps_hand_total() {
        let mut p = player();
        p.commit(100);
        p.reset_for_street();
        assert_eq!(p.round_bet(), 0);
        assert_eq!(p.hand_bet(), 100);
    }

    #[test]
    fn refund_restores_bankroll() {
        let mut p = player();
        p.commit(250);
        assert_eq!(p.refund(), 250);
        assert_eq!(p.bankroll(), 1000);
    }
}

use super::pots::PotResult;
use rvb_core::Chips;
use rvb_core::Position;
use rvb_core::SessionId;
use rvb_cards::Board;
use rvb_cards::Hole;

/// Everything a client may learn about a finished hand.
///
/// Built once when the pot is awarded and kept on the table until the next
/// hand starts. Reveal flags are the only mutable part: losers may muck or
/// voluntarily show, winners and the last aggressor must show.
#[derive(Debug, Clone)]
pub struct Showdown {
    /// Per-board outcomes; two entries when the hand ran twice.
    pub boards: Vec<BoardOutcome>,
    /// Aggregate chips moved to each seat across all boards and layers.
    pub payouts: Vec<(Position, Chips)>,
    /// Reveal state per live seat, in seat order.
    pub reveals: Vec<Reveal>,
    /// True when everyone else folded and no cards were ever at risk.
    pub walked: bool,
}

/// One board's pot-by-pot results.
#[derive(Debug, Clone)]
pub struct BoardOutcome {
    pub board: Board,
    /// Main pot first, then side pots.
    pub pots: Vec<PotResult>,
}

/// One live seat's cards and whether the table gets to see them.
#[derive(Debug, Clone)]
pub struct Reveal {
    pub seat: Position,
    pub session: SessionId,
    pub hole: Hole,
    /// Winners and the last aggressor cannot muck.
    pub must_show: bool,
    pub shown: bool,
    /// Human description of the best hand on the first board.
    pub description: String,
}

impl Showdown {
    /// The no-showdown path: one player standing, pot pushed face-down.
    pub fn walkover(seat: Position, amount: Chips) -> Self {
        Self {
            boards: Vec::new(),
            payouts: vec![(seat, amount)],
            reveals: Vec::new(),
            walked: true,
        }
    }
    pub fn reveal_mut(&mut self, session: SessionId) -> Option<&mut Reveal> {
        self.reveals.iter_mut().find(|r| r.session == session)
    }
    pub fn total_awarded(&self) -> Chips {
        self.payouts.iter().map(|(_, chips)| chips).sum()
    }
}

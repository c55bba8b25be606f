use super::action::Action;
use super::phase::Phase;
use rvb_core::Chips;
use rvb_core::Position;
use rvb_core::SessionId;
use rvb_cards::Hand;

/// Discrete transitions produced by the table for the room actor to
/// publish. Pure data: the wire encoding lives in `rvb-gameroom`.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// A new hand began; blinds are already posted.
    HandStarted {
        hand: u64,
        dealer: Position,
        small: Position,
        big: Position,
    },
    /// Seats vacated for zero bankrolls before the hand started.
    Busted { seats: Vec<(Position, SessionId)> },
    /// A blind was posted (possibly short, possibly all-in).
    Posted { seat: Position, amount: Chips },
    /// A player acted; `paid` is what the action actually committed.
    Acted {
        seat: Position,
        action: Action,
        paid: Chips,
        pot: Chips,
    },
    /// A street was dealt; `second` carries the run-it-twice board's cards.
    StreetDealt {
        phase: Phase,
        cards: Hand,
        second: Option<Hand>,
    },
    /// All live seats are all-in with streets to come: votes requested.
    RitOffered { voters: Vec<Position> },
    RitVoted { seat: Position, accept: bool },
    RitDecided { accepted: bool },
    /// Everyone else folded; the pot moved without a showdown.
    HandWon { seat: Position, amount: Chips },
    /// Showdown resolved; the snapshot on the table holds the details.
    ShowdownStarted,
    /// The host role moved to this player.
    HostChanged { session: SessionId },
    /// Seat request lifecycle.
    SeatRequested { session: SessionId, seat: Position },
    SeatApproved {
        session: SessionId,
        seat: Position,
        buyin: Chips,
    },
    SeatDenied { session: SessionId },
    /// A seated player left their seat or the room.
    SeatVacated { session: SessionId, seat: Position },
    /// The game stopped mid-hand; contributions were refunded.
    HandAborted,
}

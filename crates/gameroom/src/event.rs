use rvb_core::Chips;
use rvb_core::Position;
use serde::Serialize;

/// Discrete transition announcements, broadcast alongside state snapshots.
///
/// Tagged with `event` so a `game_event` message reads as
/// `{"type":"game_event","event":"flop",...}` on the wire.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    NewHand {
        hand: u64,
        dealer: Position,
        small_blind_seat: Position,
        big_blind_seat: Position,
    },
    Flop {
        cards: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        second: Option<Vec<String>>,
    },
    Turn {
        cards: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        second: Option<Vec<String>>,
    },
    River {
        cards: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        second: Option<Vec<String>>,
    },
    PlayerAction {
        seat: Position,
        action: String,
        amount: Chips,
        pot: Chips,
    },
    HandWon {
        seat: Position,
        name: String,
        amount: Chips,
    },
    Showdown(super::message::ShowdownView),
    PlayersBusted {
        seats: Vec<Position>,
        names: Vec<String>,
    },
    HostChanged {
        name: String,
    },
    YouAreHost,
    SeatRequested(super::message::RequestView),
    SeatApproved {
        name: String,
        seat: Position,
        buy_in: Chips,
    },
    SeatDenied {
        name: String,
    },
    RunItTwiceOffered {
        voters: Vec<Position>,
    },
    RunItTwiceVote {
        seat: Position,
        accept: bool,
    },
    RunItTwiceResult {
        accepted: bool,
    },
    HandAborted,
}

use super::event::GameEvent;
use rvb_core::Chips;
use rvb_core::Position;
use rvb_core::SessionId;
use rvb_cards::Board;
use rvb_cards::Hand;
use rvb_cards::Strength;
use rvb_gameplay::Phase;
use rvb_gameplay::Showdown;
use rvb_gameplay::Table;
use serde::Serialize;

/// Messages sent from server to clients.
///
/// `room_state` is the public snapshot broadcast to the whole room;
/// `player_state` is the same view plus one member's private additions,
/// unicast; `game_event` narrates discrete transitions; `ack` answers a
/// specific client command.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomState(RoomStateView),
    PlayerState(PlayerStateView),
    GameEvent(GameEvent),
    Ack {
        cmd: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(flatten)]
        body: serde_json::Map<String, serde_json::Value>,
    },
}

impl ServerMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

/// Public room snapshot: everything every member may see.
#[derive(Clone, Debug, Serialize)]
pub struct RoomStateView {
    pub room: String,
    pub name: String,
    pub phase: String,
    pub hand: u64,
    pub pot: Chips,
    pub board: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_board: Option<Vec<String>>,
    pub blinds: BlindsView,
    pub current_bet: Chips,
    pub min_raise: Chips,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_blind_seat: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_blind_seat: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<Position>,
    pub running: bool,
    pub paused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub seats: Vec<Option<SeatView>>,
    pub requests: Vec<RequestView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_it_twice: Option<RitView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showdown: Option<ShowdownView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BlindsView {
    pub small: Chips,
    pub big: Chips,
}

#[derive(Clone, Debug, Serialize)]
pub struct SeatView {
    pub seat: Position,
    pub name: String,
    pub bankroll: Chips,
    pub round_bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub waiting: bool,
    pub is_host: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct RequestView {
    pub request_id: String,
    pub name: String,
    pub seat: Position,
    pub buy_in: Chips,
}

#[derive(Clone, Debug, Serialize)]
pub struct RitView {
    pub open: bool,
    pub active: bool,
    pub voters: Vec<Position>,
    pub voted: Vec<Position>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ShowdownView {
    pub walked: bool,
    pub boards: Vec<BoardResultView>,
    pub payouts: Vec<PayoutView>,
    pub reveals: Vec<RevealView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BoardResultView {
    pub cards: Vec<String>,
    pub pots: Vec<PotView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PotView {
    pub amount: Chips,
    pub winners: Vec<Position>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PayoutView {
    pub seat: Position,
    pub amount: Chips,
}

/// One showdown participant. Cards and description are withheld until the
/// hand is shown; mucked hands stay face-down.
#[derive(Clone, Debug, Serialize)]
pub struct RevealView {
    pub seat: Position,
    pub name: String,
    pub must_show: bool,
    pub shown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Private member snapshot: the public view plus this member's secrets.
#[derive(Clone, Debug, Serialize)]
pub struct PlayerStateView {
    #[serde(flatten)]
    pub room: RoomStateView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_hand: Option<String>,
    pub to_call: Chips,
    pub actions: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_request: Option<RequestView>,
    pub is_host: bool,
    pub can_show: bool,
    pub can_muck: bool,
    pub rit_vote_pending: bool,
}

fn cards_of(hand: Hand) -> Vec<String> {
    Vec::<rvb_cards::Card>::from(hand)
        .into_iter()
        .map(|c| c.to_string())
        .collect()
}

fn board_cards(board: Board) -> Vec<String> {
    cards_of(Hand::from(board))
}

fn request_view(table: &Table, request: &rvb_gameplay::SeatRequest) -> RequestView {
    RequestView {
        request_id: rvb_core::Unique::id(request).to_string(),
        name: table
            .player(request.session())
            .map(|p| p.name().to_string())
            .unwrap_or_default(),
        seat: request.seat(),
        buy_in: request.buyin(),
    }
}

fn showdown_view(table: &Table, showdown: &Showdown) -> ShowdownView {
    ShowdownView {
        walked: showdown.walked,
        boards: showdown
            .boards
            .iter()
            .map(|b| BoardResultView {
                cards: board_cards(b.board),
                pots: b
                    .pots
                    .iter()
                    .map(|p| PotView {
                        amount: p.amount,
                        winners: p.winners.clone(),
                    })
                    .collect(),
            })
            .collect(),
        payouts: showdown
            .payouts
            .iter()
            .map(|(seat, amount)| PayoutView {
                seat: *seat,
                amount: *amount,
            })
            .collect(),
        reveals: showdown
            .reveals
            .iter()
            .map(|r| RevealView {
                seat: r.seat,
                name: table
                    .player(r.session)
                    .map(|p| p.name().to_string())
                    .unwrap_or_default(),
                must_show: r.must_show,
                shown: r.shown,
                cards: r.shown.then(|| cards_of(Hand::from(r.hole))),
                description: r.shown.then(|| r.description.clone()),
            })
            .collect(),
    }
}

/// Builds the public snapshot of a table.
pub fn room_state(code: &str, name: &str, table: &Table) -> RoomStateView {
    let in_hand = table.phase() != Phase::Waiting;
    let (small, big) = table.blinds();
    RoomStateView {
        room: code.to_string(),
        name: name.to_string(),
        phase: table.phase().label().to_string(),
        hand: table.hand_number(),
        pot: table.pot(),
        board: board_cards(table.board()),
        second_board: table.second_board().map(board_cards),
        blinds: BlindsView { small, big },
        current_bet: table.current_bet(),
        min_raise: table.min_raise(),
        dealer: in_hand.then(|| table.dealer()),
        small_blind_seat: in_hand.then(|| table.small_blind_seat()),
        big_blind_seat: in_hand.then(|| table.big_blind_seat()),
        turn: table.turn(),
        running: table.running(),
        paused: table.paused(),
        host: table
            .host()
            .and_then(|h| table.player(h))
            .map(|p| p.name().to_string()),
        seats: (0..table.n_seats())
            .map(|seat| {
                table.player_at(seat).map(|p| SeatView {
                    seat,
                    name: p.name().to_string(),
                    bankroll: p.bankroll(),
                    round_bet: p.round_bet(),
                    folded: p.folded(),
                    all_in: p.all_in(),
                    waiting: p.waiting(),
                    is_host: table.host() == Some(p.session()),
                })
            })
            .collect(),
        requests: table
            .requests()
            .iter()
            .map(|r| request_view(table, r))
            .collect(),
        run_it_twice: table.rit().offered().then(|| RitView {
            open: table.rit().open(),
            active: table.rit().active(),
            voters: table.rit().voters().collect(),
            voted: table
                .rit()
                .voters()
                .filter(|v| table.rit().vote_of(*v).is_some())
                .collect(),
        }),
        showdown: table.showdown().map(|s| showdown_view(table, s)),
    }
}

/// Builds one member's private snapshot on top of the public view.
pub fn player_state(code: &str, name: &str, table: &Table, session: SessionId) -> PlayerStateView {
    let room = room_state(code, name, table);
    let player = table.player(session);
    let seat = player.and_then(|p| p.seat());
    let hole = player.and_then(|p| p.hole());
    let best_hand = hole.map(|h| {
        Strength::from(Hand::add(Hand::from(h), Hand::from(table.board()))).to_string()
    });
    let reveal = table
        .showdown()
        .and_then(|s| s.reveals.iter().find(|r| r.session == session));
    PlayerStateView {
        room,
        seat,
        hole: hole.map(|h| cards_of(Hand::from(h))),
        best_hand,
        to_call: seat.map(|s| table.to_call(s)).unwrap_or(0),
        actions: table.options(session),
        pending_request: table
            .requests()
            .iter()
            .find(|r| r.session() == session)
            .map(|r| request_view(table, r)),
        is_host: table.host() == Some(session),
        can_show: reveal.map(|r| !r.shown).unwrap_or(false),
        can_muck: reveal.map(|r| !r.must_show).unwrap_or(false),
        rit_vote_pending: seat
            .map(|s| {
                table.rit().open()
                    && table.rit().voters().any(|v| v == s)
                    && table.rit().vote_of(s).is_none()
            })
            .unwrap_or(false),
    }
}

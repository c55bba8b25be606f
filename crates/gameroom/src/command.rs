use rvb_core::Chips;
use rvb_core::ID;
use rvb_core::Position;
use rvb_core::SessionId;
use rvb_gameplay::Action;
use rvb_gameplay::Fixture;
use rvb_gameplay::SeatRequest;
use tokio::sync::oneshot;

/// Everything that can enter a room actor's queue.
///
/// Timers post `Tick`s back into the same queue, so a timer firing is just
/// another serialized command; it never mutates state from outside.
#[derive(Debug)]
pub enum Command {
    /// A client command, with the ack channel the bridge is awaiting.
    Client {
        from: SessionId,
        kind: CommandKind,
        ack: oneshot::Sender<Ack>,
    },
    /// The transport dropped this session's connection.
    Disconnect { session: SessionId },
    /// A scheduled timer fired. `hand` pins the tick to the hand it was
    /// scheduled in; stale ticks are discarded on receipt.
    Tick { kind: TimerKind, hand: u64 },
}

/// The client-command vocabulary, one variant per wire command.
#[derive(Debug, Clone)]
pub enum CommandKind {
    Join { name: String },
    Leave,
    RequestSeat { seat: Position, buyin: Chips },
    ApproveSeat { request: ID<SeatRequest> },
    DenySeat { request: ID<SeatRequest> },
    CancelSeatRequest,
    LeaveSeat,
    StartGame,
    PauseGame,
    ResumeGame,
    StopGame,
    PlayerAction { action: Action },
    ShowHand,
    MuckHand,
    RitVote { accept: bool },
    GodEnable { secret: String },
    GodDisable,
    SetRiggedHand { fixture: Fixture },
}

/// The timers a room schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Deal the next street of an all-in runout.
    Street,
    /// Leave showdown for the next hand.
    Settle,
    /// Close the run-it-twice voting window.
    RitExpiry,
    /// Retire the room if it is still empty.
    Reap,
}

/// Reply to a client command: `{success, error?, ...payload}`.
#[derive(Debug, Clone)]
pub struct Ack {
    pub success: bool,
    pub error: Option<String>,
    pub body: serde_json::Map<String, serde_json::Value>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            body: serde_json::Map::new(),
        }
    }
    pub fn with(key: &str, value: serde_json::Value) -> Self {
        let mut ack = Self::ok();
        ack.body.insert(key.to_string(), value);
        ack
    }
    pub fn err(message: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: Some(message.to_string()),
            body: serde_json::Map::new(),
        }
    }
}

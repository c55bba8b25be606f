use rvb_core::Chips;
use rvb_core::ID;
use rvb_core::Position;
use rvb_core::SessionId;
use rvb_core::Unique;

/// A queued request to take a seat, awaiting host approval.
#[derive(Debug, Clone)]
pub struct SeatRequest {
    id: ID<Self>,
    session: SessionId,
    seat: Position,
    buyin: Chips,
    at: std::time::SystemTime,
}

impl SeatRequest {
    pub fn new(session: SessionId, seat: Position, buyin: Chips) -> Self {
        Self {
            id: ID::default(),
            session,
            seat,
            buyin,
            at: std::time::SystemTime::now(),
        }
    }
    pub fn session(&self) -> SessionId {
        self.session
    }
    pub fn seat(&self) -> Position {
        self.seat
    }
    pub fn buyin(&self) -> Chips {
        self.buyin
    }
    pub fn at(&self) -> std::time::SystemTime {
        self.at
    }
}

impl Unique for SeatRequest {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

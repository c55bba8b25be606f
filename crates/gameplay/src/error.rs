use rvb_core::Chips;

/// Rule violations surfaced on command acks.
///
/// These are first-class values, not exceptional control flow: the room
/// actor maps them straight onto the reply and leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    // preconditions
    NotInRoom,
    NotSeated,
    AlreadySeated,
    InvalidSeat,
    SeatTaken,
    MinBuyIn(Chips),
    BadName,
    NoSuchRequest,
    NotEnoughPlayers,
    GameNotRunning,
    GameAlreadyRunning,
    GamePaused,
    NoBettingRound,
    NotYourTurn,
    CannotCheck(Chips),
    NothingToCall,
    MinRaise(Chips),
    BettingCapped,
    NotAtShowdown,
    MustShow,
    NoRunItTwiceOffer,
    NotEligibleToVote,
    AlreadyVoted,
    // authorization
    NotHost,
    GodModeDisabled,
    BadSecret,
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NotInRoom => write!(f, "not in a room"),
            Self::NotSeated => write!(f, "not seated"),
            Self::AlreadySeated => write!(f, "already seated"),
            Self::InvalidSeat => write!(f, "invalid seat"),
            Self::SeatTaken => write!(f, "seat taken"),
            Self::MinBuyIn(n) => write!(f, "minimum buy-in is {}", n),
            Self::BadName => write!(f, "name must be 1-15 characters"),
            Self::NoSuchRequest => write!(f, "no such seat request"),
            Self::NotEnoughPlayers => write!(f, "need at least two seated players"),
            Self::GameNotRunning => write!(f, "the game is not running"),
            Self::GameAlreadyRunning => write!(f, "the game is already running"),
            Self::GamePaused => write!(f, "the game is paused"),
            Self::NoBettingRound => write!(f, "no betting round in progress"),
            Self::NotYourTurn => write!(f, "not your turn"),
            Self::CannotCheck(n) => write!(f, "cannot check, must call {} or raise", n),
            Self::NothingToCall => write!(f, "nothing to call"),
            Self::MinRaise(n) => write!(f, "minimum raise is {}", n),
            Self::BettingCapped => write!(f, "betting is capped, you may only call or fold"),
            Self::NotAtShowdown => write!(f, "not at showdown"),
            Self::MustShow => write!(f, "you must show your cards"),
            Self::NoRunItTwiceOffer => write!(f, "no run-it-twice offer open"),
            Self::NotEligibleToVote => write!(f, "not eligible to vote"),
            Self::AlreadyVoted => write!(f, "already voted"),
            Self::NotHost => write!(f, "only the host can do that"),
            Self::GodModeDisabled => write!(f, "god mode not enabled"),
            Self::BadSecret => write!(f, "nice try"),
        }
    }
}

impl std::error::Error for TableError {}

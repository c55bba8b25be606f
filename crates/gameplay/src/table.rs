use super::action::Action;
use super::error::TableError;
use super::event::TableEvent;
use super::phase::Phase;
use super::player::Player;
use super::request::SeatRequest;
use super::rig::Fixture;
use super::rit::Rit;
use super::showdown::Showdown;
use rvb_core::Chips;
use rvb_core::ID;
use rvb_core::MAX_SEATS;
use rvb_core::MIN_BUYIN_BBS;
use rvb_core::MIN_PLAYERS;
use rvb_core::NAME_MAX;
use rvb_core::Position;
use rvb_core::SessionId;
use rvb_core::Unique;
use rvb_cards::Board;
use rvb_cards::Deck;
use std::collections::BTreeSet;

/// Immutable room parameters fixed at creation.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub seats: usize,
    pub small: Chips,
    pub big: Chips,
    pub founder: SessionId,
}

/// The complete per-room game state: the single source of truth that the
/// room actor serializes every command against.
///
/// Everything here is synchronous and deterministic. The async shell owns
/// exactly one `Table` per room and is the only writer.
#[derive(Debug)]
pub struct Table {
    // membership
    seats: Vec<Option<SessionId>>,
    players: Vec<Player>,
    host: Option<SessionId>,
    founder: SessionId,
    requests: Vec<SeatRequest>,
    // session controls
    blinds: (Chips, Chips),
    running: bool,
    paused: bool,
    // hand state
    pub(crate) hand: u64,
    pub(crate) phase: Phase,
    pub(crate) deck: Deck,
    pub(crate) board: Board,
    pub(crate) second: Option<Board>,
    pub(crate) pot: Chips,
    pub(crate) current_bet: Chips,
    pub(crate) min_raise: Chips,
    pub(crate) dealer: Position,
    pub(crate) sb: Position,
    pub(crate) bb: Position,
    pub(crate) turn: Option<Position>,
    pub(crate) aggressor: Option<Position>,
    /// Seats that have acted since the last full raise: round completion.
    pub(crate) acted: BTreeSet<Position>,
    /// Seats that made any voluntary action this street: raise rights
    /// under the short-all-in cap. Blind posts do not count.
    pub(crate) opened: BTreeSet<Position>,
    /// Set by a short all-in; cleared by a full raise or a new street.
    pub(crate) capped: bool,
    pub(crate) rit: Rit,
    pub(crate) showdown: Option<Showdown>,
    /// Contributions of players who left the room mid-hand: dead money
    /// that still belongs to the pot layers.
    pub(crate) ghosts: Vec<Chips>,
    /// A pre-built deck consumed by the next hand. Tests plant seeded
    /// decks here; rigged fixtures build theirs at hand start instead.
    pub(crate) planted: Option<Deck>,
    // privileged mode
    god: Option<SessionId>,
    pub(crate) rigged: Option<(SessionId, Fixture)>,
}

impl Table {
    pub fn new(config: TableConfig) -> Self {
        let seats = config.seats.clamp(MIN_PLAYERS, MAX_SEATS);
        Self {
            seats: vec![None; seats],
            players: Vec::new(),
            host: None,
            founder: config.founder,
            requests: Vec::new(),
            blinds: (config.small, config.big),
            running: false,
            paused: false,
            hand: 0,
            phase: Phase::Waiting,
            deck: Deck::shuffled(),
            board: Board::empty(),
            second: None,
            pot: 0,
            current_bet: 0,
            min_raise: config.big,
            dealer: seats - 1,
            sb: 0,
            bb: 0,
            turn: None,
            aggressor: None,
            acted: BTreeSet::new(),
            opened: BTreeSet::new(),
            capped: false,
            rit: Rit::default(),
            showdown: None,
            ghosts: Vec::new(),
            planted: None,
            god: None,
            rigged: None,
        }
    }
}

// ============================================================================
// Queries
// ============================================================================
impl Table {
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn hand_number(&self) -> u64 {
        self.hand
    }
    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn board(&self) -> Board {
        self.board
    }
    pub fn second_board(&self) -> Option<Board> {
        self.second
    }
    pub fn blinds(&self) -> (Chips, Chips) {
        self.blinds
    }
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }
    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }
    pub fn dealer(&self) -> Position {
        self.dealer
    }
    pub fn small_blind_seat(&self) -> Position {
        self.sb
    }
    pub fn big_blind_seat(&self) -> Position {
        self.bb
    }
    pub fn turn(&self) -> Option<Position> {
        self.turn
    }
    pub fn running(&self) -> bool {
        self.running
    }
    pub fn paused(&self) -> bool {
        self.paused
    }
    pub fn host(&self) -> Option<SessionId> {
        self.host
    }
    pub fn founder(&self) -> SessionId {
        self.founder
    }
    pub fn n_seats(&self) -> usize {
        self.seats.len()
    }
    pub fn seat_holder(&self, seat: Position) -> Option<SessionId> {
        self.seats.get(seat).copied().flatten()
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn requests(&self) -> &[SeatRequest] {
        &self.requests
    }
    pub fn showdown(&self) -> Option<&Showdown> {
        self.showdown.as_ref()
    }
    pub fn rit(&self) -> &Rit {
        &self.rit
    }
    pub fn god(&self) -> Option<SessionId> {
        self.god
    }

    pub fn player(&self, session: SessionId) -> Option<&Player> {
        self.players.iter().find(|p| p.session() == session)
    }
    pub fn player_at(&self, seat: Position) -> Option<&Player> {
        self.seat_holder(seat).and_then(|s| self.player(s))
    }
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Chips owed by this seat to match the current bet.
    pub fn to_call(&self, seat: Position) -> Chips {
        self.player_at(seat)
            .map(|p| self.current_bet.saturating_sub(p.round_bet()))
            .unwrap_or(0)
    }

    /// Action labels available to this seat right now, for the private view.
    pub fn options(&self, session: SessionId) -> Vec<&'static str> {
        let Some(player) = self.player(session) else {
            return Vec::new();
        };
        let Some(seat) = player.seat() else {
            return Vec::new();
        };
        if self.turn != Some(seat) || !self.phase.is_betting() || self.paused {
            return Vec::new();
        }
        let owed = self.to_call(seat);
        let mut options = vec![Action::Fold.label()];
        if owed == 0 {
            options.push(Action::Check.label());
        } else {
            options.push(Action::Call.label());
        }
        if self.may_raise(seat) && player.bankroll() > owed {
            options.push(Action::Raise(0).label());
        }
        if player.bankroll() > 0 {
            options.push(Action::AllIn.label());
        }
        options
    }

    /// Raise rights: forbidden only for a seat that already acted this
    /// street while a short all-in has the betting capped.
    pub(crate) fn may_raise(&self, seat: Position) -> bool {
        !(self.capped && self.opened.contains(&seat))
    }

    pub(crate) fn idx(&self, session: SessionId) -> Option<usize> {
        self.players.iter().position(|p| p.session() == session)
    }
    pub(crate) fn seat_of(&self, session: SessionId) -> Option<Position> {
        self.player(session).and_then(|p| p.seat())
    }

    /// Next occupied seat strictly clockwise from `from`.
    pub(crate) fn next_occupied(&self, from: Position) -> Option<Position> {
        let n = self.seats.len();
        (1..=n)
            .map(|i| (from + i) % n)
            .find(|&s| self.seats[s].is_some())
    }
    /// Next seat clockwise whose player can still act in the hand.
    pub(crate) fn next_can_act(&self, from: Position) -> Option<Position> {
        let n = self.seats.len();
        (1..=n)
            .map(|i| (from + i) % n)
            .find(|&s| self.player_at(s).map(Player::can_act).unwrap_or(false))
    }

    pub(crate) fn live_seats(&self) -> Vec<Position> {
        (0..self.seats.len())
            .filter(|&s| self.player_at(s).map(Player::live).unwrap_or(false))
            .collect()
    }
    pub(crate) fn live_count(&self) -> usize {
        self.players.iter().filter(|p| p.live()).count()
    }
    pub(crate) fn can_act_count(&self) -> usize {
        self.players.iter().filter(|p| p.can_act()).count()
    }
    /// Seated players able to start the next hand.
    pub(crate) fn eligible_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.seat().is_some() && p.bankroll() > 0)
            .count()
    }
    pub(crate) fn hand_in_progress(&self) -> bool {
        self.phase != Phase::Waiting
    }

    pub(crate) fn players_mut(&mut self) -> std::slice::IterMut<'_, Player> {
        self.players.iter_mut()
    }
    /// Moves chips from a seat's bankroll into the pot, clamped.
    pub(crate) fn commit_at(&mut self, seat: Position, amount: Chips) -> Chips {
        let session = self.seats[seat].expect("committing seat is occupied");
        let idx = self.idx(session).expect("seated player is present");
        let paid = self.players[idx].commit(amount);
        self.pot += paid;
        paid
    }
    pub(crate) fn fold_at(&mut self, idx: usize) {
        self.players[idx].fold();
    }
    pub(crate) fn deal_to(&mut self, seat: Position, hole: rvb_cards::Hole) {
        let session = self.seats[seat].expect("dealt seat is occupied");
        let idx = self.idx(session).expect("seated player is present");
        self.players[idx].deal(hole);
    }
    pub(crate) fn award_at(&mut self, seat: Position, chips: Chips) {
        let session = self.seats[seat].expect("awarded seat is occupied");
        let idx = self.idx(session).expect("seated player is present");
        self.players[idx].award(chips);
    }
    /// Bare seat vacating, for bust-outs between hands.
    pub(crate) fn clear_seat(&mut self, seat: Position, session: SessionId) {
        self.seats[seat] = None;
        if let Some(idx) = self.idx(session) {
            self.players[idx].stand();
        }
    }
}

// ============================================================================
// Membership
// ============================================================================
impl Table {
    /// Registers a session in the room as a spectator. The founder (or the
    /// first arrival in a hostless room) takes the host role.
    pub fn join(
        &mut self,
        session: SessionId,
        name: String,
    ) -> Result<Vec<TableEvent>, TableError> {
        let visible = name.trim();
        if visible.is_empty() || visible.chars().count() > NAME_MAX {
            return Err(TableError::BadName);
        }
        if let Some(idx) = self.idx(session) {
            // rejoin under the same session: refresh the name only
            self.players[idx].rename(visible.to_string());
            return Ok(self.reclaim_host(session));
        }
        self.players.push(Player::new(session, visible.to_string()));
        log::debug!("player {} joined as '{}'", session, visible);
        Ok(self.reclaim_host(session))
    }

    fn reclaim_host(&mut self, session: SessionId) -> Vec<TableEvent> {
        let entitled = self.host.is_none() || session == self.founder;
        if entitled && self.host != Some(session) {
            self.host = Some(session);
            vec![TableEvent::HostChanged { session }]
        } else {
            Vec::new()
        }
    }

    /// Removes a session from the room entirely: auto-folds a live hand,
    /// vacates the seat, drops pending requests, and hands off the host
    /// role. Used for both graceful leave and transport disconnect.
    pub fn leave(&mut self, session: SessionId) -> Result<Vec<TableEvent>, TableError> {
        let idx = self.idx(session).ok_or(TableError::NotInRoom)?;
        let mut events = Vec::new();
        self.requests.retain(|r| r.session() != session);
        if self.players[idx].seat().is_some() {
            events.extend(self.unseat(session));
        }
        let idx = self.idx(session).ok_or(TableError::NotInRoom)?;
        self.players.remove(idx);
        if self.host == Some(session) {
            self.host = self.players.first().map(Player::session);
            if let Some(heir) = self.host {
                events.push(TableEvent::HostChanged { session: heir });
            }
        }
        log::debug!("player {} left the room", session);
        Ok(events)
    }

    /// Vacates a seat without leaving the room. A live hand is auto-folded
    /// and the chips stay in the pot as dead money.
    pub fn leave_seat(&mut self, session: SessionId) -> Result<Vec<TableEvent>, TableError> {
        self.idx(session).ok_or(TableError::NotInRoom)?;
        self.seat_of(session).ok_or(TableError::NotSeated)?;
        Ok(self.unseat(session))
    }

    /// Shared seat-vacating path. Folds first if the player is live in a
    /// betting round, which may end the hand or advance the turn.
    fn unseat(&mut self, session: SessionId) -> Vec<TableEvent> {
        let mut events = Vec::new();
        let seat = match self.seat_of(session) {
            Some(seat) => seat,
            None => return events,
        };
        let idx = self.idx(session).expect("seated player is present");
        if self.players[idx].live() && self.phase.is_betting() {
            events.extend(self.force_fold(seat));
        }
        let idx = self.idx(session).expect("seated player is present");
        if self.players[idx].in_hand() && self.phase.is_betting() {
            let dead = self.players[idx].surrender();
            if dead > 0 {
                self.ghosts.push(dead);
            }
        }
        self.seats[seat] = None;
        self.players[idx].stand();
        events.push(TableEvent::SeatVacated { session, seat });
        events
    }
}

// ============================================================================
// Seat requests
// ============================================================================
impl Table {
    /// Queues a seat request, or seats the host immediately. Returns the
    /// request id when one was queued.
    pub fn request_seat(
        &mut self,
        session: SessionId,
        seat: Position,
        buyin: Chips,
    ) -> Result<(Option<ID<SeatRequest>>, Vec<TableEvent>), TableError> {
        let idx = self.idx(session).ok_or(TableError::NotInRoom)?;
        if self.players[idx].seat().is_some() {
            return Err(TableError::AlreadySeated);
        }
        if seat >= self.seats.len() {
            return Err(TableError::InvalidSeat);
        }
        if self.seats[seat].is_some() {
            return Err(TableError::SeatTaken);
        }
        let floor = MIN_BUYIN_BBS * self.blinds.1;
        if buyin < floor {
            return Err(TableError::MinBuyIn(floor));
        }
        self.requests.retain(|r| r.session() != session);
        if self.host == Some(session) {
            let events = self.seat_player(session, seat, buyin);
            return Ok((None, events));
        }
        let request = SeatRequest::new(session, seat, buyin);
        let id = request.id();
        self.requests.push(request);
        Ok((Some(id), vec![TableEvent::SeatRequested { session, seat }]))
    }

    /// Host approval: seats the requester with their proposed buy-in.
    pub fn approve_seat(
        &mut self,
        session: SessionId,
        id: ID<SeatRequest>,
    ) -> Result<Vec<TableEvent>, TableError> {
        self.require_host(session)?;
        let pos = self
            .requests
            .iter()
            .position(|r| r.id() == id)
            .ok_or(TableError::NoSuchRequest)?;
        let request = self.requests.remove(pos);
        if self.seats[request.seat()].is_some() {
            return Err(TableError::SeatTaken);
        }
        Ok(self.seat_player(request.session(), request.seat(), request.buyin()))
    }

    pub fn deny_seat(
        &mut self,
        session: SessionId,
        id: ID<SeatRequest>,
    ) -> Result<Vec<TableEvent>, TableError> {
        self.require_host(session)?;
        let pos = self
            .requests
            .iter()
            .position(|r| r.id() == id)
            .ok_or(TableError::NoSuchRequest)?;
        let request = self.requests.remove(pos);
        Ok(vec![TableEvent::SeatDenied {
            session: request.session(),
        }])
    }

    pub fn cancel_request(&mut self, session: SessionId) -> Result<(), TableError> {
        let before = self.requests.len();
        self.requests.retain(|r| r.session() != session);
        if self.requests.len() == before {
            return Err(TableError::NoSuchRequest);
        }
        Ok(())
    }

    fn seat_player(&mut self, session: SessionId, seat: Position, buyin: Chips) -> Vec<TableEvent> {
        let idx = self.idx(session).expect("requester is present");
        self.seats[seat] = Some(session);
        let hand_in_progress = self.hand_in_progress();
        self.players[idx].sit(seat, buyin, hand_in_progress);
        log::debug!("seated {} at seat {} for {}", session, seat, buyin);
        vec![TableEvent::SeatApproved {
            session,
            seat,
            buyin,
        }]
    }
}

// ============================================================================
// Game session controls
// ============================================================================
impl Table {
    pub fn start_game(&mut self, session: SessionId) -> Result<Vec<TableEvent>, TableError> {
        self.require_host(session)?;
        if self.running {
            return Err(TableError::GameAlreadyRunning);
        }
        if self.eligible_count() < MIN_PLAYERS {
            return Err(TableError::NotEnoughPlayers);
        }
        self.running = true;
        self.paused = false;
        Ok(Vec::new())
    }

    pub fn pause_game(&mut self, session: SessionId) -> Result<(), TableError> {
        self.require_host(session)?;
        if !self.running {
            return Err(TableError::GameNotRunning);
        }
        self.paused = true;
        Ok(())
    }

    pub fn resume_game(&mut self, session: SessionId) -> Result<(), TableError> {
        self.require_host(session)?;
        if !self.running {
            return Err(TableError::GameNotRunning);
        }
        self.paused = false;
        Ok(())
    }

    /// Stops the session. A hand in progress is destroyed: every present
    /// player's contribution is refunded so chips are conserved; dead
    /// money from departed players retires with them.
    pub fn stop_game(&mut self, session: SessionId) -> Result<Vec<TableEvent>, TableError> {
        self.require_host(session)?;
        if !self.running {
            return Err(TableError::GameNotRunning);
        }
        self.running = false;
        self.paused = false;
        let mut events = Vec::new();
        if self.phase.is_betting() {
            for player in self.players.iter_mut() {
                player.refund();
            }
            events.push(TableEvent::HandAborted);
        }
        self.clear_hand_state();
        Ok(events)
    }

    pub(crate) fn clear_hand_state(&mut self) {
        self.phase = Phase::Waiting;
        self.board = Board::empty();
        self.second = None;
        self.pot = 0;
        self.current_bet = 0;
        self.min_raise = self.blinds.1;
        self.turn = None;
        self.aggressor = None;
        self.acted.clear();
        self.opened.clear();
        self.capped = false;
        self.rit = Rit::default();
        self.showdown = None;
        self.ghosts.clear();
        for player in self.players.iter_mut() {
            player.reset_for_hand();
        }
    }

    pub(crate) fn require_host(&self, session: SessionId) -> Result<(), TableError> {
        if self.host == Some(session) {
            Ok(())
        } else {
            Err(TableError::NotHost)
        }
    }
}

// ============================================================================
// Showdown reveals
// ============================================================================
impl Table {
    pub fn show_hand(&mut self, session: SessionId) -> Result<(), TableError> {
        self.idx(session).ok_or(TableError::NotInRoom)?;
        let reveal = self
            .showdown
            .as_mut()
            .and_then(|s| s.reveal_mut(session))
            .ok_or(TableError::NotAtShowdown)?;
        reveal.shown = true;
        Ok(())
    }

    pub fn muck_hand(&mut self, session: SessionId) -> Result<(), TableError> {
        self.idx(session).ok_or(TableError::NotInRoom)?;
        let reveal = self
            .showdown
            .as_mut()
            .and_then(|s| s.reveal_mut(session))
            .ok_or(TableError::NotAtShowdown)?;
        if reveal.must_show {
            return Err(TableError::MustShow);
        }
        reveal.shown = false;
        Ok(())
    }
}

// ============================================================================
// Privileged mode
// ============================================================================
impl Table {
    /// The secret was already verified by the caller; this only flips the
    /// room flag. Privileged mode never affects outcomes except through an
    /// explicit rigged-hand fixture.
    pub fn enable_god(&mut self, session: SessionId) -> Result<(), TableError> {
        self.idx(session).ok_or(TableError::NotInRoom)?;
        self.god = Some(session);
        log::warn!("god mode enabled by {}", session);
        Ok(())
    }

    pub fn disable_god(&mut self, session: SessionId) -> Result<(), TableError> {
        if self.god != Some(session) {
            return Err(TableError::GodModeDisabled);
        }
        self.god = None;
        self.rigged = None;
        Ok(())
    }

    /// Stamps the next hand with a deterministic fixture for this session.
    pub fn set_rigged(&mut self, session: SessionId, fixture: Fixture) -> Result<(), TableError> {
        if self.god != Some(session) {
            return Err(TableError::GodModeDisabled);
        }
        self.rigged = Some((session, fixture));
        log::warn!("next hand rigged to {:?} for {}", fixture, session);
        Ok(())
    }
}

use super::command::Ack;
use super::command::CommandKind;
use super::command::TimerKind;
use super::event::GameEvent;
use super::journal::HandRecord;
use super::journal::Journal;
use super::message;
use super::message::ServerMessage;
use rvb_core::Chips;
use rvb_core::SessionId;
use rvb_cards::Hand;
use rvb_gameplay::Phase;
use rvb_gameplay::Table;
use rvb_gameplay::TableConfig;
use rvb_gameplay::TableError;
use rvb_gameplay::TableEvent;
use tokio::sync::mpsc::UnboundedSender;

/// Immutable parameters a room is opened with. The privileged-mode secret
/// arrives pre-digested; plaintext never lives in room state.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub code: String,
    pub name: String,
    pub seats: usize,
    pub small: Chips,
    pub big: Chips,
    pub founder: SessionId,
    pub secret: Option<Vec<u8>>,
}

/// Messages leaving a room for the fan-out layer. The room knows nothing
/// about connections; addressing is by session identity only.
#[derive(Debug)]
pub enum Outbound {
    Broadcast(ServerMessage),
    Unicast(SessionId, ServerMessage),
    /// A settled hand for the lobby's history endpoint.
    Journal(HandRecord),
    /// The room retired; the fan-out layer should forget it.
    Closed,
}

/// Command dispatch against one table, plus outbound message assembly.
///
/// Owned exclusively by a [`RoomActor`](super::actor::RoomActor) task;
/// everything here is synchronous.
pub struct Room {
    config: RoomConfig,
    table: Table,
    journal: Journal,
    outbox: UnboundedSender<Outbound>,
    finished: bool,
}

impl Room {
    pub fn new(config: RoomConfig, outbox: UnboundedSender<Outbound>) -> Self {
        let table = Table::new(TableConfig {
            seats: config.seats,
            small: config.small,
            big: config.big,
            founder: config.founder,
        });
        Self {
            config,
            table,
            journal: Journal::default(),
            outbox,
            finished: false,
        }
    }

    pub fn code(&self) -> &str {
        &self.config.code
    }
    pub fn table(&self) -> &Table {
        &self.table
    }
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Applies one client command and builds its ack. On success the
    /// resulting events and fresh state snapshots are pushed to the
    /// outbound stream before the ack is returned, so the sender's next
    /// read always reflects their own command.
    pub fn apply_client(&mut self, from: SessionId, kind: CommandKind) -> Ack {
        let result = self.dispatch(from, kind);
        match result {
            Ok((events, ack)) => {
                let mut events = events;
                events.extend(self.table.poll_begin());
                self.publish(events);
                self.push_states();
                ack
            }
            Err(error) => Ack::err(error),
        }
    }

    /// The transport lost this session: treat it as leaving the room.
    pub fn disconnect(&mut self, session: SessionId) {
        match self.table.leave(session) {
            Ok(events) => {
                let mut events = events;
                events.extend(self.table.poll_begin());
                self.publish(events);
                self.push_states();
            }
            Err(_) => log::debug!("[room {}] disconnect from non-member", self.code()),
        }
    }

    /// A timer fired. Ticks carry the hand they were scheduled in; a tick
    /// from a previous hand is stale and ignored. Reap is resolved by the
    /// actor, which owns the emptiness clock.
    pub fn tick(&mut self, kind: TimerKind, hand: u64) {
        if hand != self.table.hand_number() {
            return;
        }
        let before = self.table.phase();
        let events = match kind {
            TimerKind::Street => self.table.auto_deal(),
            TimerKind::Settle => self.table.next_hand(),
            TimerKind::RitExpiry => self.table.expire_rit(),
            TimerKind::Reap => return,
        };
        // a hand can settle into WAITING without producing any event
        if !events.is_empty() || self.table.phase() != before {
            self.publish(events);
            self.push_states();
        }
    }

    /// Marks the room closed and tells the fan-out layer to forget it.
    pub fn retire(&mut self) {
        self.finished = true;
        let _ = self.outbox.send(Outbound::Closed);
        log::info!("[room {}] reaped after grace period", self.code());
    }

    fn dispatch(
        &mut self,
        from: SessionId,
        kind: CommandKind,
    ) -> Result<(Vec<TableEvent>, Ack), TableError> {
        match kind {
            CommandKind::Join { name } => {
                let events = self.table.join(from, name)?;
                Ok((events, Ack::ok()))
            }
            CommandKind::Leave => {
                let events = self.table.leave(from)?;
                Ok((events, Ack::ok()))
            }
            CommandKind::RequestSeat { seat, buyin } => {
                let (id, events) = self.table.request_seat(from, seat, buyin)?;
                let ack = match id {
                    Some(id) => Ack::with("requestId", serde_json::json!(id.to_string())),
                    None => Ack::ok(),
                };
                Ok((events, ack))
            }
            CommandKind::ApproveSeat { request } => {
                let events = self.table.approve_seat(from, request)?;
                Ok((events, Ack::ok()))
            }
            CommandKind::DenySeat { request } => {
                let events = self.table.deny_seat(from, request)?;
                Ok((events, Ack::ok()))
            }
            CommandKind::CancelSeatRequest => {
                self.table.cancel_request(from)?;
                Ok((Vec::new(), Ack::ok()))
            }
            CommandKind::LeaveSeat => {
                let events = self.table.leave_seat(from)?;
                Ok((events, Ack::ok()))
            }
            CommandKind::StartGame => {
                let events = self.table.start_game(from)?;
                Ok((events, Ack::ok()))
            }
            CommandKind::PauseGame => {
                self.table.pause_game(from)?;
                Ok((Vec::new(), Ack::ok()))
            }
            CommandKind::ResumeGame => {
                self.table.resume_game(from)?;
                Ok((Vec::new(), Ack::ok()))
            }
            CommandKind::StopGame => {
                let events = self.table.stop_game(from)?;
                Ok((events, Ack::ok()))
            }
            CommandKind::PlayerAction { action } => {
                let events = self.table.apply(from, action)?;
                Ok((events, Ack::ok()))
            }
            CommandKind::ShowHand => {
                self.table.show_hand(from)?;
                Ok((Vec::new(), Ack::ok()))
            }
            CommandKind::MuckHand => {
                self.table.muck_hand(from)?;
                Ok((Vec::new(), Ack::ok()))
            }
            CommandKind::RitVote { accept } => {
                let events = self.table.vote_rit(from, accept)?;
                Ok((events, Ack::ok()))
            }
            CommandKind::GodEnable { secret } => {
                self.check_secret(&secret)?;
                self.table.enable_god(from)?;
                Ok((Vec::new(), Ack::ok()))
            }
            CommandKind::GodDisable => {
                self.table.disable_god(from)?;
                Ok((Vec::new(), Ack::ok()))
            }
            CommandKind::SetRiggedHand { fixture } => {
                self.table.set_rigged(from, fixture)?;
                Ok((Vec::new(), Ack::ok()))
            }
        }
    }

    /// Compares the offered secret against the configured digest. A room
    /// with no secret configured rejects everything.
    fn check_secret(&self, offered: &str) -> Result<(), TableError> {
        use sha2::Digest;
        let digest = sha2::Sha256::digest(offered.as_bytes()).to_vec();
        match &self.config.secret {
            Some(expected) if *expected == digest => Ok(()),
            _ => Err(TableError::BadSecret),
        }
    }

    fn name_of(&self, session: SessionId) -> String {
        self.table
            .player(session)
            .map(|p| p.name().to_string())
            .unwrap_or_default()
    }

    fn seat_name(&self, seat: rvb_core::Position) -> String {
        self.table
            .player_at(seat)
            .map(|p| p.name().to_string())
            .unwrap_or_default()
    }

    fn send(&self, outbound: Outbound) {
        let _ = self.outbox.send(outbound);
    }

    fn publish(&mut self, events: Vec<TableEvent>) {
        for event in events {
            self.announce(event);
        }
    }

    /// Translates one table event into wire messages. Showdowns and won
    /// hands also land in the journal.
    fn announce(&mut self, event: TableEvent) {
        let strings = |hand: Hand| {
            Vec::<rvb_cards::Card>::from(hand)
                .into_iter()
                .map(|c| c.to_string())
                .collect::<Vec<String>>()
        };
        match event {
            TableEvent::HandStarted {
                hand,
                dealer,
                small,
                big,
            } => self.broadcast(GameEvent::NewHand {
                hand,
                dealer,
                small_blind_seat: small,
                big_blind_seat: big,
            }),
            TableEvent::Busted { seats } => {
                let names = seats.iter().map(|(_, s)| self.name_of(*s)).collect();
                self.broadcast(GameEvent::PlayersBusted {
                    seats: seats.iter().map(|(seat, _)| *seat).collect(),
                    names,
                });
            }
            TableEvent::Posted { .. } => {}
            TableEvent::Acted {
                seat,
                action,
                paid,
                pot,
            } => self.broadcast(GameEvent::PlayerAction {
                seat,
                action: action.label().to_string(),
                amount: paid,
                pot,
            }),
            TableEvent::StreetDealt {
                phase,
                cards,
                second,
            } => {
                let cards = strings(cards);
                let second = second.map(strings);
                let event = match phase {
                    Phase::Flop => GameEvent::Flop { cards, second },
                    Phase::Turn => GameEvent::Turn { cards, second },
                    _ => GameEvent::River { cards, second },
                };
                self.broadcast(event);
            }
            TableEvent::RitOffered { voters } => {
                self.broadcast(GameEvent::RunItTwiceOffered { voters })
            }
            TableEvent::RitVoted { seat, accept } => {
                self.broadcast(GameEvent::RunItTwiceVote { seat, accept })
            }
            TableEvent::RitDecided { accepted } => {
                self.broadcast(GameEvent::RunItTwiceResult { accepted })
            }
            TableEvent::HandWon { seat, amount } => {
                self.broadcast(GameEvent::HandWon {
                    seat,
                    name: self.seat_name(seat),
                    amount,
                });
                self.settle_journal();
            }
            TableEvent::ShowdownStarted => {
                let state =
                    message::room_state(&self.config.code, &self.config.name, &self.table);
                if let Some(view) = state.showdown {
                    self.broadcast(GameEvent::Showdown(view));
                }
                self.settle_journal();
            }
            TableEvent::HostChanged { session } => {
                self.broadcast(GameEvent::HostChanged {
                    name: self.name_of(session),
                });
                self.send(Outbound::Unicast(session, ServerMessage::GameEvent(GameEvent::YouAreHost)));
            }
            TableEvent::SeatRequested { session, .. } => {
                let id = self
                    .table
                    .requests()
                    .iter()
                    .find(|r| r.session() == session)
                    .map(|r| rvb_core::Unique::id(r).to_string());
                let state =
                    message::room_state(&self.config.code, &self.config.name, &self.table);
                if let Some(view) = state
                    .requests
                    .into_iter()
                    .find(|r| Some(&r.request_id) == id.as_ref())
                {
                    self.broadcast(GameEvent::SeatRequested(view));
                }
            }
            TableEvent::SeatApproved {
                session,
                seat,
                buyin,
            } => self.broadcast(GameEvent::SeatApproved {
                name: self.name_of(session),
                seat,
                buy_in: buyin,
            }),
            TableEvent::SeatDenied { session } => self.broadcast(GameEvent::SeatDenied {
                name: self.name_of(session),
            }),
            TableEvent::SeatVacated { .. } => {}
            TableEvent::HandAborted => self.broadcast(GameEvent::HandAborted),
        }
    }

    fn settle_journal(&mut self) {
        if let Some(record) = HandRecord::settle(&self.table) {
            self.send(Outbound::Journal(record.clone()));
            self.journal.record(record);
        }
    }

    fn broadcast(&self, event: GameEvent) {
        self.send(Outbound::Broadcast(ServerMessage::GameEvent(event)));
    }

    /// Pushes the public snapshot and every member's private snapshot.
    fn push_states(&self) {
        let state = message::room_state(&self.config.code, &self.config.name, &self.table);
        self.send(Outbound::Broadcast(ServerMessage::RoomState(state)));
        for player in self.table.players() {
            let view = message::player_state(
                &self.config.code,
                &self.config.name,
                &self.table,
                player.session(),
            );
            self.send(Outbound::Unicast(
                player.session(),
                ServerMessage::PlayerState(view),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvb_gameplay::Action;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::sync::mpsc::unbounded_channel;

    fn room() -> (Room, UnboundedReceiver<Outbound>, SessionId) {
        let founder = SessionId::default();
        let (tx, rx) = unbounded_channel();
        let room = Room::new(
            RoomConfig {
                code: "QK2J9".into(),
                name: "den".into(),
                seats: 8,
                small: 10,
                big: 20,
                founder,
                secret: Some(sha256("hunter2")),
            },
            tx,
        );
        (room, rx, founder)
    }

    fn sha256(s: &str) -> Vec<u8> {
        use sha2::Digest;
        sha2::Sha256::digest(s.as_bytes()).to_vec()
    }

    fn drain(rx: &mut UnboundedReceiver<Outbound>) -> Vec<Outbound> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    #[test]
    fn join_broadcasts_room_state() {
        let (mut room, mut rx, founder) = room();
        let ack = room.apply_client(founder, CommandKind::Join { name: "alice".into() });
        assert!(ack.success);
        let out = drain(&mut rx);
        assert!(out.iter().any(|m| matches!(
            m,
            Outbound::Broadcast(ServerMessage::RoomState(_))
        )));
        assert!(out.iter().any(|m| matches!(
            m,
            Outbound::Unicast(s, ServerMessage::GameEvent(GameEvent::YouAreHost)) if *s == founder
        )));
    }

    #[test]
    fn errors_ack_without_state_push() {
        let (mut room, mut rx, founder) = room();
        room.apply_client(founder, CommandKind::Join { name: "alice".into() });
        drain(&mut rx);
        let stranger = SessionId::default();
        let ack = room.apply_client(stranger, CommandKind::StartGame);
        assert!(!ack.success);
        assert_eq!(ack.error.as_deref(), Some("only the host can do that"));
        assert!(drain(&mut rx).is_empty(), "failed commands push nothing");
    }

    #[test]
    fn full_heads_up_hand_over_commands() {
        let (mut room, mut rx, founder) = room();
        room.apply_client(founder, CommandKind::Join { name: "alice".into() });
        let bob = SessionId::default();
        room.apply_client(bob, CommandKind::Join { name: "bob".into() });
        // host seats themselves, approves bob
        let ack = room.apply_client(founder, CommandKind::RequestSeat { seat: 0, buyin: 1000 });
        assert!(ack.success);
        let ack = room.apply_client(bob, CommandKind::RequestSeat { seat: 1, buyin: 1000 });
        let id = ack.body.get("requestId").unwrap().as_str().unwrap().to_string();
        let request = rvb_core::ID::from(uuid::Uuid::parse_str(&id).unwrap());
        let ack = room.apply_client(founder, CommandKind::ApproveSeat { request });
        assert!(ack.success);
        drain(&mut rx);
        // start: the hand deals immediately
        let ack = room.apply_client(founder, CommandKind::StartGame);
        assert!(ack.success);
        let out = drain(&mut rx);
        assert!(out.iter().any(|m| matches!(
            m,
            Outbound::Broadcast(ServerMessage::GameEvent(GameEvent::NewHand { .. }))
        )));
        // dealer (alice, seat 0) folds the small blind heads-up
        let ack = room.apply_client(founder, CommandKind::PlayerAction { action: Action::Fold });
        assert!(ack.success);
        let out = drain(&mut rx);
        assert!(out.iter().any(|m| matches!(
            m,
            Outbound::Broadcast(ServerMessage::GameEvent(GameEvent::HandWon { seat: 1, amount: 30, .. }))
        )));
        assert!(out.iter().any(|m| matches!(m, Outbound::Journal(_))));
    }

    #[test]
    fn out_of_turn_action_is_refused() {
        let (mut room, _rx, founder) = room();
        room.apply_client(founder, CommandKind::Join { name: "alice".into() });
        let bob = SessionId::default();
        room.apply_client(bob, CommandKind::Join { name: "bob".into() });
        room.apply_client(founder, CommandKind::RequestSeat { seat: 0, buyin: 1000 });
        let ack = room.apply_client(bob, CommandKind::RequestSeat { seat: 1, buyin: 1000 });
        let id = ack.body.get("requestId").unwrap().as_str().unwrap().to_string();
        let request = rvb_core::ID::from(uuid::Uuid::parse_str(&id).unwrap());
        room.apply_client(founder, CommandKind::ApproveSeat { request });
        room.apply_client(founder, CommandKind::StartGame);
        let ack = room.apply_client(bob, CommandKind::PlayerAction { action: Action::Check });
        assert!(!ack.success);
        assert_eq!(ack.error.as_deref(), Some("not your turn"));
    }

    #[test]
    fn god_mode_needs_the_right_secret() {
        let (mut room, _rx, founder) = room();
        room.apply_client(founder, CommandKind::Join { name: "alice".into() });
        let ack = room.apply_client(founder, CommandKind::GodEnable { secret: "wrong".into() });
        assert!(!ack.success);
        assert_eq!(ack.error.as_deref(), Some("nice try"));
        let ack = room.apply_client(founder, CommandKind::GodEnable { secret: "hunter2".into() });
        assert!(ack.success);
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let (mut room, mut rx, founder) = room();
        room.apply_client(founder, CommandKind::Join { name: "alice".into() });
        drain(&mut rx);
        room.tick(TimerKind::Street, 99);
        room.tick(TimerKind::Settle, 99);
        assert!(drain(&mut rx).is_empty());
    }
}

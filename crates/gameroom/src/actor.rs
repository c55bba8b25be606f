use super::command::Command;
use super::command::TimerKind;
use super::room::Outbound;
use super::room::Room;
use super::room::RoomConfig;
use rvb_core::REAP_GRACE;
use rvb_core::RIT_WINDOW;
use rvb_core::SETTLE_DELAY;
use rvb_core::STREET_DELAY;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// The single-writer task that owns one room.
///
/// Commands from every connection funnel into one unbounded queue and are
/// applied strictly in arrival order; all timers post ticks back into the
/// same queue. Nothing else ever touches the table, which is what makes
/// the betting, side-pot, and showdown bookkeeping race-free by
/// construction.
pub struct RoomActor {
    room: Room,
    rx: UnboundedReceiver<Command>,
    tx: UnboundedSender<Command>,
    // dedup keys so each pending delay is scheduled exactly once
    street_key: Option<(u64, usize)>,
    settle_key: Option<u64>,
    rit_key: Option<u64>,
    emptied_at: Option<tokio::time::Instant>,
}

impl RoomActor {
    /// Spawns the room task and returns its command inlet.
    pub fn spawn(config: RoomConfig, outbox: UnboundedSender<Outbound>) -> UnboundedSender<Command> {
        let (tx, rx) = unbounded_channel();
        let actor = Self {
            room: Room::new(config, outbox),
            rx,
            tx: tx.clone(),
            street_key: None,
            settle_key: None,
            rit_key: None,
            emptied_at: None,
        };
        tokio::spawn(actor.run());
        tx
    }

    async fn run(mut self) {
        log::debug!("[room {}] actor started", self.room.code());
        // a newborn room is empty: its reap clock starts immediately
        self.schedule();
        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Client { from, kind, ack } => {
                    let reply = self.room.apply_client(from, kind);
                    let _ = ack.send(reply);
                }
                Command::Disconnect { session } => self.room.disconnect(session),
                Command::Tick { kind, hand } => self.handle_tick(kind, hand),
            }
            self.schedule();
            if self.room.finished() {
                break;
            }
        }
        log::debug!("[room {}] actor stopped", self.room.code());
    }

    fn handle_tick(&mut self, kind: TimerKind, hand: u64) {
        // consume the dedup key so the next transition can re-arm
        match kind {
            TimerKind::Street => self.street_key = None,
            TimerKind::Settle => self.settle_key = None,
            TimerKind::RitExpiry => self.rit_key = None,
            TimerKind::Reap => {
                // retire only if the room sat empty through the full grace
                let expired = self
                    .emptied_at
                    .map(|t| t.elapsed() >= REAP_GRACE)
                    .unwrap_or(false);
                if self.room.table().is_empty() && expired {
                    self.room.retire();
                }
                return;
            }
        }
        self.room.tick(kind, hand);
    }

    /// Arms whatever delayed work the current state calls for. Ticks are
    /// validated against state when they fire, so arming is idempotent
    /// and cancellation is just the state moving on.
    fn schedule(&mut self) {
        let table = self.room.table();
        let hand = table.hand_number();
        if table.pending_auto_street() {
            let dealt = table.board().size()
                + table.second_board().map(|b| b.size()).unwrap_or(0);
            let key = (hand, dealt);
            if self.street_key != Some(key) {
                self.street_key = Some(key);
                self.delay(STREET_DELAY, TimerKind::Street, hand);
            }
        }
        if table.awaiting_settle() && self.settle_key != Some(hand) {
            self.settle_key = Some(hand);
            self.delay(SETTLE_DELAY, TimerKind::Settle, hand);
        }
        if table.rit().open() && self.rit_key != Some(hand) {
            self.rit_key = Some(hand);
            self.delay(RIT_WINDOW, TimerKind::RitExpiry, hand);
        }
        if table.is_empty() {
            if self.emptied_at.is_none() {
                self.emptied_at = Some(tokio::time::Instant::now());
                self.delay(REAP_GRACE, TimerKind::Reap, hand);
            }
        } else {
            self.emptied_at = None;
        }
    }

    fn delay(&self, after: Duration, kind: TimerKind, hand: u64) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(Command::Tick { kind, hand });
        });
    }
}

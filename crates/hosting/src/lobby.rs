use super::sessions::Sessions;
use rvb_core::Chips;
use rvb_core::DEFAULT_SEATS;
use rvb_core::JOURNAL_DEPTH;
use rvb_core::SessionId;
use rvb_gameroom::Command;
use rvb_gameroom::HandRecord;
use rvb_gameroom::Outbound;
use rvb_gameroom::RoomActor;
use rvb_gameroom::RoomConfig;
use rvb_gameroom::RoomStateView;
use rvb_gameroom::ServerMessage;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::RwLock;
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Per-connection outbound sink: a bounded buffer of JSON frames.
pub type Sink = Sender<String>;

/// One public room directory row.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub room_id: String,
    pub name: String,
    pub seats_taken: usize,
    pub seats_total: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub running: bool,
}

#[derive(Clone)]
struct RoomEntry {
    name: String,
    tx: UnboundedSender<Command>,
    members: Arc<Mutex<HashMap<SessionId, Sink>>>,
    history: Arc<Mutex<Vec<HandRecord>>>,
    directory: Arc<Mutex<DirectoryEntry>>,
}

/// The public room table and the fan-out pumps behind it.
///
/// The only cross-room shared structure in the process: insert, lookup,
/// and removal are short critical sections. Each room's pump task
/// subscribes to its actor's outbound stream and resolves sessions to
/// live connection sinks; a sink whose buffer is full is dropped on the
/// spot rather than ever slowing the room down.
pub struct Lobby {
    rooms: RwLock<HashMap<String, RoomEntry>>,
    sessions: Sessions,
    secret: Option<Vec<u8>>,
}

impl Lobby {
    /// The privileged-mode secret is digested once here; rooms only ever
    /// see the digest.
    pub fn new(secret: Option<&str>) -> Self {
        use sha2::Digest;
        Self {
            rooms: RwLock::new(HashMap::new()),
            sessions: Sessions::default(),
            secret: secret.map(|s| sha2::Sha256::digest(s.as_bytes()).to_vec()),
        }
    }

    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    /// Opens a room: spawns its actor and fan-out pump, and returns the
    /// shareable room code. The creator's session is the recorded
    /// original host.
    pub async fn open(
        self: &Arc<Self>,
        name: &str,
        founder: SessionId,
        small: Chips,
        big: Chips,
        seats: Option<usize>,
    ) -> String {
        let code = self.fresh_code().await;
        let (out_tx, out_rx) = unbounded_channel();
        let tx = RoomActor::spawn(
            RoomConfig {
                code: code.clone(),
                name: name.to_string(),
                seats: seats.unwrap_or(DEFAULT_SEATS),
                small,
                big,
                founder,
                secret: self.secret.clone(),
            },
            out_tx,
        );
        let entry = RoomEntry {
            name: name.to_string(),
            tx,
            members: Arc::new(Mutex::new(HashMap::new())),
            history: Arc::new(Mutex::new(Vec::new())),
            directory: Arc::new(Mutex::new(DirectoryEntry {
                room_id: code.clone(),
                name: name.to_string(),
                seats_total: seats.unwrap_or(DEFAULT_SEATS),
                small_blind: small,
                big_blind: big,
                ..DirectoryEntry::default()
            })),
        };
        self.rooms.write().await.insert(code.clone(), entry.clone());
        let lobby = Arc::clone(self);
        let pumped = code.clone();
        tokio::spawn(async move { lobby.pump(pumped, entry, out_rx).await });
        log::info!("[lobby] opened room {} ({})", code, name);
        code
    }

    /// Registers a connection's sink with a room and returns the room's
    /// command inlet. `None` when the room does not exist.
    pub async fn attach(
        &self,
        code: &str,
        session: SessionId,
        sink: Sink,
    ) -> Option<UnboundedSender<Command>> {
        let rooms = self.rooms.read().await;
        let entry = rooms.get(code)?;
        entry
            .members
            .lock()
            .expect("members lock")
            .insert(session, sink);
        Some(entry.tx.clone())
    }

    /// Forgets a connection's sink without touching room state.
    pub async fn detach(&self, code: &str, session: SessionId) {
        if let Some(entry) = self.rooms.read().await.get(code) {
            entry.members.lock().expect("members lock").remove(&session);
        }
    }

    pub async fn exists(&self, code: &str) -> bool {
        self.rooms.read().await.contains_key(code)
    }

    /// The public room directory.
    pub async fn list(&self) -> Vec<DirectoryEntry> {
        self.rooms
            .read()
            .await
            .values()
            .map(|entry| entry.directory.lock().expect("directory lock").clone())
            .collect()
    }

    /// Recent settled hands for one room, newest first.
    pub async fn history(&self, code: &str) -> Option<Vec<HandRecord>> {
        let rooms = self.rooms.read().await;
        let entry = rooms.get(code)?;
        let mut history = entry.history.lock().expect("history lock").clone();
        history.reverse();
        Some(history)
    }

    async fn fresh_code(&self) -> String {
        loop {
            let code = Self::code();
            if !self.rooms.read().await.contains_key(&code) {
                return code;
            }
        }
    }

    /// Five characters of uppercase alphanumerics: short enough to share
    /// out loud, long enough to not collide in practice.
    fn code() -> String {
        use rand::Rng;
        rand::rng()
            .sample_iter(rand::distr::Alphanumeric)
            .map(char::from)
            .map(|c| c.to_ascii_uppercase())
            .take(5)
            .collect()
    }

    /// Drains one room's outbound stream until the room retires.
    async fn pump(
        self: Arc<Self>,
        code: String,
        entry: RoomEntry,
        mut rx: UnboundedReceiver<Outbound>,
    ) {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Broadcast(message) => {
                    if let ServerMessage::RoomState(view) = &message {
                        self.observe(&entry, view);
                    }
                    self.fan(&entry, None, &message);
                }
                Outbound::Unicast(session, message) => {
                    self.fan(&entry, Some(session), &message);
                }
                Outbound::Journal(record) => {
                    let mut history = entry.history.lock().expect("history lock");
                    if history.len() == JOURNAL_DEPTH {
                        history.remove(0);
                    }
                    history.push(record);
                }
                Outbound::Closed => break,
            }
        }
        entry.members.lock().expect("members lock").clear();
        self.rooms.write().await.remove(&code);
        log::info!("[lobby] removed room {} ({})", code, entry.name);
    }

    /// Keeps the directory row current from the public snapshots.
    fn observe(&self, entry: &RoomEntry, view: &RoomStateView) {
        let mut directory = entry.directory.lock().expect("directory lock");
        directory.seats_taken = view.seats.iter().flatten().count();
        directory.seats_total = view.seats.len();
        directory.running = view.running;
    }

    /// Delivers one message to one sink or all of them. A full or closed
    /// buffer marks the connection dead: it is detached and the room is
    /// told the session disconnected.
    fn fan(&self, entry: &RoomEntry, target: Option<SessionId>, message: &ServerMessage) {
        let json = message.to_json();
        let mut dead = Vec::new();
        {
            let members = entry.members.lock().expect("members lock");
            let recipients: Vec<(&SessionId, &Sink)> = match &target {
                Some(session) => members.get_key_value(session).into_iter().collect(),
                None => members.iter().collect(),
            };
            for (session, sink) in recipients {
                if sink.try_send(json.clone()).is_err() {
                    dead.push(*session);
                }
            }
        }
        for session in dead {
            log::warn!("[lobby] dropping slow or dead connection for {}", session);
            entry.members.lock().expect("members lock").remove(&session);
            let _ = entry.tx.send(Command::Disconnect { session });
        }
    }
}

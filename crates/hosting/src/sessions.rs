use rvb_core::ConnectionId;
use rvb_core::SessionId;
use std::collections::HashMap;
use std::sync::Mutex;

/// What the layer knows about one durable session.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub connection: ConnectionId,
    pub room: Option<String>,
    pub name: String,
}

/// Session ⇄ connection ⇄ room registries.
///
/// Sessions are durable (one per browser), connections are volatile (one
/// per socket). All access is short mutex sections; no lock is ever held
/// across an await.
#[derive(Debug, Default)]
pub struct Sessions {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<SessionId, SessionEntry>,
    connections: HashMap<ConnectionId, SessionId>,
}

/// Why a join was refused at the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinRefusal {
    /// The same session already has a different live connection in this
    /// room (two tabs).
    DuplicateTab,
}

impl std::fmt::Display for JoinRefusal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::DuplicateTab => write!(f, "already in this room in another tab"),
        }
    }
}

impl Sessions {
    /// Binds a session to a room through a connection. Rejects a second
    /// live connection for the same session in the same room; a rebind
    /// from a dead connection (reconnect) goes through.
    pub fn join_room(
        &self,
        session: SessionId,
        connection: ConnectionId,
        room: &str,
        name: &str,
    ) -> Result<(), JoinRefusal> {
        let mut inner = self.inner.lock().expect("sessions lock");
        if let Some(entry) = inner.sessions.get(&session) {
            let other_live = entry.connection != connection
                && inner.connections.contains_key(&entry.connection);
            if other_live && entry.room.as_deref() == Some(room) {
                return Err(JoinRefusal::DuplicateTab);
            }
        }
        inner.connections.insert(connection, session);
        inner.sessions.insert(
            session,
            SessionEntry {
                connection,
                room: Some(room.to_string()),
                name: name.to_string(),
            },
        );
        Ok(())
    }

    /// Graceful leave: the session forgets its room but stays known.
    pub fn leave_room(&self, session: SessionId) {
        let mut inner = self.inner.lock().expect("sessions lock");
        if let Some(entry) = inner.sessions.get_mut(&session) {
            entry.room = None;
        }
    }

    /// A transport connection died. Returns the session it carried and
    /// the room that session was in, for the caller to notify.
    pub fn drop_connection(&self, connection: ConnectionId) -> Option<(SessionId, Option<String>)> {
        let mut inner = self.inner.lock().expect("sessions lock");
        let session = inner.connections.remove(&connection)?;
        let room = inner
            .sessions
            .get(&session)
            .filter(|e| e.connection == connection)
            .and_then(|e| e.room.clone());
        let stale = inner
            .sessions
            .get(&session)
            .map(|e| e.connection == connection)
            .unwrap_or(false);
        if stale {
            inner.sessions.remove(&session);
        }
        Some((session, room))
    }

    pub fn entry(&self, session: SessionId) -> Option<SessionEntry> {
        self.inner
            .lock()
            .expect("sessions lock")
            .sessions
            .get(&session)
            .cloned()
    }
}

//! Core type aliases, typed identifiers, and constants for riverboat.
//!
//! Everything here is shared by every other crate in the workspace: the
//! chip/seat aliases, the `ID<T>` wrapper that keeps session ids and
//! connection ids from being confused for one another, and the table of
//! tunable constants for the room engine.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Chip amounts: bankrolls, bets, pots. Never negative; all debits are
/// clamped against the remaining stack before subtraction.
pub type Chips = u32;
/// Seat index around the table.
pub type Position = usize;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for tests and property-style loops.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
///
/// Manual trait impls because derives would demand `T: Clone` etc. on the
/// phantom marker.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        uuid::Uuid::deserialize(deserializer).map(Self::from)
    }
}

/// Marker for the durable per-browser session identity.
pub struct Session;
/// Marker for the volatile per-socket connection identity.
pub struct Connection;

/// Durable identity: generated once per browser session, survives reconnects.
pub type SessionId = ID<Session>;
/// Volatile identity: one per live transport connection.
pub type ConnectionId = ID<Connection>;

// ============================================================================
// TABLE PARAMETERS
// ============================================================================
/// Hard ceiling on seats at one table.
pub const MAX_SEATS: usize = 10;
/// Seats at a freshly created table unless the creator asks otherwise.
pub const DEFAULT_SEATS: usize = 8;
/// A hand needs at least this many eligible seated players.
pub const MIN_PLAYERS: usize = 2;
/// Display names are 1..=NAME_MAX visible characters.
pub const NAME_MAX: usize = 15;
/// Minimum buy-in, expressed in big blinds.
pub const MIN_BUYIN_BBS: Chips = 10;
/// Default blind schedule for new rooms.
pub const DEFAULT_SMALL_BLIND: Chips = 10;
pub const DEFAULT_BIG_BLIND: Chips = 20;

// ============================================================================
// TIMER SCHEDULE
// All delays surface as Tick commands back into the owning room actor.
// ============================================================================
/// Pause between automatically dealt streets when everyone is all-in.
pub const STREET_DELAY: std::time::Duration = std::time::Duration::from_millis(1200);
/// Display delay between settling a hand and starting the next.
pub const SETTLE_DELAY: std::time::Duration = std::time::Duration::from_secs(4);
/// Voting window for a run-it-twice offer.
pub const RIT_WINDOW: std::time::Duration = std::time::Duration::from_secs(15);
/// Grace period before an empty room is reaped.
pub const REAP_GRACE: std::time::Duration = std::time::Duration::from_secs(60);
/// Outbound messages buffered per connection before it is dropped as slow.
pub const SEND_BUFFER: usize = 64;
/// Settled hands retained in a room's in-memory journal.
pub const JOURNAL_DEPTH: usize = 32;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize logging for the server binary.
///
/// The terminal level comes from `RUST_LOG` (default `info`); room-scoped
/// lines are prefixed `[room CODE]` by their emitters. Set `LOG_FILE` to
/// additionally capture a full debug trace to a single file, which is the
/// usual way to keep a hand-by-hand record of a session.
#[cfg(feature = "server")]
pub fn log() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(log::LevelFilter::Info);
    let config = simplelog::ConfigBuilder::new()
        .set_target_level(log::LevelFilter::Error)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let mut sinks: Vec<Box<dyn simplelog::SharedLogger>> = vec![simplelog::TermLogger::new(
        level,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];
    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = std::fs::File::create(&path)
            .unwrap_or_else(|e| panic!("cannot create log file {}: {}", path, e));
        sinks.push(simplelog::WriteLogger::new(
            log::LevelFilter::Debug,
            config,
            file,
        ));
    }
    simplelog::CombinedLogger::init(sinks).expect("logger already initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct() {
        let a = SessionId::default();
        let b = SessionId::default();
        assert!(a != b);
    }

    #[test]
    fn id_uuid_roundtrip() {
        let id = ConnectionId::default();
        assert_eq!(id, ConnectionId::from(uuid::Uuid::from(id)));
    }

    #[test]
    fn v7_ids_are_ordered_by_creation() {
        let a = SessionId::default();
        let b = SessionId::default();
        assert!(a < b);
    }
}

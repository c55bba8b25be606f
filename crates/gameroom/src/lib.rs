//! Single-writer room actor and wire protocol.
//!
//! One tokio task per room owns a [`Table`](rvb_gameplay::Table) and
//! serializes every external command and timer tick against it. State
//! changes fan out as typed messages on the room's outbound stream; the
//! actor itself holds no reference to any transport.
//!
//! ## Architecture
//!
//! - [`Command`] — everything that can enter a room: client commands with
//!   ack channels, disconnects, and timer ticks
//! - [`Room`] — command dispatch against the table, message assembly
//! - [`RoomActor`] — the task: serialize, schedule timers, emit outbound
//! - [`Protocol`] — client JSON ⇄ typed commands
//! - [`ServerMessage`] / [`GameEvent`] — everything the server sends
//! - [`Journal`] — in-memory ring of settled hands

mod actor;
mod command;
mod event;
mod journal;
mod message;
mod protocol;
mod room;

pub use actor::*;
pub use command::*;
pub use event::*;
pub use journal::*;
pub use message::*;
pub use protocol::*;
pub use room::*;

//! Session registry, room lobby, and WebSocket fan-out.
//!
//! This layer maps durable session identities onto volatile connection
//! identities and routes room traffic both ways: inbound frames become
//! typed commands for the owning room actor, and the actor's outbound
//! stream fans out to per-connection bounded buffers. A connection that
//! cannot keep up is dropped rather than ever backpressuring a room.
//!
//! ## Architecture
//!
//! - [`Sessions`] — session ⇄ connection ⇄ room registries
//! - [`Lobby`] — the public room table: open, look up, list, reap
//! - [`serve`] — the per-connection WebSocket task

mod bridge;
mod lobby;
mod sessions;

pub use bridge::*;
pub use lobby::*;
pub use sessions::*;

//! Wire types for the game bridge protocol.
//!
//! This crate contains the serde-serializable frames exchanged with the game
//! bridge over a WebSocket. The bridge speaks the game's own protocol and runs
//! pathfinding; this side only sees lifecycle events and issues intents.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * Tagged: every frame is a JSON object with a snake_case `type` field
//! * Stable: Changes only when the bridge protocol changes
//!
//! Session policy (presence, auth, idle actions) is built on top of these types in `afk-rs`.

pub mod command;
pub mod event;
pub mod types;

pub use command::*;
pub use event::*;
pub use types::*;

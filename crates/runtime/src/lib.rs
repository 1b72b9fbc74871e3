//! Game bridge connection plumbing.
//!
//! A session talks to the game through a [`ClientLink`]: an outbound command
//! channel and an inbound event channel. [`Connector`] implementations open
//! links; [`BridgeConnector`] speaks JSON frames over a WebSocket and
//! [`fake::FakeConnector`] hands out in-memory links for tests.

pub mod bridge;
pub mod error;
pub mod fake;
pub mod link;

pub use bridge::BridgeConnector;
pub use error::{Result, TransportError};
pub use link::{BoxFuture, ClientLink, Connector};

//! Session lifecycle and anti-idle policy engine.
//!
//! `afk` keeps an unattended game client connected to a server while staying
//! out of the way of real players. The engine never speaks the game protocol
//! itself; it drives a session client through an [`afk_runtime::ClientLink`]
//! and decides *when* to connect, what idle input to synthesize, how to
//! answer the server's auth plugin, and when to leave.
//!
//! # Architecture
//!
//! * [`config`] - validated settings document shared by every session
//! * [`session`] - the per-connection state machine
//! * [`idle`], [`chat`], [`auth`], [`presence`] - features driven by a session
//! * [`timer`] - cancellable timers that post back into a session's inbox
//! * [`reconnect`], [`supervisor`] - the connect/backoff loop
//! * [`monitor`] - process-wide liveness timestamps and the gap alert
//! * [`notify`] - operator notification sink
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use afk::{BotConfig, NullNotifier, Supervisor};
//! use afk_runtime::BridgeConnector;
//!
//! let config = Arc::new(BotConfig::load("settings.json".as_ref())?);
//! let connector = Arc::new(BridgeConnector::new("ws://127.0.0.1:8790"));
//! let supervisor = Supervisor::new(config, connector, Arc::new(NullNotifier));
//! supervisor.run(tokio_util::sync::CancellationToken::new()).await;
//! ```

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod idle;
pub mod monitor;
pub mod notify;
pub mod presence;
pub mod reconnect;
pub mod session;
pub mod supervisor;
pub mod timer;

pub use auth::{AuthPolicy, AuthSequencer, FirstChatLine, ResponseCorrelation, StepOutcome};
pub use chat::ChatBroadcaster;
pub use config::BotConfig;
pub use error::{Error, Result};
pub use idle::{IdleActionSet, IdleScheduler, PulseTracker};
pub use monitor::{CronMonitor, LivenessState, SharedLiveness};
pub use notify::{Notifier, NullNotifier, RecordingNotifier};
pub use presence::PresenceMonitor;
pub use reconnect::ReconnectPolicy;
pub use session::{Phase, Session, SessionEnd, SessionInput, SessionOutcome, SessionState, TimerEvent};
pub use supervisor::Supervisor;
pub use timer::TimerScope;

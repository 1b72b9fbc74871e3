use std::collections::BTreeSet;
use std::fmt;

use afk_protocol::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	/// Waiting for the client to spawn.
	Connecting,
	Active,
	/// Releasing controls and disconnecting because a real player is present.
	LeavingForConflict,
	Disconnected,
}

/// Mutable per-session view of the world.
#[derive(Debug, Clone)]
pub struct SessionState {
	pub phase: Phase,
	/// Set at most once, by the first conflict-leave.
	pub left_due_to_conflict: bool,
	pub self_position: Option<Position>,
	/// Last seen players other than the bot.
	pub peers: BTreeSet<String>,
	pub username: String,
}

impl SessionState {
	pub fn new(username: impl Into<String>) -> Self {
		Self {
			phase: Phase::Connecting,
			left_due_to_conflict: false,
			self_position: None,
			peers: BTreeSet::new(),
			username: username.into(),
		}
	}
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
	/// The bot left to make room for a real player.
	ConflictLeave(String),
	/// The connection closed or the client reported a disconnect.
	Closed(String),
	Kicked(String),
	/// The client never spawned within the connect timeout.
	ConnectTimeout,
	/// No link could be opened.
	ConnectFailed(String),
	Shutdown,
}

impl fmt::Display for SessionEnd {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SessionEnd::ConflictLeave(reason) => write!(f, "left for another player ({reason})"),
			SessionEnd::Closed(reason) => write!(f, "disconnected ({reason})"),
			SessionEnd::Kicked(reason) => write!(f, "kicked ({reason})"),
			SessionEnd::ConnectTimeout => f.write_str("connect timed out"),
			SessionEnd::ConnectFailed(reason) => write!(f, "connect failed ({reason})"),
			SessionEnd::Shutdown => f.write_str("shut down"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
	pub end: SessionEnd,
	pub left_due_to_conflict: bool,
}

impl SessionOutcome {
	pub fn connect_failed(reason: impl Into<String>) -> Self {
		Self {
			end: SessionEnd::ConnectFailed(reason.into()),
			left_due_to_conflict: false,
		}
	}
}

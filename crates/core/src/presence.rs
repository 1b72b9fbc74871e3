//! Detects real players sharing the server with the bot.

use afk_protocol::Peer;

/// Decides when another player's presence requires the bot to leave.
#[derive(Debug, Clone)]
pub struct PresenceMonitor {
	self_name: String,
	enabled: bool,
}

impl PresenceMonitor {
	pub fn new(self_name: impl Into<String>, enabled: bool) -> Self {
		Self {
			self_name: self_name.into(),
			enabled,
		}
	}

	pub fn is_self(&self, name: &str) -> bool {
		name == self.self_name
	}

	/// Checks the peer set reported at spawn; returns the leave reason, if any.
	pub fn initial_conflict(&self, peers: &[Peer]) -> Option<String> {
		if !self.enabled {
			return None;
		}
		let others: Vec<&str> = peers
			.iter()
			.map(|peer| peer.username.as_str())
			.filter(|name| !self.is_self(name))
			.collect();
		if others.is_empty() {
			None
		} else {
			Some(format!("pre-existing peer(s): {}", others.join(", ")))
		}
	}

	/// Returns the leave reason when `name` is someone other than the bot.
	pub fn on_peer_joined(&self, name: &str) -> Option<String> {
		if !self.enabled || self.is_self(name) {
			return None;
		}
		Some(format!("peer `{name}` joined"))
	}
}

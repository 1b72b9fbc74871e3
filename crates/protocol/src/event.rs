//! Events pushed by the bridge.

use serde::{Deserialize, Serialize};

use crate::types::{Peer, Position};

/// Lifecycle and world events emitted by the bridge for one session.
///
/// Frames are tagged by `type`:
/// ```json
/// { "type": "peer_joined", "peer": { "username": "Steve" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
	/// The client spawned in the world; carries the peer set at that moment.
	Connected {
		username: String,
		#[serde(default)]
		peers: Vec<Peer>,
		#[serde(default)]
		position: Option<Position>,
	},
	/// The connection ended.
	Disconnected { reason: String },
	/// The server removed the client.
	Kicked { reason: String },
	/// Non-terminal client error.
	Error { message: String },
	/// A chat line; `sender` is absent for server/system lines.
	Chat {
		#[serde(default)]
		sender: Option<String>,
		message: String,
	},
	PeerJoined { peer: Peer },
	PeerLeft { peer: Peer },
	Moved { position: Position },
	/// The last navigation goal was reached.
	GoalReached,
	DiedAndRespawned,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn connected_frame_defaults_optional_fields() {
		let event: ClientEvent = serde_json::from_value(json!({ "type": "connected", "username": "AfkBot" })).unwrap();
		assert_eq!(
			event,
			ClientEvent::Connected {
				username: "AfkBot".to_string(),
				peers: Vec::new(),
				position: None,
			}
		);
	}

	#[test]
	fn system_chat_has_no_sender() {
		let event: ClientEvent = serde_json::from_value(json!({ "type": "chat", "message": "Please /login" })).unwrap();
		assert_eq!(
			event,
			ClientEvent::Chat {
				sender: None,
				message: "Please /login".to_string(),
			}
		);
	}

	#[test]
	fn unknown_event_type_is_rejected() {
		let parsed = serde_json::from_value::<ClientEvent>(json!({ "type": "weather_changed" }));
		assert!(parsed.is_err());
	}
}

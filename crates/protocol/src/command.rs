//! Commands sent to the bridge.

use serde::{Deserialize, Serialize};

use crate::types::{AccountKind, BlockPos, ControlFlag};

/// Parameters the bridge needs to open a game connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
	pub host: String,
	pub port: u16,
	pub username: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,
	#[serde(default)]
	pub auth: AccountKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
}

impl ConnectRequest {
	/// `host:port` label for logs and notifications.
	pub fn address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

/// Intents issued to the session client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
	/// First frame of every bridge connection.
	Connect(ConnectRequest),
	SendChat { text: String },
	SetControl { control: ControlFlag, active: bool },
	/// Absolute look direction in radians.
	Look { yaw: f32, pitch: f32 },
	/// Pathfind to a block; the bridge reports `goal_reached`.
	NavigateTo { goal: BlockPos },
	Disconnect { reason: String },
}

impl ClientCommand {
	pub fn chat(text: impl Into<String>) -> Self {
		ClientCommand::SendChat { text: text.into() }
	}

	pub fn press(control: ControlFlag) -> Self {
		ClientCommand::SetControl { control, active: true }
	}

	pub fn release(control: ControlFlag) -> Self {
		ClientCommand::SetControl { control, active: false }
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn connect_frame_is_flattened_under_type_tag() {
		let command = ClientCommand::Connect(ConnectRequest {
			host: "play.example.net".to_string(),
			port: 25565,
			username: "AfkBot".to_string(),
			password: None,
			auth: AccountKind::Offline,
			version: Some("1.20.1".to_string()),
		});
		assert_eq!(
			serde_json::to_value(&command).unwrap(),
			json!({
				"type": "connect",
				"host": "play.example.net",
				"port": 25565,
				"username": "AfkBot",
				"auth": "offline",
				"version": "1.20.1"
			})
		);
	}

	#[test]
	fn set_control_frame_shape() {
		assert_eq!(
			serde_json::to_value(ClientCommand::release(ControlFlag::Left)).unwrap(),
			json!({ "type": "set_control", "control": "left", "active": false })
		);
	}

	#[test]
	fn address_joins_host_and_port() {
		let request = ConnectRequest {
			host: "localhost".to_string(),
			port: 25566,
			username: "bot".to_string(),
			password: None,
			auth: AccountKind::default(),
			version: None,
		};
		assert_eq!(request.address(), "localhost:25566");
	}
}

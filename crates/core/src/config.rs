//! Bot configuration loaded from `settings.json`.
//!
//! Every block is optional and falls back to the defaults enumerated in its
//! `Default` impl. Unknown keys are rejected so a typo fails at load time
//! instead of silently disabling a feature. Key names follow the legacy
//! settings file (`bot-account`, `anti-afk`, ...). Two historical spellings
//! are accepted as aliases (`auth`, `auto-recconect-delay`), and the motion
//! toggles under `anti-afk` may be written either as a bare flag or as the
//! older `{ "enabled": ... }` object. `chat-messages` is a top-level block;
//! nesting it under `anti-afk` is rejected.

use std::fs;
use std::path::Path;
use std::time::Duration;

use afk_protocol::{AccountKind, BlockPos, ConnectRequest};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Upper bound for every interval and delay setting.
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Immutable settings for every session started by this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BotConfig {
	pub bot_account: AccountConfig,
	pub server: ServerConfig,
	#[serde(default)]
	pub position: PositionConfig,
	#[serde(default)]
	pub utils: UtilsConfig,
	#[serde(default, alias = "auth")]
	pub auto_auth: AutoAuthConfig,
	#[serde(default)]
	pub chat_messages: ChatMessagesConfig,
	#[serde(default)]
	pub anti_afk: AntiAfkConfig,
	#[serde(default)]
	pub presence: PresenceConfig,
	#[serde(default)]
	pub cron_monitor: CronMonitorConfig,
	#[serde(default)]
	pub discord_webhook: WebhookConfig,
	#[serde(default)]
	pub liveness: LivenessConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AccountConfig {
	pub username: String,
	/// Account password for online auth; unrelated to the in-game `/login` password.
	#[serde(default)]
	pub password: String,
	#[serde(default, rename = "type")]
	pub kind: AccountKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ServerConfig {
	pub ip: String,
	#[serde(default = "default_server_port")]
	pub port: u16,
	/// Protocol version hint; empty means auto-detect.
	#[serde(default)]
	pub version: String,
	/// How long to wait for the spawn event before giving up on a connection.
	#[serde(default = "default_connect_timeout_ms")]
	pub connect_timeout_ms: u64,
}

fn default_server_port() -> u16 {
	25565
}

fn default_connect_timeout_ms() -> u64 {
	60_000
}

/// Idle position the bot walks to after spawning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct PositionConfig {
	pub enabled: bool,
	pub x: i32,
	pub y: i32,
	pub z: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct UtilsConfig {
	pub chat_log: bool,
	pub auto_reconnect: bool,
	/// Base reconnect delay in milliseconds.
	#[serde(alias = "auto-recconect-delay")]
	pub auto_reconnect_delay: u64,
	/// Extra delay in milliseconds added after leaving for a real player.
	pub conflict_extra_delay: u64,
}

impl Default for UtilsConfig {
	fn default() -> Self {
		Self {
			chat_log: true,
			auto_reconnect: true,
			auto_reconnect_delay: 30_000,
			conflict_extra_delay: 90_000,
		}
	}
}

/// How the login step follows the register step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthPolicyKind {
	/// Classify the chat line after each command before moving on.
	#[default]
	AwaitResponse,
	/// Send login a fixed delay after register without reading responses.
	Timed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct AutoAuthConfig {
	pub enabled: bool,
	pub password: String,
	pub policy: AuthPolicyKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct ChatMessagesConfig {
	pub enabled: bool,
	pub messages: Vec<String>,
	pub repeat: bool,
	/// Seconds between repeated messages.
	pub repeat_delay: u64,
}

impl Default for ChatMessagesConfig {
	fn default() -> Self {
		Self {
			enabled: false,
			messages: Vec::new(),
			repeat: false,
			repeat_delay: 60,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct AntiAfkConfig {
	pub enabled: bool,
	/// Milliseconds between idle ticks.
	pub interval: u64,
	/// Milliseconds between status log lines.
	pub log_interval: u64,
	/// Hold sneak for the whole session.
	pub sneak: bool,
	#[serde(deserialize_with = "toggle")]
	pub jump: bool,
	#[serde(deserialize_with = "toggle")]
	pub rotate: bool,
	#[serde(rename = "move", deserialize_with = "toggle")]
	pub movement: bool,
	/// Fixed RNG seed for reproducible idle patterns.
	pub seed: Option<u64>,
}

impl Default for AntiAfkConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			interval: 2_000,
			log_interval: 30_000,
			sneak: false,
			jump: true,
			rotate: true,
			movement: true,
			seed: None,
		}
	}
}

/// A feature switch written as `true` or as `{ "enabled": true, ... }`.
///
/// Extra keys in the object form (such as `move-duration`) are ignored.
#[derive(Deserialize)]
#[serde(untagged)]
enum Toggle {
	Flag(bool),
	Block { enabled: bool },
}

fn toggle<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
	Ok(match Toggle::deserialize(deserializer)? {
		Toggle::Flag(enabled) | Toggle::Block { enabled } => enabled,
	})
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct PresenceConfig {
	/// Disconnect as soon as another player is online.
	pub leave_on_player: bool,
}

impl Default for PresenceConfig {
	fn default() -> Self {
		Self { leave_on_player: true }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct CronMonitorConfig {
	pub enabled: bool,
	pub check_every_minutes: u64,
	pub max_gap_minutes: u64,
}

impl Default for CronMonitorConfig {
	fn default() -> Self {
		Self {
			enabled: false,
			check_every_minutes: 5,
			max_gap_minutes: 15,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct WebhookConfig {
	pub enabled: bool,
	pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct LivenessConfig {
	pub enabled: bool,
	/// Listen port when neither `--port` nor `PORT` is set.
	pub port: Option<u16>,
}

impl Default for LivenessConfig {
	fn default() -> Self {
		Self { enabled: true, port: None }
	}
}

impl BotConfig {
	/// Loads and validates a config file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)?;
		let config: BotConfig = serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
			path: path.to_path_buf(),
			source,
		})?;
		config.validate()?;
		Ok(config)
	}

	/// Parses and validates an in-memory JSON document.
	pub fn from_json_str(json: &str) -> Result<Self> {
		let config: BotConfig = serde_json::from_str(json).map_err(|source| Error::ConfigParse {
			path: "<inline>".into(),
			source,
		})?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects values that would make a feature misbehave rather than merely do nothing.
	pub fn validate(&self) -> Result<()> {
		if self.bot_account.username.trim().is_empty() {
			return Err(Error::Config("bot-account.username must not be empty".into()));
		}
		if self.server.ip.trim().is_empty() {
			return Err(Error::Config("server.ip must not be empty".into()));
		}
		if self.server.connect_timeout_ms == 0 {
			return Err(Error::Config("server.connect-timeout-ms must be greater than zero".into()));
		}
		if self.anti_afk.enabled && (self.anti_afk.interval == 0 || self.anti_afk.log_interval == 0) {
			return Err(Error::Config("anti-afk.interval and anti-afk.log-interval must be greater than zero".into()));
		}
		if self.chat_messages.enabled && self.chat_messages.repeat && self.chat_messages.repeat_delay == 0 {
			return Err(Error::Config("chat-messages.repeat-delay must be greater than zero".into()));
		}
		if self.cron_monitor.enabled && (self.cron_monitor.check_every_minutes == 0 || self.cron_monitor.max_gap_minutes == 0) {
			return Err(Error::Config("cron-monitor intervals must be greater than zero".into()));
		}

		let day_ms = DAY.as_millis() as u64;
		let day_secs = DAY.as_secs();
		let day_minutes = day_secs / 60;
		for (key, value, max) in [
			("server.connect-timeout-ms", self.server.connect_timeout_ms, day_ms),
			("utils.auto-reconnect-delay", self.utils.auto_reconnect_delay, day_ms),
			("utils.conflict-extra-delay", self.utils.conflict_extra_delay, day_ms),
			("anti-afk.interval", self.anti_afk.interval, day_ms),
			("anti-afk.log-interval", self.anti_afk.log_interval, day_ms),
			("chat-messages.repeat-delay", self.chat_messages.repeat_delay, day_secs),
			("cron-monitor.check-every-minutes", self.cron_monitor.check_every_minutes, day_minutes),
			("cron-monitor.max-gap-minutes", self.cron_monitor.max_gap_minutes, day_minutes),
		] {
			if value > max {
				return Err(Error::Config(format!("{key} must be at most {max}, got {value}")));
			}
		}
		Ok(())
	}

	/// Connect parameters forwarded to the bridge.
	pub fn connect_request(&self) -> ConnectRequest {
		let password = Some(self.bot_account.password.clone()).filter(|p| !p.is_empty());
		let version = Some(self.server.version.clone()).filter(|v| !v.is_empty());
		ConnectRequest {
			host: self.server.ip.clone(),
			port: self.server.port,
			username: self.bot_account.username.clone(),
			password,
			auth: self.bot_account.kind,
			version,
		}
	}

	pub fn idle_position(&self) -> Option<BlockPos> {
		self.position.enabled.then_some(BlockPos {
			x: self.position.x,
			y: self.position.y,
			z: self.position.z,
		})
	}

	pub fn connect_timeout(&self) -> Duration {
		Duration::from_millis(self.server.connect_timeout_ms)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn minimal() -> serde_json::Value {
		json!({
			"bot-account": { "username": "AfkBot" },
			"server": { "ip": "play.example.net" }
		})
	}

	#[test]
	fn minimal_document_takes_defaults() {
		let config = BotConfig::from_json_str(&minimal().to_string()).unwrap();
		assert_eq!(config.server.port, 25565);
		assert_eq!(config.utils, UtilsConfig::default());
		assert_eq!(config.anti_afk.interval, 2_000);
		assert_eq!(config.chat_messages.repeat_delay, 60);
		assert_eq!(config.cron_monitor.max_gap_minutes, 15);
		assert!(config.presence.leave_on_player);
		assert!(config.liveness.enabled);
		assert_eq!(config.idle_position(), None);
	}

	#[test]
	fn legacy_key_spellings_are_accepted() {
		let mut doc = minimal();
		doc["utils"] = json!({ "auto-reconnect": true, "auto-recconect-delay": 5000 });
		doc["auth"] = json!({ "enabled": true, "password": "hunter2" });
		let config = BotConfig::from_json_str(&doc.to_string()).unwrap();
		assert_eq!(config.utils.auto_reconnect_delay, 5000);
		assert!(config.auto_auth.enabled);
		assert_eq!(config.auto_auth.policy, AuthPolicyKind::AwaitResponse);
	}

	#[test]
	fn motion_toggles_accept_the_nested_enabled_form() {
		let mut doc = minimal();
		doc["anti-afk"] = json!({
			"enabled": true,
			"jump": { "enabled": false },
			"rotate": true,
			"move": { "enabled": true, "move-duration": 1000 }
		});
		let config = BotConfig::from_json_str(&doc.to_string()).unwrap();
		assert!(!config.anti_afk.jump);
		assert!(config.anti_afk.rotate);
		assert!(config.anti_afk.movement);
	}

	#[test]
	fn chat_messages_nested_under_anti_afk_is_rejected() {
		let mut doc = minimal();
		doc["anti-afk"] = json!({ "chat-messages": { "enabled": true, "messages": ["hi"] } });
		assert!(matches!(BotConfig::from_json_str(&doc.to_string()), Err(Error::ConfigParse { .. })));
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let mut doc = minimal();
		doc["anti-afk"] = json!({ "enabled": true, "jumpp": true });
		let err = BotConfig::from_json_str(&doc.to_string()).unwrap_err();
		assert!(matches!(err, Error::ConfigParse { .. }), "unexpected error: {err}");
	}

	#[test]
	fn malformed_block_type_is_rejected() {
		let mut doc = minimal();
		doc["chat-messages"] = json!({ "enabled": true, "messages": "hello" });
		assert!(BotConfig::from_json_str(&doc.to_string()).is_err());
	}

	#[test]
	fn zero_idle_interval_is_a_config_error() {
		let mut doc = minimal();
		doc["anti-afk"] = json!({ "interval": 0 });
		let err = BotConfig::from_json_str(&doc.to_string()).unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn intervals_longer_than_a_day_are_config_errors() {
		for (block, key, value) in [
			("cron-monitor", "check-every-minutes", json!(307_445_734_561_825_861_u64)),
			("cron-monitor", "max-gap-minutes", json!(1_441)),
			("chat-messages", "repeat-delay", json!(86_401)),
			("anti-afk", "interval", json!(86_400_001)),
			("utils", "auto-reconnect-delay", json!(u64::MAX)),
		] {
			let mut doc = minimal();
			doc[block] = json!({ key: value });
			let err = BotConfig::from_json_str(&doc.to_string()).unwrap_err();
			assert!(
				matches!(&err, Error::Config(message) if message.contains(key)),
				"{block}.{key}: unexpected error: {err}"
			);
		}

		let mut doc = minimal();
		doc["cron-monitor"] = json!({ "enabled": true, "check-every-minutes": 1_440, "max-gap-minutes": 1_440 });
		doc["chat-messages"] = json!({ "repeat-delay": 86_400 });
		assert!(BotConfig::from_json_str(&doc.to_string()).is_ok());
	}

	#[test]
	fn connect_request_drops_empty_optionals() {
		let mut doc = minimal();
		doc["server"] = json!({ "ip": "localhost", "port": 25566, "version": "" });
		doc["bot-account"] = json!({ "username": "AfkBot", "password": "", "type": "microsoft" });
		let request = BotConfig::from_json_str(&doc.to_string()).unwrap().connect_request();
		assert_eq!(request.address(), "localhost:25566");
		assert_eq!(request.password, None);
		assert_eq!(request.version, None);
		assert_eq!(request.auth, AccountKind::Microsoft);
	}

	#[test]
	fn idle_position_only_when_enabled() {
		let mut doc = minimal();
		doc["position"] = json!({ "enabled": true, "x": 10, "y": 64, "z": -3 });
		let config = BotConfig::from_json_str(&doc.to_string()).unwrap();
		assert_eq!(config.idle_position(), Some(BlockPos { x: 10, y: 64, z: -3 }));
	}

	#[test]
	fn load_reports_path_on_parse_failure() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("settings.json");
		std::fs::write(&path, "{ not json").unwrap();
		let err = BotConfig::load(&path).unwrap_err();
		assert!(err.to_string().contains("settings.json"));
	}
}

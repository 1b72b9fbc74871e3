//! Chat-carried `/register` + `/login` handshake.
//!
//! Many offline-mode servers gate play behind an auth plugin that expects the
//! client to register once and log in on every join. The sequencer sends both
//! commands in order and, under [`AuthPolicy::AwaitResponse`], classifies the
//! chat line that follows each one. Classification never aborts the sequence:
//! login is attempted whatever the register step reported.
//!
//! Responses are matched to commands through a [`ResponseCorrelation`]. The
//! default [`FirstChatLine`] takes the first chat line after a send, which can
//! misattribute an unrelated line that happens to arrive first.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{AuthPolicyKind, AutoAuthConfig};

/// Delay between register and login under [`AuthPolicy::Timed`].
pub const TIMED_LOGIN_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
	AwaitResponse,
	Timed { login_delay: Duration },
}

impl From<AuthPolicyKind> for AuthPolicy {
	fn from(kind: AuthPolicyKind) -> Self {
		match kind {
			AuthPolicyKind::AwaitResponse => AuthPolicy::AwaitResponse,
			AuthPolicyKind::Timed => AuthPolicy::Timed {
				login_delay: TIMED_LOGIN_DELAY,
			},
		}
	}
}

/// Decides whether a chat line answers the command that is awaiting a response.
pub trait ResponseCorrelation: Send + Sync {
	fn accepts(&self, sender: Option<&str>, message: &str) -> bool;
}

/// Accepts the first chat line of any origin.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstChatLine;

impl ResponseCorrelation for FirstChatLine {
	fn accepts(&self, _sender: Option<&str>, _message: &str) -> bool {
		true
	}
}

/// Classified server reply to one handshake command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
	Registered,
	AlreadyRegistered,
	LoggedIn,
	IncorrectPassword,
	Unexpected(String),
}

impl StepOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, StepOutcome::Registered | StepOutcome::AlreadyRegistered | StepOutcome::LoggedIn)
	}
}

/// Case-sensitive substring match on the reply to `/register`.
pub fn classify_register(message: &str) -> StepOutcome {
	if message.contains("successfully registered") {
		StepOutcome::Registered
	} else if message.contains("already registered") {
		StepOutcome::AlreadyRegistered
	} else {
		StepOutcome::Unexpected(message.to_string())
	}
}

/// Case-sensitive substring match on the reply to `/login`.
pub fn classify_login(message: &str) -> StepOutcome {
	if message.contains("successfully logged in") {
		StepOutcome::LoggedIn
	} else if message.contains("Incorrect password") {
		StepOutcome::IncorrectPassword
	} else {
		StepOutcome::Unexpected(message.to_string())
	}
}

/// Side effect requested by the sequencer.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthAction {
	Chat(String),
	ScheduleLogin(Duration),
}

impl fmt::Debug for AuthAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AuthAction::Chat(text) => {
				let verb = text.split_whitespace().next().unwrap_or_default();
				f.debug_tuple("Chat").field(&format_args!("{verb} <redacted>")).finish()
			}
			AuthAction::ScheduleLogin(delay) => f.debug_tuple("ScheduleLogin").field(delay).finish(),
		}
	}
}

/// Outcome of each step; `None` when the step was not classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthResult {
	pub register: Option<StepOutcome>,
	pub login: Option<StepOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
	Idle,
	AwaitingRegister,
	AwaitingLogin { register: Option<StepOutcome> },
	Finished(AuthResult),
}

pub struct AuthSequencer {
	password: String,
	policy: AuthPolicy,
	correlation: Arc<dyn ResponseCorrelation>,
	state: HandshakeState,
}

impl fmt::Debug for AuthSequencer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AuthSequencer")
			.field("policy", &self.policy)
			.field("state", &self.state)
			.finish_non_exhaustive()
	}
}

impl AuthSequencer {
	pub fn new(password: impl Into<String>, policy: AuthPolicy, correlation: Arc<dyn ResponseCorrelation>) -> Self {
		Self {
			password: password.into(),
			policy,
			correlation,
			state: HandshakeState::Idle,
		}
	}

	/// Returns `None` when auth is disabled or has no password.
	pub fn from_config(config: &AutoAuthConfig, correlation: Arc<dyn ResponseCorrelation>) -> Option<Self> {
		if !config.enabled {
			return None;
		}
		if config.password.is_empty() {
			error!(target = "afk.auth", "auto-auth is enabled but no password is configured; skipping");
			return None;
		}
		Some(Self::new(config.password.clone(), config.policy.into(), correlation))
	}

	pub fn state(&self) -> &HandshakeState {
		&self.state
	}

	pub fn is_finished(&self) -> bool {
		matches!(self.state, HandshakeState::Finished(_))
	}

	fn register_command(&self) -> String {
		format!("/register {0} {0}", self.password)
	}

	fn login_command(&self) -> String {
		format!("/login {}", self.password)
	}

	/// Sends `/register`; a no-op after the first call.
	pub fn start(&mut self) -> Vec<AuthAction> {
		if self.state != HandshakeState::Idle {
			return Vec::new();
		}
		info!(target = "afk.auth", policy = ?self.policy, "sent /register");
		let register = AuthAction::Chat(self.register_command());
		match self.policy {
			AuthPolicy::AwaitResponse => {
				self.state = HandshakeState::AwaitingRegister;
				vec![register]
			}
			AuthPolicy::Timed { login_delay } => {
				self.state = HandshakeState::AwaitingLogin { register: None };
				vec![register, AuthAction::ScheduleLogin(login_delay)]
			}
		}
	}

	/// Feeds one chat line; only meaningful under [`AuthPolicy::AwaitResponse`].
	pub fn on_chat(&mut self, sender: Option<&str>, message: &str) -> Vec<AuthAction> {
		if self.policy != AuthPolicy::AwaitResponse || !self.correlation.accepts(sender, message) {
			return Vec::new();
		}
		match std::mem::replace(&mut self.state, HandshakeState::Idle) {
			HandshakeState::AwaitingRegister => {
				let outcome = classify_register(message);
				match &outcome {
					StepOutcome::Registered => info!(target = "afk.auth", "registration successful"),
					StepOutcome::AlreadyRegistered => info!(target = "afk.auth", "already registered"),
					other => warn!(target = "afk.auth", outcome = ?other, "unexpected response to /register"),
				}
				self.state = HandshakeState::AwaitingLogin { register: Some(outcome) };
				info!(target = "afk.auth", "sent /login");
				vec![AuthAction::Chat(self.login_command())]
			}
			HandshakeState::AwaitingLogin { register } => {
				let outcome = classify_login(message);
				match &outcome {
					StepOutcome::LoggedIn => info!(target = "afk.auth", "login successful"),
					StepOutcome::IncorrectPassword => warn!(target = "afk.auth", "incorrect password"),
					other => warn!(target = "afk.auth", outcome = ?other, "unexpected response to /login"),
				}
				debug!(
					target = "afk.auth",
					registered = register.as_ref().is_some_and(StepOutcome::is_success),
					logged_in = outcome.is_success(),
					"auth handshake finished"
				);
				self.state = HandshakeState::Finished(AuthResult {
					register,
					login: Some(outcome),
				});
				Vec::new()
			}
			state => {
				self.state = state;
				Vec::new()
			}
		}
	}

	/// Sends `/login` when the timed delay elapses.
	pub fn on_login_timer(&mut self) -> Vec<AuthAction> {
		if !matches!(self.policy, AuthPolicy::Timed { .. }) {
			return Vec::new();
		}
		match self.state {
			HandshakeState::AwaitingLogin { .. } => {
				self.state = HandshakeState::Finished(AuthResult::default());
				info!(target = "afk.auth", "sent /login");
				vec![AuthAction::Chat(self.login_command())]
			}
			_ => Vec::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn await_response() -> AuthSequencer {
		AuthSequencer::new("hunter2", AuthPolicy::AwaitResponse, Arc::new(FirstChatLine))
	}

	#[test]
	fn classification_is_case_sensitive_substring() {
		assert_eq!(classify_register("You have successfully registered!"), StepOutcome::Registered);
		assert_eq!(classify_register("You are already registered"), StepOutcome::AlreadyRegistered);
		assert!(matches!(classify_register("Successfully Registered"), StepOutcome::Unexpected(_)));
		assert_eq!(classify_login("You successfully logged in"), StepOutcome::LoggedIn);
		assert_eq!(classify_login("Incorrect password!"), StepOutcome::IncorrectPassword);
		assert!(matches!(classify_login("incorrect password"), StepOutcome::Unexpected(_)));
	}

	#[test]
	fn await_response_happy_path() {
		let mut auth = await_response();
		assert_eq!(auth.start(), vec![AuthAction::Chat("/register hunter2 hunter2".into())]);
		assert!(auth.start().is_empty());

		let actions = auth.on_chat(None, "You are already registered");
		assert_eq!(actions, vec![AuthAction::Chat("/login hunter2".into())]);

		assert!(auth.on_chat(None, "You successfully logged in").is_empty());
		assert_eq!(
			auth.state(),
			&HandshakeState::Finished(AuthResult {
				register: Some(StepOutcome::AlreadyRegistered),
				login: Some(StepOutcome::LoggedIn),
			})
		);

		assert!(auth.on_chat(None, "late line").is_empty());
	}

	#[test]
	fn unexpected_register_reply_still_logs_in() {
		let mut auth = await_response();
		auth.start();
		let actions = auth.on_chat(Some("Steve"), "hello there");
		assert_eq!(actions, vec![AuthAction::Chat("/login hunter2".into())]);
		auth.on_chat(None, "Incorrect password");
		match auth.state() {
			HandshakeState::Finished(result) => {
				assert_eq!(result.register, Some(StepOutcome::Unexpected("hello there".into())));
				assert_eq!(result.login, Some(StepOutcome::IncorrectPassword));
				assert!(!result.login.as_ref().unwrap().is_success());
			}
			other => panic!("unexpected state {other:?}"),
		}
	}

	#[test]
	fn chat_before_start_is_ignored() {
		let mut auth = await_response();
		assert!(auth.on_chat(None, "Welcome").is_empty());
		assert_eq!(auth.state(), &HandshakeState::Idle);
	}

	#[test]
	fn timed_policy_ignores_chat_and_waits_for_timer() {
		let mut auth = AuthSequencer::new("pw", AuthPolicyKind::Timed.into(), Arc::new(FirstChatLine));
		assert_eq!(
			auth.start(),
			vec![AuthAction::Chat("/register pw pw".into()), AuthAction::ScheduleLogin(TIMED_LOGIN_DELAY)]
		);
		assert!(auth.on_chat(None, "successfully registered").is_empty());
		assert_eq!(auth.on_login_timer(), vec![AuthAction::Chat("/login pw".into())]);
		assert!(auth.is_finished());
		assert!(auth.on_login_timer().is_empty());
	}

	#[test]
	fn custom_correlation_filters_lines() {
		struct ServerOnly;
		impl ResponseCorrelation for ServerOnly {
			fn accepts(&self, sender: Option<&str>, _message: &str) -> bool {
				sender.is_none()
			}
		}

		let mut auth = AuthSequencer::new("pw", AuthPolicy::AwaitResponse, Arc::new(ServerOnly));
		auth.start();
		assert!(auth.on_chat(Some("Steve"), "hi bot").is_empty());
		assert_eq!(auth.state(), &HandshakeState::AwaitingRegister);
		assert_eq!(auth.on_chat(None, "successfully registered").len(), 1);
	}

	#[test]
	fn empty_password_disables_sequencer() {
		let config = AutoAuthConfig {
			enabled: true,
			password: String::new(),
			policy: AuthPolicyKind::AwaitResponse,
		};
		assert!(AuthSequencer::from_config(&config, Arc::new(FirstChatLine)).is_none());
	}

	#[test]
	fn debug_output_redacts_password() {
		let auth = await_response();
		assert!(!format!("{auth:?}").contains("hunter2"));
		let action = AuthAction::Chat("/login hunter2".into());
		assert_eq!(format!("{action:?}"), "Chat(/login <redacted>)");
	}
}

//! Lifecycle controller for one connection.
//!
//! A [`Session`] owns its link, its timers and every idle feature. It moves
//! through [`Phase::Connecting`], [`Phase::Active`] and, when a real player
//! shows up, [`Phase::LeavingForConflict`], always ending in
//! [`Phase::Disconnected`]. Client events and timer deadlines arrive as
//! [`SessionInput`]s and are handled strictly one at a time, so no feature
//! can act on a session that another feature has already torn down.

mod input;
mod state;

use std::sync::Arc;

use afk_protocol::{ClientCommand, ClientEvent, ControlFlag, Peer, Position};
use afk_runtime::ClientLink;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use input::{SessionInput, TimerEvent};
pub use state::{Phase, SessionEnd, SessionOutcome, SessionState};

use crate::auth::{AuthAction, AuthSequencer, FirstChatLine, ResponseCorrelation};
use crate::chat::{ChatBroadcaster, ChatSchedule};
use crate::config::BotConfig;
use crate::idle::{IdleActionSet, IdleScheduler, IdleStep, PulseTracker};
use crate::notify::Notifier;
use crate::presence::PresenceMonitor;
use crate::timer::TimerScope;

/// Disconnect reason sent when yielding to a real player.
pub const CONFLICT_LEAVE_MESSAGE: &str = "Another player joined; yielding the server";
/// Disconnect reason sent when the process stops.
pub const SHUTDOWN_MESSAGE: &str = "Shutting down";
/// Disconnect reason sent when the client never spawns.
pub const CONNECT_TIMEOUT_MESSAGE: &str = "Connect timed out";

pub struct Session {
	config: Arc<BotConfig>,
	link: ClientLink,
	notifier: Arc<dyn Notifier>,
	correlation: Arc<dyn ResponseCorrelation>,
	state: SessionState,
	presence: PresenceMonitor,
	timers: TimerScope<SessionInput>,
	inbox: mpsc::UnboundedReceiver<SessionInput>,
	rng: StdRng,
	idle: Option<IdleScheduler>,
	pulses: PulseTracker,
	sneak_held: bool,
	chat: Option<ChatBroadcaster>,
	auth: Option<AuthSequencer>,
	end: Option<SessionEnd>,
}

impl Session {
	pub fn new(config: Arc<BotConfig>, link: ClientLink, notifier: Arc<dyn Notifier>) -> Self {
		let (inbox_tx, inbox) = mpsc::unbounded_channel();
		let username = config.bot_account.username.clone();
		let seed = config.anti_afk.seed.unwrap_or_else(|| rand::rng().random());
		Self {
			presence: PresenceMonitor::new(username.clone(), config.presence.leave_on_player),
			state: SessionState::new(username),
			config,
			link,
			notifier,
			correlation: Arc::new(FirstChatLine),
			timers: TimerScope::new(inbox_tx),
			inbox,
			rng: StdRng::seed_from_u64(seed),
			idle: None,
			pulses: PulseTracker::default(),
			sneak_held: false,
			chat: None,
			auth: None,
			end: None,
		}
	}

	/// Overrides the idle RNG seed.
	pub fn with_seed(mut self, seed: u64) -> Self {
		self.rng = StdRng::seed_from_u64(seed);
		self
	}

	/// Replaces the default first-chat-line auth response matching.
	pub fn with_auth_correlation(mut self, correlation: Arc<dyn ResponseCorrelation>) -> Self {
		self.correlation = correlation;
		self
	}

	pub fn state(&self) -> &SessionState {
		&self.state
	}

	pub fn is_finished(&self) -> bool {
		self.state.phase == Phase::Disconnected
	}

	/// Drives the session until it disconnects or `shutdown` fires.
	pub async fn run(mut self, shutdown: CancellationToken) -> SessionOutcome {
		self.timers
			.after(self.config.connect_timeout(), TimerEvent::ConnectTimeout.into());

		while !self.is_finished() {
			let input = tokio::select! {
				biased;
				_ = shutdown.cancelled() => None,
				event = self.link.recv() => Some(event.map_or(SessionInput::LinkClosed, SessionInput::Client)),
				Some(input) = self.inbox.recv() => Some(input),
			};
			match input {
				Some(input) => self.handle(input),
				None => self.shutdown(),
			}
		}

		self.outcome()
	}

	/// Applies one input.
	pub fn handle(&mut self, input: SessionInput) {
		if self.is_finished() {
			debug!(target = "afk.session", ?input, "input after disconnect ignored");
			return;
		}
		match input {
			SessionInput::Client(event) => self.on_client_event(event),
			SessionInput::Timer(event) => self.on_timer(event),
			SessionInput::LinkClosed => {
				info!(target = "afk.session", "client link closed");
				self.finish(SessionEnd::Closed("connection closed".to_string()));
			}
		}
	}

	/// Leaves the server politely; idempotent.
	pub fn shutdown(&mut self) {
		if self.is_finished() {
			return;
		}
		info!(target = "afk.session", phase = ?self.state.phase, "shutting down session");
		self.timers.cancel();
		self.release_all();
		self.send(ClientCommand::Disconnect {
			reason: SHUTDOWN_MESSAGE.to_string(),
		});
		self.finish(SessionEnd::Shutdown);
	}

	/// Final outcome; only meaningful once the session has finished.
	pub fn outcome(&mut self) -> SessionOutcome {
		SessionOutcome {
			end: self
				.end
				.take()
				.unwrap_or_else(|| SessionEnd::Closed("session ended".to_string())),
			left_due_to_conflict: self.state.left_due_to_conflict,
		}
	}

	fn on_client_event(&mut self, event: ClientEvent) {
		match event {
			ClientEvent::Connected {
				username,
				peers,
				position,
			} => {
				if self.state.phase == Phase::Connecting {
					self.enter_active(username, peers, position);
				} else {
					debug!(target = "afk.session", phase = ?self.state.phase, "duplicate connected event ignored");
				}
			}
			ClientEvent::Disconnected { reason } => {
				info!(target = "afk.session", %reason, "disconnected");
				self.notifier.notify(&format!("Bot disconnected: {reason}"));
				self.finish(SessionEnd::Closed(reason));
			}
			ClientEvent::Kicked { reason } => {
				warn!(target = "afk.session", %reason, "kicked from server");
				self.notifier.notify(&format!("Bot was kicked: {reason}"));
				self.finish(SessionEnd::Kicked(reason));
			}
			ClientEvent::Error { message } => {
				warn!(target = "afk.session", error = %message, "client error");
				self.notifier.notify(&format!("Bot error: {message}"));
			}
			ClientEvent::Chat { sender, message } => self.on_chat(sender, message),
			ClientEvent::PeerJoined { peer } => self.on_peer_joined(peer),
			ClientEvent::PeerLeft { peer } => {
				if self.state.peers.remove(&peer.username) {
					info!(target = "afk.session", peer = %peer.username, "peer left");
				}
			}
			ClientEvent::Moved { position } => self.state.self_position = Some(position),
			ClientEvent::GoalReached => {
				info!(target = "afk.session", position = ?self.state.self_position, "arrived at idle position");
			}
			ClientEvent::DiedAndRespawned => {
				info!(target = "afk.session", "died and respawned");
				if self.state.phase == Phase::Active {
					self.navigate_to_idle_position();
				}
			}
		}
	}

	fn enter_active(&mut self, username: String, peers: Vec<Peer>, position: Option<Position>) {
		self.state.phase = Phase::Active;
		self.presence = PresenceMonitor::new(username.clone(), self.config.presence.leave_on_player);
		self.state.peers = peers
			.iter()
			.filter(|peer| !self.presence.is_self(&peer.username))
			.map(|peer| peer.username.clone())
			.collect();
		self.state.username = username;
		self.state.self_position = position;

		info!(
			target = "afk.session",
			username = %self.state.username,
			server = %self.config.connect_request().address(),
			peers = self.state.peers.len(),
			"spawned"
		);
		self.notifier.notify(&format!(
			"Bot `{}` joined {}",
			self.state.username,
			self.config.connect_request().address()
		));

		if let Some(reason) = self.presence.initial_conflict(&peers) {
			self.request_conflict_leave(reason);
			return;
		}

		self.navigate_to_idle_position();

		if let Some(mut auth) = AuthSequencer::from_config(&self.config.auto_auth, Arc::clone(&self.correlation)) {
			let actions = auth.start();
			self.auth = Some(auth);
			self.apply_auth(actions);
		}

		let actions = IdleActionSet::from_config(&self.config);
		if actions.chat_broadcast {
			if let Some(chat) = ChatBroadcaster::from_config(&self.config.chat_messages) {
				if let ChatSchedule::Repeat { every } = chat.schedule() {
					self.timers.every(every, every, TimerEvent::ChatBroadcast.into());
				}
				for (index, delay) in chat.once_delays() {
					self.timers.after(delay, TimerEvent::ChatOnce(index).into());
				}
				self.chat = Some(chat);
			}
		}

		if self.config.anti_afk.enabled {
			let idle = IdleScheduler::new(&self.config.anti_afk, actions);
			if idle.holds_sneak() {
				self.send(ClientCommand::press(ControlFlag::Sneak));
				self.sneak_held = true;
			}
			if actions.motion_is_empty() {
				info!(target = "afk.idle", "anti-afk has no motion actions enabled; idle ticks skipped");
				return;
			}
			let interval = idle.interval();
			self.timers.every(interval, interval, TimerEvent::IdleTick.into());
			info!(target = "afk.idle", interval_ms = interval.as_millis() as u64, "anti-afk started");
			self.idle = Some(idle);
		}
	}

	fn on_chat(&mut self, sender: Option<String>, message: String) {
		if self.state.phase != Phase::Active {
			return;
		}
		if self.config.utils.chat_log {
			info!(target = "afk.chat", sender = sender.as_deref().unwrap_or("server"), "{message}");
		}
		if let Some(auth) = self.auth.as_mut() {
			let actions = auth.on_chat(sender.as_deref(), &message);
			self.apply_auth(actions);
		}
	}

	fn on_peer_joined(&mut self, peer: Peer) {
		if self.state.phase != Phase::Active || self.presence.is_self(&peer.username) {
			return;
		}
		info!(target = "afk.session", peer = %peer.username, "peer joined");
		self.state.peers.insert(peer.username.clone());
		if let Some(reason) = self.presence.on_peer_joined(&peer.username) {
			self.request_conflict_leave(reason);
		}
	}

	fn on_timer(&mut self, event: TimerEvent) {
		match (event, self.state.phase) {
			(TimerEvent::ConnectTimeout, Phase::Connecting) => {
				warn!(
					target = "afk.session",
					timeout_ms = self.config.server.connect_timeout_ms,
					"client did not spawn in time"
				);
				self.timers.cancel();
				self.send(ClientCommand::Disconnect {
					reason: CONNECT_TIMEOUT_MESSAGE.to_string(),
				});
				self.finish(SessionEnd::ConnectTimeout);
			}
			(TimerEvent::IdleTick, Phase::Active) => self.on_idle_tick(),
			(TimerEvent::Release(control), Phase::Active) => {
				if self.pulses.release(control) {
					self.send(ClientCommand::release(control));
				}
			}
			(TimerEvent::ChatBroadcast, Phase::Active) => {
				if let Some(text) = self.chat.as_mut().map(|chat| chat.next_cyclic().to_string()) {
					self.send_chat(text);
				}
			}
			(TimerEvent::ChatOnce(index), Phase::Active) => {
				if let Some(text) = self.chat.as_ref().and_then(|chat| chat.message_at(index)).map(str::to_string) {
					self.send_chat(text);
				}
			}
			(TimerEvent::AuthLogin, Phase::Active) => {
				if let Some(auth) = self.auth.as_mut() {
					let actions = auth.on_login_timer();
					self.apply_auth(actions);
				}
			}
			(event, phase) => debug!(target = "afk.session", ?event, ?phase, "stale timer ignored"),
		}
	}

	fn on_idle_tick(&mut self) {
		let Some(idle) = self.idle.as_mut() else {
			return;
		};
		let plan = idle.on_tick(Instant::now(), &mut self.rng);
		if plan.log_status {
			info!(
				target = "afk.idle",
				ticks = idle.ticks(),
				position = ?self.state.self_position,
				peers = self.state.peers.len(),
				"still idling"
			);
		}
		for step in plan.steps {
			match step {
				IdleStep::Pulse { control, duration } => {
					self.send(ClientCommand::press(control));
					self.pulses.assert(control);
					self.timers.after(duration, TimerEvent::Release(control).into());
				}
				IdleStep::Look { yaw, pitch } => self.send(ClientCommand::Look { yaw, pitch }),
			}
		}
	}

	/// Disconnects because a real player is present; only the first call acts.
	fn request_conflict_leave(&mut self, reason: String) {
		if self.state.left_due_to_conflict || self.state.phase != Phase::Active {
			return;
		}
		self.state.left_due_to_conflict = true;
		self.state.phase = Phase::LeavingForConflict;
		info!(target = "afk.session", %reason, "yielding server to another player");

		self.timers.cancel();
		self.release_all();
		self.send(ClientCommand::Disconnect {
			reason: CONFLICT_LEAVE_MESSAGE.to_string(),
		});
		self.notifier.notify(&format!("Bot left the server: {reason}"));
		self.finish(SessionEnd::ConflictLeave(reason));
	}

	fn navigate_to_idle_position(&mut self) {
		if let Some(goal) = self.config.idle_position() {
			info!(target = "afk.session", %goal, "navigating to idle position");
			self.send(ClientCommand::NavigateTo { goal });
		}
	}

	fn apply_auth(&mut self, actions: Vec<AuthAction>) {
		for action in actions {
			match action {
				AuthAction::Chat(text) => self.send(ClientCommand::SendChat { text }),
				AuthAction::ScheduleLogin(delay) => self.timers.after(delay, TimerEvent::AuthLogin.into()),
			}
		}
	}

	fn send_chat(&mut self, text: String) {
		info!(target = "afk.chat", message = %text, "sent chat message");
		self.send(ClientCommand::SendChat { text });
	}

	/// Releases every control with an outstanding assert, plus held sneak.
	fn release_all(&mut self) {
		for control in self.pulses.drain() {
			self.send(ClientCommand::release(control));
		}
		if std::mem::take(&mut self.sneak_held) {
			self.send(ClientCommand::release(ControlFlag::Sneak));
		}
	}

	fn send(&self, command: ClientCommand) {
		if let Err(err) = self.link.send(command) {
			debug!(target = "afk.session", error = %err, "command dropped");
		}
	}

	fn finish(&mut self, end: SessionEnd) {
		if self.is_finished() {
			return;
		}
		self.timers.cancel();
		self.state.phase = Phase::Disconnected;
		info!(target = "afk.session", outcome = %end, "session ended");
		self.end = Some(end);
	}
}

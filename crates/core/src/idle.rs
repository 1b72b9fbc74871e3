//! Idle-action scheduling: synthetic input that keeps the client from idling out.

use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::time::Duration;

use afk_protocol::{ControlFlag, Direction};
use rand::Rng;
use tokio::time::Instant;
use tracing::warn;

use crate::config::{AntiAfkConfig, BotConfig};

/// How long a jump stays asserted.
pub const JUMP_PULSE: Duration = Duration::from_millis(400);
/// How long a directional move stays asserted.
pub const MOVE_PULSE: Duration = Duration::from_millis(600);

/// Idle behaviours enabled for one session, derived once from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdleActionSet {
	pub chat_broadcast: bool,
	pub jump: bool,
	pub look_rotate: bool,
	pub directional_move: bool,
}

impl IdleActionSet {
	pub fn from_config(config: &BotConfig) -> Self {
		let motion = config.anti_afk.enabled;
		if config.chat_messages.enabled && config.chat_messages.messages.is_empty() {
			warn!(target = "afk.chat", "chat-messages is enabled but the message list is empty; skipping");
		}
		Self {
			chat_broadcast: config.chat_messages.enabled && !config.chat_messages.messages.is_empty(),
			jump: motion && config.anti_afk.jump,
			look_rotate: motion && config.anti_afk.rotate,
			directional_move: motion && config.anti_afk.movement,
		}
	}

	/// Returns `true` when no motion action is enabled.
	pub fn motion_is_empty(&self) -> bool {
		!(self.jump || self.look_rotate || self.directional_move)
	}
}

/// One synthetic input produced by an idle tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IdleStep {
	/// Assert `control` now and release it after `duration`.
	Pulse { control: ControlFlag, duration: Duration },
	Look { yaw: f32, pitch: f32 },
}

/// What the session should do for one tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickPlan {
	pub log_status: bool,
	pub steps: Vec<IdleStep>,
}

/// Decides the synthetic input for every idle tick.
#[derive(Debug)]
pub struct IdleScheduler {
	interval: Duration,
	log_interval: Duration,
	actions: IdleActionSet,
	sneak: bool,
	last_log: Option<Instant>,
	ticks: u64,
}

impl IdleScheduler {
	pub fn new(config: &AntiAfkConfig, actions: IdleActionSet) -> Self {
		Self {
			interval: Duration::from_millis(config.interval),
			log_interval: Duration::from_millis(config.log_interval),
			actions,
			sneak: config.sneak,
			last_log: None,
			ticks: 0,
		}
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Whether sneak is held for the whole session.
	pub fn holds_sneak(&self) -> bool {
		self.sneak
	}

	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	pub fn on_tick<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> TickPlan {
		self.ticks += 1;

		let log_status = match self.last_log {
			Some(last) => now.saturating_duration_since(last) >= self.log_interval,
			None => true,
		};
		if log_status {
			self.last_log = Some(now);
		}

		let mut steps = Vec::with_capacity(3);
		if self.actions.jump {
			steps.push(IdleStep::Pulse {
				control: ControlFlag::Jump,
				duration: JUMP_PULSE,
			});
		}
		if self.actions.directional_move {
			let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
			steps.push(IdleStep::Pulse {
				control: direction.into(),
				duration: MOVE_PULSE,
			});
		}
		if self.actions.look_rotate {
			steps.push(IdleStep::Look {
				yaw: rng.random_range(0.0..TAU),
				pitch: rng.random_range(-FRAC_PI_2..FRAC_PI_2),
			});
		}

		TickPlan { log_status, steps }
	}
}

/// Counts asserted controls that still owe a release.
#[derive(Debug, Default)]
pub struct PulseTracker {
	outstanding: BTreeMap<ControlFlag, usize>,
}

impl PulseTracker {
	pub fn assert(&mut self, control: ControlFlag) {
		*self.outstanding.entry(control).or_default() += 1;
	}

	/// Settles one assert of `control`; returns `false` if none was pending.
	pub fn release(&mut self, control: ControlFlag) -> bool {
		match self.outstanding.get_mut(&control) {
			Some(count) if *count > 1 => {
				*count -= 1;
				true
			}
			Some(_) => {
				self.outstanding.remove(&control);
				true
			}
			None => false,
		}
	}

	pub fn outstanding(&self, control: ControlFlag) -> usize {
		self.outstanding.get(&control).copied().unwrap_or(0)
	}

	/// Clears all pending asserts, returning each control once.
	pub fn drain(&mut self) -> Vec<ControlFlag> {
		std::mem::take(&mut self.outstanding).into_keys().collect()
	}

	pub fn is_empty(&self) -> bool {
		self.outstanding.is_empty()
	}
}

//! Scheduled chat lines sent while the bot idles.

use std::time::Duration;

use crate::config::ChatMessagesConfig;

/// Gap between consecutive one-shot messages.
pub const ONCE_STAGGER: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSchedule {
	/// Cycle through the list, one message per period, first send after one period.
	Repeat { every: Duration },
	/// Send message `i` once at `(i + 1) * stagger`.
	Once { stagger: Duration },
}

#[derive(Debug, Clone)]
pub struct ChatBroadcaster {
	messages: Vec<String>,
	schedule: ChatSchedule,
	cursor: usize,
}

impl ChatBroadcaster {
	/// Returns `None` when broadcasting is disabled or has nothing to say.
	pub fn from_config(config: &ChatMessagesConfig) -> Option<Self> {
		if !config.enabled || config.messages.is_empty() {
			return None;
		}
		let schedule = if config.repeat {
			ChatSchedule::Repeat {
				every: Duration::from_secs(config.repeat_delay),
			}
		} else {
			ChatSchedule::Once { stagger: ONCE_STAGGER }
		};
		Some(Self {
			messages: config.messages.clone(),
			schedule,
			cursor: 0,
		})
	}

	pub fn schedule(&self) -> ChatSchedule {
		self.schedule
	}

	/// `(index, delay)` for every message of a one-shot schedule; empty when repeating.
	pub fn once_delays(&self) -> Vec<(usize, Duration)> {
		match self.schedule {
			ChatSchedule::Once { stagger } => (1..=self.messages.len() as u32).map(|n| stagger * n).enumerate().collect(),
			ChatSchedule::Repeat { .. } => Vec::new(),
		}
	}

	/// Next message of the repeating cycle.
	pub fn next_cyclic(&mut self) -> &str {
		let index = self.cursor % self.messages.len();
		self.cursor = self.cursor.wrapping_add(1);
		&self.messages[index]
	}

	pub fn message_at(&self, index: usize) -> Option<&str> {
		self.messages.get(index).map(String::as_str)
	}
}

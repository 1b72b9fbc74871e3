//! Delay before the next connect attempt.

use std::time::Duration;

use crate::config::UtilsConfig;
use crate::session::{SessionEnd, SessionOutcome};

/// Fixed-delay reconnect policy with an extra penalty after yielding to a player.
///
/// There is no retry ceiling: as long as reconnect is enabled, every ended
/// session is followed by another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
	pub enabled: bool,
	pub base_delay: Duration,
	pub conflict_extra_delay: Duration,
}

impl ReconnectPolicy {
	pub fn from_config(utils: &UtilsConfig) -> Self {
		Self {
			enabled: utils.auto_reconnect,
			base_delay: Duration::from_millis(utils.auto_reconnect_delay),
			conflict_extra_delay: Duration::from_millis(utils.conflict_extra_delay),
		}
	}

	/// Returns `None` when the process should stop instead of reconnecting.
	pub fn next_delay(&self, outcome: &SessionOutcome) -> Option<Duration> {
		if !self.enabled || matches!(outcome.end, SessionEnd::Shutdown) {
			return None;
		}
		let extra = if outcome.left_due_to_conflict {
			self.conflict_extra_delay
		} else {
			Duration::ZERO
		};
		Some(self.base_delay + extra)
	}
}

impl Default for ReconnectPolicy {
	fn default() -> Self {
		Self::from_config(&UtilsConfig::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn outcome(end: SessionEnd, left_due_to_conflict: bool) -> SessionOutcome {
		SessionOutcome { end, left_due_to_conflict }
	}

	#[test]
	fn conflict_adds_extra_delay() {
		let policy = ReconnectPolicy::default();
		assert_eq!(
			policy.next_delay(&outcome(SessionEnd::ConflictLeave("peer `Steve` joined".into()), true)),
			Some(Duration::from_millis(120_000))
		);
		assert_eq!(
			policy.next_delay(&outcome(SessionEnd::Kicked("afk".into()), false)),
			Some(Duration::from_millis(30_000))
		);
		assert_eq!(
			policy.next_delay(&outcome(SessionEnd::ConnectFailed("refused".into()), false)),
			Some(Duration::from_millis(30_000))
		);
	}

	#[test]
	fn disabled_or_shutdown_stops() {
		let disabled = ReconnectPolicy {
			enabled: false,
			..ReconnectPolicy::default()
		};
		assert_eq!(disabled.next_delay(&outcome(SessionEnd::Closed("eof".into()), false)), None);
		assert_eq!(ReconnectPolicy::default().next_delay(&outcome(SessionEnd::Shutdown, false)), None);
	}
}

//! Process-wide liveness timestamps and the cron gap monitor.
//!
//! An external uptime pinger hits the liveness endpoint on a schedule. Each
//! hit is recorded in one [`LivenessState`], created at process start with
//! `last_ping` set to the start instant. The [`CronMonitor`] periodically
//! compares the time since the last ping with the allowed gap and raises a
//! single alert per gap; the next ping re-arms it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::CronMonitorConfig;
use crate::notify::Notifier;

#[derive(Debug, Clone)]
pub struct LivenessState {
	last_ping: Instant,
	last_alert: Option<Instant>,
	pings: u64,
}

pub type SharedLiveness = Arc<Mutex<LivenessState>>;

impl LivenessState {
	pub fn new(now: Instant) -> Self {
		Self {
			last_ping: now,
			last_alert: None,
			pings: 0,
		}
	}

	/// Fresh shared state stamped with the current instant.
	pub fn shared() -> SharedLiveness {
		Arc::new(Mutex::new(Self::new(Instant::now())))
	}

	pub fn record_ping(&mut self, now: Instant) {
		self.last_ping = now;
		self.pings += 1;
	}

	pub fn pings(&self) -> u64 {
		self.pings
	}

	/// Returns the current gap if it exceeds `max_gap` and has not been alerted yet.
	pub fn check(&mut self, now: Instant, max_gap: Duration) -> Option<Duration> {
		let gap = now.saturating_duration_since(self.last_ping);
		if gap <= max_gap {
			return None;
		}
		if self.last_alert.is_some_and(|alerted| alerted >= self.last_ping) {
			return None;
		}
		self.last_alert = Some(now);
		Some(gap)
	}
}

fn minutes(count: u64) -> Duration {
	Duration::from_secs(count.saturating_mul(60))
}

pub fn alert_message(gap: Duration) -> String {
	format!("No liveness ping for {} minutes; the uptime pinger may be down", gap.as_secs() / 60)
}

pub struct CronMonitor {
	check_every: Duration,
	max_gap: Duration,
	liveness: SharedLiveness,
	notifier: Arc<dyn Notifier>,
}

impl CronMonitor {
	/// Returns `None` when the monitor is disabled.
	pub fn from_config(config: &CronMonitorConfig, liveness: SharedLiveness, notifier: Arc<dyn Notifier>) -> Option<Self> {
		config.enabled.then(|| Self {
			check_every: minutes(config.check_every_minutes),
			max_gap: minutes(config.max_gap_minutes),
			liveness,
			notifier,
		})
	}

	/// Runs one check; returns the gap when an alert was raised.
	pub fn tick(&self) -> Option<Duration> {
		let gap = self.liveness.lock().check(Instant::now(), self.max_gap)?;
		warn!(target = "afk.liveness", gap_secs = gap.as_secs(), "liveness pings stopped");
		self.notifier.notify(&alert_message(gap));
		Some(gap)
	}

	pub async fn run(self, shutdown: CancellationToken) {
		let mut ticker = tokio::time::interval_at(Instant::now() + self.check_every, self.check_every);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		loop {
			tokio::select! {
				biased;
				_ = shutdown.cancelled() => break,
				_ = ticker.tick() => {
					self.tick();
				}
			}
		}
		debug!(target = "afk.liveness", "cron monitor stopped");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::notify::RecordingNotifier;

	const MIN: Duration = Duration::from_secs(60);

	#[test]
	fn one_alert_per_gap_until_next_ping() {
		let start = Instant::now();
		let mut state = LivenessState::new(start);
		let max_gap = 15 * MIN;

		assert_eq!(state.check(start + 15 * MIN, max_gap), None);
		assert_eq!(state.check(start + 16 * MIN, max_gap), Some(16 * MIN));
		assert_eq!(state.check(start + 20 * MIN, max_gap), None);
		assert_eq!(state.check(start + 60 * MIN, max_gap), None);

		state.record_ping(start + 61 * MIN);
		assert_eq!(state.check(start + 70 * MIN, max_gap), None);
		assert_eq!(state.check(start + 77 * MIN, max_gap), Some(16 * MIN));
		assert_eq!(state.pings(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn monitor_alerts_once_for_a_long_silence() {
		let liveness = LivenessState::shared();
		let notifier = Arc::new(RecordingNotifier::new());
		let monitor = CronMonitor::from_config(
			&CronMonitorConfig {
				enabled: true,
				check_every_minutes: 5,
				max_gap_minutes: 15,
			},
			liveness.clone(),
			notifier.clone(),
		)
		.unwrap();

		let shutdown = CancellationToken::new();
		let task = tokio::spawn(monitor.run(shutdown.clone()));

		tokio::time::sleep(61 * MIN).await;
		assert_eq!(notifier.messages().len(), 1);
		assert!(notifier.messages()[0].starts_with("No liveness ping for 20 minutes"));

		liveness.lock().record_ping(Instant::now());
		tokio::time::sleep(21 * MIN).await;
		assert_eq!(notifier.messages().len(), 2);

		shutdown.cancel();
		task.await.unwrap();
	}

	#[test]
	fn oversized_minutes_saturate_instead_of_overflowing() {
		assert_eq!(minutes(15), 15 * MIN);
		assert_eq!(minutes(u64::MAX), Duration::from_secs(u64::MAX));
	}

	#[test]
	fn disabled_monitor_is_not_built() {
		let config = CronMonitorConfig::default();
		assert!(CronMonitor::from_config(&config, LivenessState::shared(), Arc::new(RecordingNotifier::new())).is_none());
	}
}

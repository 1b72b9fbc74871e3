//! Deferred and repeating session timers with explicit cancellation.
//!
//! Timers never touch session state directly: when one fires it posts an
//! event into the owning session's inbox, and the session decides whether the
//! event is still relevant. Cancelling the scope stops every pending timer;
//! dropping it does the same.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Owns every timer spawned on behalf of one session.
#[derive(Debug)]
pub struct TimerScope<E> {
	token: CancellationToken,
	inbox: mpsc::UnboundedSender<E>,
}

impl<E> TimerScope<E>
where
	E: Clone + Send + 'static,
{
	pub fn new(inbox: mpsc::UnboundedSender<E>) -> Self {
		Self {
			token: CancellationToken::new(),
			inbox,
		}
	}

	/// Posts `event` once after `delay`.
	pub fn after(&self, delay: Duration, event: E) {
		if self.token.is_cancelled() {
			return;
		}
		let token = self.token.clone();
		let inbox = self.inbox.clone();
		tokio::spawn(async move {
			tokio::select! {
				biased;
				_ = token.cancelled() => {}
				_ = tokio::time::sleep(delay) => {
					let _ = inbox.send(event);
				}
			}
		});
	}

	/// Posts `event` at `first`, then every `period`, until cancelled.
	pub fn every(&self, first: Duration, period: Duration, event: E) {
		if self.token.is_cancelled() {
			return;
		}
		let token = self.token.clone();
		let inbox = self.inbox.clone();
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval_at(Instant::now() + first, period);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				tokio::select! {
					biased;
					_ = token.cancelled() => break,
					_ = ticker.tick() => {
						if inbox.send(event.clone()).is_err() {
							break;
						}
					}
				}
			}
		});
	}

	/// Stops every pending timer; later `after`/`every` calls are ignored.
	pub fn cancel(&self) {
		self.token.cancel();
	}

	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}
}

impl<E> Drop for TimerScope<E> {
	fn drop(&mut self) {
		self.token.cancel();
	}
}

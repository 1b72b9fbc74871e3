//! Connect, run, back off, repeat.

use std::sync::Arc;

use afk_runtime::Connector;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::notify::Notifier;
use crate::reconnect::ReconnectPolicy;
use crate::session::{Session, SessionEnd, SessionOutcome};

/// Runs sessions back to back, never more than one at a time.
pub struct Supervisor {
	config: Arc<BotConfig>,
	connector: Arc<dyn Connector>,
	notifier: Arc<dyn Notifier>,
	policy: ReconnectPolicy,
}

impl Supervisor {
	pub fn new(config: Arc<BotConfig>, connector: Arc<dyn Connector>, notifier: Arc<dyn Notifier>) -> Self {
		let policy = ReconnectPolicy::from_config(&config.utils);
		Self {
			config,
			connector,
			notifier,
			policy,
		}
	}

	pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Loops until shutdown or until the policy declines to reconnect.
	///
	/// Returns the outcome of the last session.
	pub async fn run(&self, shutdown: CancellationToken) -> SessionOutcome {
		let mut attempt: u64 = 0;
		loop {
			attempt += 1;
			let outcome = self.run_once(&shutdown).await;

			let Some(delay) = self.policy.next_delay(&outcome) else {
				info!(target = "afk.reconnect", outcome = %outcome.end, "not reconnecting");
				return outcome;
			};
			info!(
				target = "afk.reconnect",
				attempt,
				delay_ms = delay.as_millis() as u64,
				conflict = outcome.left_due_to_conflict,
				"reconnecting after delay"
			);

			tokio::select! {
				biased;
				_ = shutdown.cancelled() => {
					return SessionOutcome {
						end: SessionEnd::Shutdown,
						left_due_to_conflict: outcome.left_due_to_conflict,
					};
				}
				_ = tokio::time::sleep(delay) => {}
			}
		}
	}

	/// Opens one link and runs a session on it to completion.
	pub async fn run_once(&self, shutdown: &CancellationToken) -> SessionOutcome {
		let request = self.config.connect_request();
		info!(target = "afk.session", server = %request.address(), username = %request.username, "connecting");

		let connected = tokio::select! {
			biased;
			_ = shutdown.cancelled() => {
				return SessionOutcome {
					end: SessionEnd::Shutdown,
					left_due_to_conflict: false,
				};
			}
			result = self.connector.connect(&request) => result,
		};

		match connected {
			Ok(link) => {
				Session::new(Arc::clone(&self.config), link, Arc::clone(&self.notifier))
					.run(shutdown.clone())
					.await
			}
			Err(err) => {
				warn!(target = "afk.session", server = %request.address(), error = %err, "connect failed");
				self.notifier
					.notify(&format!("Bot could not connect to {}: {err}", request.address()));
				SessionOutcome::connect_failed(err.to_string())
			}
		}
	}
}

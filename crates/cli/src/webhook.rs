//! Discord-style webhook notifier.

use afk::Notifier;
use afk::config::WebhookConfig;
use serde_json::json;
use tracing::{debug, warn};

/// Posts `{"content": message}` to a webhook URL without waiting for delivery.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
	client: reqwest::Client,
	url: String,
}

impl WebhookNotifier {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			url: url.into(),
		}
	}

	/// Returns `None` when disabled or when no URL is configured.
	pub fn from_config(config: &WebhookConfig) -> Option<Self> {
		if !config.enabled {
			return None;
		}
		if config.url.trim().is_empty() {
			warn!(target = "afk.notify", "discord-webhook is enabled but has no url; notifications disabled");
			return None;
		}
		Some(Self::new(config.url.trim()))
	}
}

impl Notifier for WebhookNotifier {
	fn notify(&self, message: &str) {
		let Ok(runtime) = tokio::runtime::Handle::try_current() else {
			warn!(target = "afk.notify", "no runtime available; notification dropped");
			return;
		};
		let client = self.client.clone();
		let url = self.url.clone();
		let payload = json!({ "content": message });
		runtime.spawn(async move {
			let result = client
				.post(&url)
				.json(&payload)
				.send()
				.await
				.and_then(|response| response.error_for_status());
			match result {
				Ok(_) => debug!(target = "afk.notify", "webhook delivered"),
				Err(err) => warn!(target = "afk.notify", error = %err, "webhook delivery failed"),
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn disabled_or_missing_url_yields_none() {
		let mut config = WebhookConfig {
			enabled: false,
			url: "https://discord.example/api/webhooks/1".into(),
		};
		assert!(WebhookNotifier::from_config(&config).is_none());
		config.enabled = true;
		assert!(WebhookNotifier::from_config(&config).is_some());
		config.url = "  ".into();
		assert!(WebhookNotifier::from_config(&config).is_none());
	}
}

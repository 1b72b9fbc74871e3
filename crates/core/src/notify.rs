//! Out-of-band operator notifications.

use parking_lot::Mutex;

/// Fire-and-forget sink for operator-facing messages.
///
/// Implementations must not block the caller and must swallow their own
/// delivery failures.
pub trait Notifier: Send + Sync {
	fn notify(&self, message: &str);
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
	fn notify(&self, _message: &str) {}
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
	messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn messages(&self) -> Vec<String> {
		self.messages.lock().clone()
	}
}

impl Notifier for RecordingNotifier {
	fn notify(&self, message: &str) {
		self.messages.lock().push(message.to_string());
	}
}

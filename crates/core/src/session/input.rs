use afk_protocol::{ClientEvent, ControlFlag};

/// Everything a session reacts to, delivered one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
	Client(ClientEvent),
	Timer(TimerEvent),
	/// The link's event stream ended without a terminal event.
	LinkClosed,
}

/// Deadlines posted back to the session by its timer scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
	ConnectTimeout,
	IdleTick,
	Release(ControlFlag),
	ChatBroadcast,
	ChatOnce(usize),
	AuthLogin,
}

impl From<ClientEvent> for SessionInput {
	fn from(event: ClientEvent) -> Self {
		SessionInput::Client(event)
	}
}

impl From<TimerEvent> for SessionInput {
	fn from(event: TimerEvent) -> Self {
		SessionInput::Timer(event)
	}
}

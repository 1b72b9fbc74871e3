//! In-memory links for exercising session policy without a game bridge.
//!
//! # Example
//!
//! ```ignore
//! let (link, controller) = fake_link();
//! controller.connected("AfkBot", &[]);
//! // ... drive a session with `link` ...
//! let sent = controller.take_sent();
//! ```

use std::collections::VecDeque;

use afk_protocol::{ClientCommand, ClientEvent, ConnectRequest, Peer};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{Result, TransportError};
use crate::link::{BoxFuture, ClientLink, Connector};

/// Creates a link plus the controller that plays the bridge side.
pub fn fake_link() -> (ClientLink, FakeLinkController) {
	let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
	let (evt_tx, evt_rx) = mpsc::unbounded_channel();

	let controller = FakeLinkController {
		events: Mutex::new(Some(evt_tx)),
		commands: Mutex::new(cmd_rx),
	};

	(ClientLink::new(cmd_tx, evt_rx), controller)
}

/// Bridge-side handle for a fake link: injects events and captures commands.
pub struct FakeLinkController {
	events: Mutex<Option<mpsc::UnboundedSender<ClientEvent>>>,
	commands: Mutex<mpsc::UnboundedReceiver<ClientCommand>>,
}

impl FakeLinkController {
	/// Inject a raw event into the link.
	pub fn inject(&self, event: ClientEvent) {
		if let Some(events) = self.events.lock().as_ref() {
			let _ = events.send(event);
		}
	}

	pub fn connected(&self, username: &str, peers: &[&str]) {
		self.inject(ClientEvent::Connected {
			username: username.to_string(),
			peers: peers.iter().map(|name| Peer::new(*name)).collect(),
			position: None,
		});
	}

	pub fn chat(&self, sender: Option<&str>, message: &str) {
		self.inject(ClientEvent::Chat {
			sender: sender.map(str::to_string),
			message: message.to_string(),
		});
	}

	pub fn peer_joined(&self, username: &str) {
		self.inject(ClientEvent::PeerJoined { peer: Peer::new(username) });
	}

	/// Simulates the bridge dropping the connection.
	pub fn close(&self) {
		self.events.lock().take();
	}

	/// Take all commands sent so far, clearing the buffer.
	pub fn take_sent(&self) -> Vec<ClientCommand> {
		let mut commands = self.commands.lock();
		let mut sent = Vec::new();
		while let Ok(command) = commands.try_recv() {
			sent.push(command);
		}
		sent
	}
}

/// Connector that serves queued fake links in order.
#[derive(Default)]
pub struct FakeConnector {
	queue: Mutex<VecDeque<std::result::Result<ClientLink, String>>>,
	requests: Mutex<Vec<ConnectRequest>>,
}

impl FakeConnector {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a fresh link and returns its controller.
	pub fn push_link(&self) -> FakeLinkController {
		let (link, controller) = fake_link();
		self.queue.lock().push_back(Ok(link));
		controller
	}

	/// Queues a connect failure.
	pub fn push_failure(&self, message: impl Into<String>) {
		self.queue.lock().push_back(Err(message.into()));
	}

	/// Connect requests received so far.
	pub fn requests(&self) -> Vec<ConnectRequest> {
		self.requests.lock().clone()
	}
}

impl Connector for FakeConnector {
	fn connect<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, Result<ClientLink>> {
		self.requests.lock().push(request.clone());
		let next = self.queue.lock().pop_front();
		Box::pin(async move {
			match next {
				Some(Ok(link)) => Ok(link),
				Some(Err(message)) => Err(TransportError::Connect(message)),
				None => Err(TransportError::Connect("no fake link queued".to_string())),
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use afk_protocol::AccountKind;

	use super::*;

	fn request() -> ConnectRequest {
		ConnectRequest {
			host: "localhost".to_string(),
			port: 25565,
			username: "AfkBot".to_string(),
			password: None,
			auth: AccountKind::Offline,
			version: None,
		}
	}

	#[tokio::test]
	async fn controller_captures_sent_commands() {
		let (link, controller) = fake_link();
		link.send(ClientCommand::chat("hi")).unwrap();
		link.send(ClientCommand::Disconnect { reason: "bye".into() }).unwrap();

		let sent = controller.take_sent();
		assert_eq!(sent, vec![ClientCommand::chat("hi"), ClientCommand::Disconnect { reason: "bye".into() }]);
		assert!(controller.take_sent().is_empty());
	}

	#[tokio::test]
	async fn injected_events_reach_the_link_until_closed() {
		let (mut link, controller) = fake_link();
		controller.peer_joined("Steve");
		controller.close();
		controller.chat(None, "dropped after close");

		assert_eq!(link.recv().await, Some(ClientEvent::PeerJoined { peer: Peer::new("Steve") }));
		assert_eq!(link.recv().await, None);
	}

	#[tokio::test]
	async fn connector_serves_queue_in_order_then_fails() {
		let connector = FakeConnector::new();
		connector.push_failure("refused");
		let _controller = connector.push_link();

		assert!(matches!(connector.connect(&request()).await, Err(TransportError::Connect(msg)) if msg == "refused"));
		assert!(connector.connect(&request()).await.is_ok());
		assert!(connector.connect(&request()).await.is_err());
		assert_eq!(connector.requests().len(), 3);
	}
}

//! Session-facing link and connector abstraction.

use std::future::Future;
use std::pin::Pin;

use afk_protocol::{ClientCommand, ClientEvent, ConnectRequest};
use tokio::sync::mpsc;

use crate::error::{Result, TransportError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One open connection to the session client.
///
/// Commands are queued without blocking; the transport drains them in order.
/// Dropping the link closes the command channel, which ends the transport's
/// writer and closes the underlying connection.
#[derive(Debug)]
pub struct ClientLink {
	commands: mpsc::UnboundedSender<ClientCommand>,
	events: mpsc::UnboundedReceiver<ClientEvent>,
}

impl ClientLink {
	pub fn new(commands: mpsc::UnboundedSender<ClientCommand>, events: mpsc::UnboundedReceiver<ClientEvent>) -> Self {
		Self { commands, events }
	}

	/// Queues a command for the client.
	///
	/// # Errors
	///
	/// Returns [`TransportError::ConnectionClosed`] once the transport has gone away.
	pub fn send(&self, command: ClientCommand) -> Result<()> {
		self.commands.send(command).map_err(|_| TransportError::ConnectionClosed)
	}

	/// Waits for the next event; `None` once the client side is closed.
	pub async fn recv(&mut self) -> Option<ClientEvent> {
		self.events.recv().await
	}
}

/// Opens client links for a connect request.
pub trait Connector: Send + Sync {
	fn connect<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, Result<ClientLink>>;
}

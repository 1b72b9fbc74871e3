//! WebSocket transport to an external game bridge.
//!
//! Every frame is one JSON text message. The first frame sent on a new
//! connection is [`ClientCommand::Connect`]; after that the bridge streams
//! [`ClientEvent`]s and accepts further commands until either side closes.

use std::time::Duration;

use afk_protocol::{ClientCommand, ClientEvent, ConnectRequest};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

use crate::error::{Result, TransportError};
use crate::link::{BoxFuture, ClientLink, Connector};

type BridgeStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);

/// Connector that opens one bridge WebSocket per session.
#[derive(Debug, Clone)]
pub struct BridgeConnector {
	url: String,
	handshake_timeout: Duration,
}

impl BridgeConnector {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
		}
	}

	/// Bounds the WebSocket handshake; the session's own connect timeout only starts afterwards.
	pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
		self.handshake_timeout = timeout;
		self
	}

	async fn open(&self, request: &ConnectRequest) -> Result<ClientLink> {
		let (ws, _response) = tokio::time::timeout(self.handshake_timeout, connect_async(self.url.as_str()))
			.await
			.map_err(|_| TransportError::Connect(format!("timed out after {:?} connecting to {}", self.handshake_timeout, self.url)))?
			.map_err(|e| TransportError::Connect(format!("{}: {}", self.url, e)))?;

		let (mut sink, stream) = ws.split();
		let hello = serde_json::to_string(&ClientCommand::Connect(request.clone()))?;
		sink.send(Message::Text(hello.into())).await?;

		debug!(
			target = "afk.bridge",
			url = %self.url,
			server = %request.address(),
			username = %request.username,
			"bridge connection opened"
		);

		let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
		let (evt_tx, evt_rx) = mpsc::unbounded_channel();
		tokio::spawn(write_loop(sink, cmd_rx));
		tokio::spawn(read_loop(stream, evt_tx));

		Ok(ClientLink::new(cmd_tx, evt_rx))
	}
}

impl Connector for BridgeConnector {
	fn connect<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, Result<ClientLink>> {
		Box::pin(self.open(request))
	}
}

async fn write_loop(mut sink: SplitSink<BridgeStream, Message>, mut commands: mpsc::UnboundedReceiver<ClientCommand>) {
	while let Some(command) = commands.recv().await {
		let payload = match serde_json::to_string(&command) {
			Ok(payload) => payload,
			Err(err) => {
				warn!(target = "afk.bridge", error = %err, "failed to encode command");
				continue;
			}
		};
		if let Err(err) = sink.send(Message::Text(payload.into())).await {
			debug!(target = "afk.bridge", error = %err, "bridge write failed; stopping writer");
			return;
		}
	}

	let _ = sink.close().await;
}

async fn read_loop(mut stream: SplitStream<BridgeStream>, events: mpsc::UnboundedSender<ClientEvent>) {
	while let Some(frame) = stream.next().await {
		let text = match frame {
			Ok(Message::Text(text)) => text,
			Ok(Message::Close(frame)) => {
				debug!(target = "afk.bridge", ?frame, "bridge closed connection");
				break;
			}
			Ok(_) => continue,
			Err(err) => {
				let _ = events.send(ClientEvent::Error { message: err.to_string() });
				break;
			}
		};

		match serde_json::from_str::<ClientEvent>(&text) {
			Ok(event) => {
				if events.send(event).is_err() {
					break;
				}
			}
			Err(err) => {
				warn!(target = "afk.bridge", error = %err, frame = %text.as_str(), "ignoring malformed bridge frame");
			}
		}
	}
}

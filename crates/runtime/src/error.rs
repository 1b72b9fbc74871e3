use thiserror::Error;

/// Errors raised while opening or using a bridge link.
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("Failed to connect to bridge: {0}")]
	Connect(String),

	#[error("Bridge connection closed")]
	ConnectionClosed,

	#[error("Invalid bridge frame: {0}")]
	Json(#[from] serde_json::Error),

	#[error("WebSocket error: {0}")]
	WebSocket(Box<tokio_tungstenite::tungstenite::Error>),
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
	fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
		TransportError::WebSocket(Box::new(err))
	}
}

pub type Result<T> = std::result::Result<T, TransportError>;

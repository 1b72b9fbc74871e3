use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the session engine.
///
/// Only configuration errors are fatal to the process; everything else is
/// logged and absorbed by the reconnect loop.
#[derive(Debug, Error)]
pub enum Error {
	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Failed to parse config {}: {source}", path.display())]
	ConfigParse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

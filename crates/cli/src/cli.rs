use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "afk")]
#[command(about = "Keep a game client online without getting in the way of real players")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Settings file
	#[arg(short, long, global = true, env = "AFK_CONFIG", default_value = "settings.json", value_name = "FILE")]
	pub config: PathBuf,

	/// WebSocket URL of the game bridge
	#[arg(long, global = true, env = "AFK_BRIDGE_URL", default_value = "ws://127.0.0.1:8790", value_name = "URL")]
	pub bridge: String,

	/// Liveness endpoint port (overrides liveness.port)
	#[arg(long, global = true, env = "PORT")]
	pub port: Option<u16>,

	#[command(subcommand)]
	pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Commands {
	/// Connect and keep the session alive (default)
	#[default]
	Run,

	/// Validate the settings file and print the effective configuration
	Check,
}

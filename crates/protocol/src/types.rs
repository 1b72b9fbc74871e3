//! Shared value types carried by events and commands.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Continuous entity position reported by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
	}
}

/// Integer block coordinate used as a navigation goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockPos {
	pub x: i32,
	pub y: i32,
	pub z: i32,
}

impl fmt::Display for BlockPos {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {}, {})", self.x, self.y, self.z)
	}
}

/// A connected participant as seen by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peer {
	/// In-game identity (username).
	pub username: String,
}

impl Peer {
	pub fn new(username: impl Into<String>) -> Self {
		Self { username: username.into() }
	}
}

/// Horizontal movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
	Forward,
	Back,
	Left,
	Right,
}

impl Direction {
	pub const ALL: [Direction; 4] = [Direction::Forward, Direction::Back, Direction::Left, Direction::Right];
}

/// Named movement control toggled with `set_control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlFlag {
	Forward,
	Back,
	Left,
	Right,
	Jump,
	Sneak,
}

impl From<Direction> for ControlFlag {
	fn from(direction: Direction) -> Self {
		match direction {
			Direction::Forward => ControlFlag::Forward,
			Direction::Back => ControlFlag::Back,
			Direction::Left => ControlFlag::Left,
			Direction::Right => ControlFlag::Right,
		}
	}
}

impl fmt::Display for ControlFlag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ControlFlag::Forward => "forward",
			ControlFlag::Back => "back",
			ControlFlag::Left => "left",
			ControlFlag::Right => "right",
			ControlFlag::Jump => "jump",
			ControlFlag::Sneak => "sneak",
		};
		f.write_str(name)
	}
}

/// Account authentication flavour requested from the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
	#[default]
	Offline,
	Mojang,
	Microsoft,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn directions_map_onto_controls() {
		let controls: Vec<ControlFlag> = Direction::ALL.iter().copied().map(ControlFlag::from).collect();
		assert_eq!(controls, vec![ControlFlag::Forward, ControlFlag::Back, ControlFlag::Left, ControlFlag::Right]);
	}

	#[test]
	fn control_flag_uses_snake_case_on_the_wire() {
		assert_eq!(serde_json::to_string(&ControlFlag::Jump).unwrap(), "\"jump\"");
		assert_eq!(ControlFlag::Sneak.to_string(), "sneak");
	}
}

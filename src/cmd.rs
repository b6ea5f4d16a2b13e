//! Velocity commands and the finger-count binding table.

use serde::{Deserialize, Serialize};

/// Linear speed magnitude of every drive command.
pub const SPEED: f64 = 0.2;

/// Angular speed magnitude of every turn command.
pub const TURN: f64 = 0.2;

/// A 3-component vector, serialized component-wise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A two-axis velocity command.
///
/// The message carries all six scalar fields of a twist, but only `linear.x`
/// and `angular.z` are ever non-zero here. Both stay within
/// `[-SPEED, SPEED]` / `[-TURN, TURN]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

impl Twist {
    fn new(linear_x: f64, angular_z: f64) -> Self {
        Self {
            linear: Vector3 {
                x: linear_x,
                ..Vector3::default()
            },
            angular: Vector3 {
                z: angular_z,
                ..Vector3::default()
            },
        }
    }
}

/// (linear, angular) velocity signs per finger count, indexed by `count - 1`.
const MOVE_BINDINGS: [(f64, f64); 5] = [
    (1.0, 0.0),  // 1: forward
    (-1.0, 0.0), // 2: backward
    (0.0, 1.0),  // 3: turn left
    (0.0, -1.0), // 4: turn right (but see `command_for`)
    (0.0, 0.0),  // 5: stop
];

/// Maps an extended-finger count to the command to publish.
///
/// Counts outside `1..=5` have no binding and map to `None`: such a frame is
/// skipped without publishing anything. The mapping is pure; identical counts
/// always yield identical commands.
pub fn command_for(count: u8) -> Option<Twist> {
    // The four-finger branch reads the linear column for its angular sign and
    // therefore commands a stop rather than the right turn its binding
    // encodes. Deployed consumers are tuned to this; changing it would make
    // 3 and 4 mirror each other as left/right turns.
    let (x, th) = match count {
        1 => MOVE_BINDINGS[0],
        2 => MOVE_BINDINGS[1],
        3 => MOVE_BINDINGS[2],
        4 => (MOVE_BINDINGS[3].0, MOVE_BINDINGS[3].0),
        5 => MOVE_BINDINGS[4],
        _ => return None,
    };

    Some(Twist::new(SPEED * x, TURN * th))
}

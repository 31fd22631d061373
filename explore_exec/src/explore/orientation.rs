//! # Logical orientation tracker
//!
//! The robot's heading is tracked as one of four logical directions relative to its heading at
//! the start of the run. It is never measured, only rotated by a quarter turn whenever the
//! controller commands a turn, and is used to pick which axis and sign a coordinate update
//! applies to.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::Display;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Logical heading relative to the start pose.
///
/// Axis mapping: `Forward` is +x, `Backward` is -x, `Left` is +y and `Right` is -y.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Forward,
    Backward,
    Left,
    Right,
}

/// Direction of an in-place quarter turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDir {
    Left,
    Right,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Orientation {
    fn default() -> Self {
        Orientation::Forward
    }
}

impl Orientation {
    /// The orientation after a quarter turn to the left.
    ///
    /// Cycle: `Forward -> Left -> Backward -> Right -> Forward`.
    pub fn rotate_left(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Left,
            Orientation::Left => Orientation::Backward,
            Orientation::Backward => Orientation::Right,
            Orientation::Right => Orientation::Forward,
        }
    }

    /// The orientation after a quarter turn to the right, the reverse of [`Self::rotate_left`].
    pub fn rotate_right(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Right,
            Orientation::Right => Orientation::Backward,
            Orientation::Backward => Orientation::Left,
            Orientation::Left => Orientation::Forward,
        }
    }

    pub fn rotate(self, dir: TurnDir) -> Self {
        match dir {
            TurnDir::Left => self.rotate_left(),
            TurnDir::Right => self.rotate_right(),
        }
    }

    /// Unit vector of this orientation in the start frame.
    pub fn unit_vector(self) -> (f64, f64) {
        match self {
            Orientation::Forward => (1.0, 0.0),
            Orientation::Backward => (-1.0, 0.0),
            Orientation::Left => (0.0, 1.0),
            Orientation::Right => (0.0, -1.0),
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Forward => write!(f, "Forward"),
            Orientation::Backward => write!(f, "Backward"),
            Orientation::Left => write!(f, "Left"),
            Orientation::Right => write!(f, "Right"),
        }
    }
}

//! # Position log
//!
//! Append-only, time-ordered trace of the robot's estimated positions during one exploration run.
//! The log is written only by the exploration controller, external consumers (renderers,
//! persisters) get read-only access to it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::orientation::Orientation;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single estimated position sample.
///
/// Serialised as `{"x": .., "y": .., "orientation": ..}`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Position along the start heading.
    ///
    /// Units: meters
    #[serde(rename = "x")]
    pub x_m: f64,

    /// Position to the left of the start heading.
    ///
    /// Units: meters
    #[serde(rename = "y")]
    pub y_m: f64,

    /// Logical orientation of the robot when the sample was taken.
    pub orientation: Orientation,
}

/// The estimated path of the robot.
///
/// Serialised as a flat array of [`Position`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionLog(Vec<Position>);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Position {
    pub fn new(x_m: f64, y_m: f64, orientation: Orientation) -> Self {
        Self {
            x_m,
            y_m,
            orientation,
        }
    }
}

impl PositionLog {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a new sample to the end of the log.
    pub(crate) fn push(&mut self, position: Position) {
        self.0.push(position)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The most recent sample, or `None` if the log is empty.
    pub fn last(&self) -> Option<&Position> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Position> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Position] {
        &self.0
    }

    /// Serialise the log into its flat JSON array form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<'a> IntoIterator for &'a PositionLog {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

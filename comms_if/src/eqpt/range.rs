//! # Ultrasonic range sensor interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Range reported by the sensors when there is no return, i.e. nothing within range.
///
/// Units: meters
pub const SATURATION_RANGE_M: f64 = 1.5;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The range sensors fitted to the robot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeSensor {
    /// Looks along the robot's heading.
    Forward,

    /// Looks out of the robot's right hand side.
    Side,
}

//! # Motion layer interface
//!
//! Waypoints are relative motion commands executed one at a time by the motion layer. They are
//! expressed in the motion layer's local reference frame, which is reset to the robot's current
//! pose on request:
//!
//! - `dx_m` - distance along the robot's heading at the time of the reset, positive forwards.
//! - `dy_m` - lateral distance, positive to the left.
//! - `dtheta_rad` - heading change, following the right hand rule about the robot's Z+ (upwards)
//!   axis, so that a positive angle is a turn to the left.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A relative motion command.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    /// Forward distance in meters.
    pub dx_m: f64,

    /// Lateral distance in meters, positive to the left.
    pub dy_m: f64,

    /// Heading change in radians, positive to the left.
    pub dtheta_rad: f64,
}

/// A pose of the robot as reported by the motion layer, in the motion layer's odometry frame.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionPose {
    pub x_m: f64,
    pub y_m: f64,
    pub heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Events raised by the motion layer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotionEvent {
    /// The active waypoint has been reached.
    WaypointArrived {
        waypoint: Waypoint,

        /// True if there are no more waypoints queued behind this one.
        is_last: bool,
    },

    /// The active waypoint could not be reached.
    WaypointMissed {
        waypoint: Waypoint,
        is_last: bool,
        reason: MissReason,
    },

    /// An obstacle has appeared within the obstacle avoidance standoff.
    ObstacleAppeared,

    /// The obstacle previously reported is no longer within the standoff.
    ObstacleCleared,
}

/// Reasons the motion layer may give for missing a waypoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissReason {
    /// The robot's path was physically blocked.
    Blocked,

    /// The waypoint was not reached within the motion layer's time limit.
    Timeout,

    /// The motion layer could not plan a motion to the waypoint.
    Unreachable,

    /// Any other vendor-specific reason code.
    Other(i32),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Waypoint {
    /// A waypoint that does not move the robot.
    pub fn null() -> Self {
        Self::default()
    }

    /// Drive straight forwards by the given distance.
    pub fn forward(dist_m: f64) -> Self {
        Self {
            dx_m: dist_m,
            ..Self::default()
        }
    }

    /// Drive forwards by the given distance while moving sideways by the given lateral distance.
    pub fn forward_lateral(dist_m: f64, lateral_m: f64) -> Self {
        Self {
            dx_m: dist_m,
            dy_m: lateral_m,
            dtheta_rad: 0.0,
        }
    }

    /// Turn on the spot by 90 degrees to the left.
    pub fn turn_left() -> Self {
        Self {
            dtheta_rad: FRAC_PI_2,
            ..Self::default()
        }
    }

    /// Turn on the spot by 90 degrees to the right.
    pub fn turn_right() -> Self {
        Self {
            dtheta_rad: -FRAC_PI_2,
            ..Self::default()
        }
    }

    /// Returns true if the waypoint includes a translation.
    pub fn is_translation(&self) -> bool {
        self.dx_m != 0.0 || self.dy_m != 0.0
    }
}

impl MissReason {
    /// The numeric reason code used on the wire.
    pub fn code(&self) -> i32 {
        match self {
            MissReason::Blocked => 1,
            MissReason::Timeout => 2,
            MissReason::Unreachable => 3,
            MissReason::Other(c) => *c,
        }
    }

    /// Build a reason from a numeric reason code.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => MissReason::Blocked,
            2 => MissReason::Timeout,
            3 => MissReason::Unreachable,
            c => MissReason::Other(c),
        }
    }
}

//! # ExploreCtrl Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::range::{RangeSensor, SATURATION_RANGE_M};
use serde::Deserialize;
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the exploration controller.
#[derive(Debug, Clone, Deserialize)]
pub struct ExploreCtrlParams {
    // ---- MOTION ----
    /// Length of one walking leg, also the dead reckoning step for `Walking` and `CornerForward`.
    ///
    /// Units: meters
    pub step_m: f64,

    /// Length of the leg driven along the new wall surface when wrapping a corner.
    ///
    /// Units: meters
    pub corner_leg_m: f64,

    /// Total distance credited to the position estimate at the end of a corner sequence.
    ///
    /// Units: meters
    pub corner_advance_m: f64,

    /// Lateral correction away from the wall applied when resuming a walk too close to it.
    ///
    /// Units: meters
    pub wall_correction_m: f64,

    /// Lateral correction towards the wall applied on the corner leg.
    ///
    /// Units: meters
    pub corner_correction_m: f64,

    // ---- SENSING ----
    /// Obstacle avoidance standoff of the motion layer, and the range at or below which the way
    /// ahead is considered blocked.
    ///
    /// Units: meters
    pub obstacle_standoff_m: f64,

    /// Wall range at or below which the robot is considered too close to the followed wall.
    ///
    /// Units: meters
    pub wall_close_m: f64,

    /// Range reported by the sensors when there is no return.
    ///
    /// Units: meters
    pub saturation_m: f64,

    /// Sensor read by the wall probe once the robot has turned to face the followed wall.
    pub wall_probe_sensor: RangeSensor,

    /// Time to wait before trusting an obstacle or wall probe reading.
    ///
    /// Units: milliseconds
    pub debounce_ms: u64,

    // ---- START UP ----
    /// Number of null waypoints queued by `start` to raise the first arrival event.
    pub initial_null_waypoints: u8,

    // ---- RECOVERY ----
    /// Number of times a missed waypoint may be re-driven before the run is abandoned.
    pub max_waypoint_retries: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ExploreCtrlParams {
    fn default() -> Self {
        Self {
            step_m: 0.5,
            corner_leg_m: 1.0,
            corner_advance_m: 1.25,
            wall_correction_m: 0.1,
            corner_correction_m: 0.1,
            obstacle_standoff_m: 1.0,
            wall_close_m: 0.8,
            saturation_m: SATURATION_RANGE_M,
            wall_probe_sensor: RangeSensor::Forward,
            debounce_ms: 300,
            initial_null_waypoints: 2,
            max_waypoint_retries: 3,
        }
    }
}

impl ExploreCtrlParams {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

//! # SimWorld Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::range::SATURATION_RANGE_M;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the simulated world.
#[derive(Debug, Clone, Deserialize)]
pub struct SimWorldParams {
    // ---- ROOM ----
    /// Extent of the room along the world x axis, the room spans `[0, room_width_m]`.
    ///
    /// Units: meters
    pub room_width_m: f64,

    /// Extent of the room along the world y axis, the room spans `[0, room_height_m]`.
    ///
    /// Units: meters
    pub room_height_m: f64,

    // ---- ROBOT ----
    /// Initial position of the robot in the world.
    ///
    /// Units: meters
    pub start_position_m: [f64; 2],

    /// Initial heading of the robot, anticlockwise from the world x axis.
    ///
    /// Units: radians
    pub start_heading_rad: f64,

    /// Units: meters/second
    pub linear_speed_ms: f64,

    /// Units: radians/second
    pub angular_speed_rads: f64,

    /// Radius of the robot's footprint, used for collision checking.
    ///
    /// Units: meters
    pub robot_radius_m: f64,

    // ---- SENSORS ----
    /// Maximum range of the range sensors.
    ///
    /// Units: meters
    pub saturation_m: f64,

    // ---- SIMULATION ----
    /// Period at which the world is stepped by the [`crate::sim_client::SimClient`].
    ///
    /// Units: seconds
    pub tick_period_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimWorldParams {
    fn default() -> Self {
        Self {
            room_width_m: 6.0,
            room_height_m: 4.0,
            start_position_m: [1.5, 2.0],
            start_heading_rad: 0.0,
            linear_speed_ms: 0.25,
            angular_speed_rads: 1.0,
            robot_radius_m: 0.2,
            saturation_m: SATURATION_RANGE_M,
            tick_period_s: 0.02,
        }
    }
}

//! # Collaborator ports
//!
//! The exploration controller drives the robot through three ports, each implemented outside the
//! controller:
//!
//! - [`MotionPort`] - the motion layer executing relative waypoints. Its events are posted into
//!   the [`crate::event_queue::EventQueue`] by whoever owns the motion layer.
//! - [`DistanceProbe`] - synchronous reads of the ultrasonic range sensors.
//! - [`DebounceScheduler`] - one-shot delayed callbacks, delivered back to the controller as
//!   [`crate::event_queue::ExploreEvent::DebounceElapsed`] events.
//!
//! All port calls are fire-and-forget, results arrive as events.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

use comms_if::eqpt::{
    motion::{MotionPose, Waypoint},
    range::RangeSensor,
};

use crate::explore::explore_ctrl::DebounceToken;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur while reading a range sensor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    #[error("The {0:?} range sensor is not ready")]
    NotReady(RangeSensor),

    #[error("The {0:?} range sensor returned an invalid reading ({1})")]
    InvalidReading(RangeSensor, f64),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The motion layer of the robot.
pub trait MotionPort {
    /// Queue a waypoint, relative to the last reset reference frame.
    fn enqueue_waypoint(&mut self, waypoint: Waypoint);

    /// Drop all queued waypoints and bring the robot to a halt.
    fn clear_and_stop(&mut self);

    /// The current pose of the robot as known by the motion layer.
    fn current_pose(&self) -> MotionPose;

    /// Reset the local reference frame used by waypoints to the given pose.
    fn reset_reference_frame(&mut self, pose: MotionPose);

    /// Enable or disable the motion layer's obstacle avoidance, which halts the robot and raises
    /// an obstacle event when something comes within the standoff distance ahead.
    fn set_obstacle_avoidance(&mut self, enabled: bool, standoff_m: f64);
}

/// The robot's ultrasonic range sensors.
pub trait DistanceProbe {
    /// Range along the robot's heading.
    ///
    /// Units: meters
    fn sample_forward(&mut self) -> Result<f64, ProbeError>;

    /// Range out of the robot's right hand side.
    ///
    /// Units: meters
    fn sample_side(&mut self) -> Result<f64, ProbeError>;

    /// Read the given sensor.
    fn sample(&mut self, sensor: RangeSensor) -> Result<f64, ProbeError> {
        match sensor {
            RangeSensor::Forward => self.sample_forward(),
            RangeSensor::Side => self.sample_side(),
        }
    }
}

/// Schedules one-shot delayed delivery of debounce tokens.
pub trait DebounceScheduler {
    /// Deliver `token` back to the controller once `delay` has elapsed.
    fn after(&mut self, delay: Duration, token: DebounceToken);
}

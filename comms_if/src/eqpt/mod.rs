//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with the robot's equipment: the motion
//! layer which executes waypoints, and the ultrasonic range sensors.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod motion;
pub mod range;

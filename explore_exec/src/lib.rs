//! # Exploration library.
//!
//! This library allows other crates in the workspace to access items defined inside the
//! exploration crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Event queue - serialises motion and debounce events into a single ordered stream
pub mod event_queue;

/// Exploration module - the wall following controller and its position estimate
pub mod explore;

/// Parameters for the exploration executable
pub mod params;

/// Ports through which the controller drives the robot
pub mod ports;

/// Simulation client - steps the simulated world in the background
pub mod sim_client;

/// Simulated world - a rectangular room with a robot and its motion layer
pub mod sim_world;

/// Telecommand processor - applies telecommands to the controller
pub mod tc_processor;

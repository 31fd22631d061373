//! # Communications interface crate.
//!
//! Provides the interfaces shared between the exploration controller and its external
//! collaborators: the motion layer, the range sensors, and the remote start/stop commands.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Start/stop telecommands
pub mod tc;

/// Command and event definitions for equipment (motion layer, range sensors)
pub mod eqpt;

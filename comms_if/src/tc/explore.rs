//! # Exploration Telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be performed by the exploration controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, StructOpt)]
pub enum ExploreCmd {
    /// Arm the controller and begin a new exploration run, discarding any previous trace.
    #[structopt(name = "start")]
    Start,

    /// Stop the robot. The trace of the run is kept for consumption.
    #[structopt(name = "stop")]
    Stop,
}

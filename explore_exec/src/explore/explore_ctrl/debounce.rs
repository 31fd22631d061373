//! # Debounce tokens
//!
//! Sensor readings are only trusted after a short delay. Each delayed check is represented by a
//! token which is handed to the [`crate::ports::DebounceScheduler`] and comes back to the
//! controller once the delay has elapsed. Tokens carry the epoch of the run which issued them, and
//! the controller bumps its epoch on every start and stop, so a token from a stopped or previous
//! run is recognised and dropped.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pending delayed check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebounceToken {
    pub kind: DebounceKind,
    pub epoch: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebounceKind {
    /// Re-check the forward range after the motion layer reported an obstacle.
    ObstacleCheck,

    /// Read the wall range after turning to face the followed wall.
    WallProbe,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DebounceToken {
    pub fn new(kind: DebounceKind, epoch: u64) -> Self {
        Self { kind, epoch }
    }
}

//! # Exploration states

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::Display;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// States of the exploration controller.
///
/// The controller implements a right hand wall follower:
///
/// - `Start` - Driving forwards in 0.5 m legs until the first obstacle is found.
/// - `Walking` - Following the wall on the right in 0.5 m legs.
/// - `CheckingWall` - Turned right to probe whether the followed wall is still there.
/// - `ObstacleDetected` - Turning left away from an obstacle until the way ahead is clear.
/// - `CornerLeft` - The wall has ended, turning back to the walking heading.
/// - `CornerForward` - Driving past the end of the wall.
/// - `CornerRight` - Turned right around the end of the wall.
/// - `CornerDone` - Driving along the new wall surface, after which the robot turns right and
///   seeks the wall again from `Start`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExploreState {
    Start,
    Walking,
    CheckingWall,
    ObstacleDetected,
    CornerLeft,
    CornerForward,
    CornerRight,
    CornerDone,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ExploreState {
    fn default() -> Self {
        ExploreState::Start
    }
}

impl ExploreState {
    /// Returns true if the state is part of the corner wrapping sequence.
    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            ExploreState::CornerLeft
                | ExploreState::CornerForward
                | ExploreState::CornerRight
                | ExploreState::CornerDone
        )
    }
}

impl Display for ExploreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExploreState::Start => write!(f, "ExploreState::Start"),
            ExploreState::Walking => write!(f, "ExploreState::Walking"),
            ExploreState::CheckingWall => write!(f, "ExploreState::CheckingWall"),
            ExploreState::ObstacleDetected => write!(f, "ExploreState::ObstacleDetected"),
            ExploreState::CornerLeft => write!(f, "ExploreState::CornerLeft"),
            ExploreState::CornerForward => write!(f, "ExploreState::CornerForward"),
            ExploreState::CornerRight => write!(f, "ExploreState::CornerRight"),
            ExploreState::CornerDone => write!(f, "ExploreState::CornerDone"),
        }
    }
}

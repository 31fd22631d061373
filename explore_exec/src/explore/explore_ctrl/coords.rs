//! # Dead reckoning of the position estimate

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{ExploreCtrlParams, ExploreState};
use crate::explore::orientation::Orientation;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Distance covered by the maneuver that just ended in the given state.
///
/// - `Walking`, `CornerForward` - one fixed step.
/// - `ObstacleDetected` - the robot was halted early by an obstacle, so the forward range sensor
///   is used as an odometer: `dist_front_before_m - dist_front_now_m`, never negative.
/// - `CornerDone` - the fixed corner advance.
///
/// Returns `None` for states which do not move the robot along its heading.
///
/// Units: meters
pub fn step_magnitude(
    state: ExploreState,
    params: &ExploreCtrlParams,
    dist_front_before_m: f64,
    dist_front_now_m: f64,
) -> Option<f64> {
    match state {
        ExploreState::Walking | ExploreState::CornerForward => Some(params.step_m),
        ExploreState::ObstacleDetected => Some((dist_front_before_m - dist_front_now_m).max(0.0)),
        ExploreState::CornerDone => Some(params.corner_advance_m),
        ExploreState::Start
        | ExploreState::CheckingWall
        | ExploreState::CornerLeft
        | ExploreState::CornerRight => None,
    }
}

/// Change in the `(x, y)` estimate for a step of `magnitude_m` along `orientation`.
pub fn coord_delta(orientation: Orientation, magnitude_m: f64) -> (f64, f64) {
    let (ux, uy) = orientation.unit_vector();
    (ux * magnitude_m, uy * magnitude_m)
}

//! # Defines Telemetry Pack for Exploration

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::ExploreState;
use crate::explore::orientation::Orientation;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExploreTm {
    pub running: bool,
    pub state: ExploreState,
    pub orientation: Orientation,
    pub x_m: f64,
    pub y_m: f64,
    pub num_samples: usize,
    pub num_missed_waypoints: u64,
}

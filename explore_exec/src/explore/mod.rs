//! # Exploration Module
//!
//! This module provides autonomous exploration of an unknown rectangular environment by following
//! its walls, recording an estimate of the path taken as it goes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use explore_ctrl::ExploreCtrl;

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Exploration controller - the wall following state machine
pub mod explore_ctrl;

/// Logical orientation tracking
pub mod orientation;

/// Append-only trace of estimated positions
pub mod position_log;

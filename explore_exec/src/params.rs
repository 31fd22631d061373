//! # Exploration Executable Parameters
//!
//! This module provides parameters for the exploration executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploreExecParams {
    /// How long to explore for before stopping.
    ///
    /// Units: seconds
    pub run_duration_s: f64,

    /// Maximum time to wait for an event in one cycle of the main loop.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Period at which telemetry is logged and saved.
    ///
    /// Units: seconds
    pub tm_period_s: f64,

    /// Session relative path the position log is saved to as JSON.
    pub position_log_path: String,

    /// Session relative path the final telemetry is saved to as JSON.
    pub tm_path: String,

    /// Archive relative path the position log is written to as CSV.
    pub position_arch_path: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ExploreExecParamsError {
    #[error("The run duration must be positive and finite, found {0} s")]
    InvalidRunDuration(f64),

    #[error("The cycle period must be positive and finite, found {0} s")]
    InvalidCyclePeriod(f64),

    #[error("The telemetry period must not be negative or NaN, found {0} s")]
    InvalidTmPeriod(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ExploreExecParams {
    /// Check that every period can be turned into a `Duration`.
    ///
    /// An infinite telemetry period is allowed and means telemetry is never logged during the
    /// run.
    pub fn validate(&self) -> Result<(), ExploreExecParamsError> {
        let is_period = |p: f64| p.is_finite() && p > 0.0;

        if !is_period(self.run_duration_s) {
            return Err(ExploreExecParamsError::InvalidRunDuration(self.run_duration_s));
        }
        if !is_period(self.cycle_period_s) {
            return Err(ExploreExecParamsError::InvalidCyclePeriod(self.cycle_period_s));
        }
        if !(self.tm_period_s >= 0.0) {
            return Err(ExploreExecParamsError::InvalidTmPeriod(self.tm_period_s));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{explore::explore_ctrl::ExploreCtrlParams, sim_world::SimWorldParams};
    use std::path::PathBuf;

    fn params_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("params")
    }

    #[test]
    fn test_shipped_params_load() {
        let exec: ExploreExecParams =
            util::params::load_from_path(params_dir().join("explore_exec.toml")).unwrap();
        assert!(exec.run_duration_s > 0.0);
        assert!(exec.validate().is_ok());

        let ctrl: ExploreCtrlParams =
            util::params::load_from_path(params_dir().join("explore_ctrl.toml")).unwrap();
        assert_eq!(ctrl.step_m, ExploreCtrlParams::default().step_m);
        assert_eq!(ctrl.debounce_ms, 300);

        let sim: SimWorldParams =
            util::params::load_from_path(params_dir().join("sim_world.toml")).unwrap();
        assert_eq!(sim.room_width_m, 6.0);
    }

    #[test]
    fn test_validate_rejects_unusable_periods() {
        let valid: ExploreExecParams =
            util::params::load_from_path(params_dir().join("explore_exec.toml")).unwrap();

        for d in [f64::INFINITY, f64::NAN, 0.0, -1.0].iter() {
            let mut p = valid.clone();
            p.run_duration_s = *d;
            assert!(matches!(
                p.validate(),
                Err(ExploreExecParamsError::InvalidRunDuration(_))
            ));

            let mut p = valid.clone();
            p.cycle_period_s = *d;
            assert!(matches!(
                p.validate(),
                Err(ExploreExecParamsError::InvalidCyclePeriod(_))
            ));
        }

        let mut p = valid.clone();
        p.tm_period_s = f64::NAN;
        assert!(matches!(
            p.validate(),
            Err(ExploreExecParamsError::InvalidTmPeriod(_))
        ));

        p.tm_period_s = f64::INFINITY;
        assert!(p.validate().is_ok());
    }
}

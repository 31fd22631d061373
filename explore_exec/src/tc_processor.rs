//! # Telecommand processor module
//!
//! The telecommand processor applies TCs from the remote display to the exploration controller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use crate::{
    explore::ExploreCtrl,
    ports::{DebounceScheduler, DistanceProbe, MotionPort},
};
use comms_if::tc::{explore::ExploreCmd, Tc};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
pub fn exec<M, P, S>(ctrl: &mut ExploreCtrl<M, P, S>, tc: &Tc)
where
    M: MotionPort,
    P: DistanceProbe,
    S: DebounceScheduler,
{
    match tc {
        Tc::Heartbeat => debug!("Recieved Heartbeat"),
        Tc::Explore(ExploreCmd::Start) => {
            info!("Recieved Explore Start command");
            ctrl.start();
        }
        Tc::Explore(ExploreCmd::Stop) => {
            info!("Recieved Explore Stop command");
            ctrl.stop();
        }
    }
}

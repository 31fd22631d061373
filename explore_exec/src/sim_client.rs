//! # Simulation Client
//!
//! The SimClient steps a [`SimWorld`] in real time on a background thread, forwarding every event
//! the world raises into the exploration event queue. This stands in for the robot's motion layer
//! and sensors during testing and development.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error, warn};

use crate::{event_queue::EventSender, sim_world::SimHandle};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimClient {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimClientError {
    #[error("The tick period must be positive, got {0} s")]
    InvalidPeriod(f64),

    #[error("The SimClient background thread panicked")]
    BgThreadPanicked,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimClient {
    /// Start stepping the world every `period_s` seconds.
    pub fn start(
        world: SimHandle,
        sender: EventSender,
        period_s: f64,
    ) -> Result<Self, SimClientError> {
        if !(period_s > 0.0) {
            return Err(SimClientError::InvalidPeriod(period_s));
        }

        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_run_clone = bg_run.clone();

        let bg_jh = Some(thread::spawn(move || {
            bg_thread(world, sender, Duration::from_secs_f64(period_s), bg_run_clone)
        }));

        Ok(Self { bg_jh, bg_run })
    }

    /// Stop the background thread and wait for it to finish.
    pub fn stop(&mut self) -> Result<(), SimClientError> {
        self.bg_run.store(false, Ordering::Relaxed);

        match self.bg_jh.take() {
            Some(jh) => jh.join().map_err(|_| SimClientError::BgThreadPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for SimClient {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("{}", e);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, steps the world and forwards its events while instructed to run.
fn bg_thread(world: SimHandle, sender: EventSender, period: Duration, run: Arc<AtomicBool>) {
    let dt_s = period.as_secs_f64();

    while run.load(Ordering::Relaxed) {
        let cycle_start = Instant::now();

        // Release the world before posting, the controller locks it when handling events
        let events = {
            let mut w = world.lock();
            w.tick(dt_s);
            w.drain_events()
        };

        for event in events {
            if !sender.post(event) {
                warn!("Event queue closed, stopping the SimClient");
                return;
            }
        }

        match period.checked_sub(cycle_start.elapsed()) {
            Some(d) => thread::sleep(d),
            None => debug!("SimClient cycle overran"),
        }
    }
}

//! # Event queue
//!
//! Events reach the exploration controller from independent asynchronous sources: the motion
//! layer's callbacks and the debounce timers. All of them are posted into a single ordered queue
//! and the owner of the controller drains it from one thread, so every mutation of the
//! controller's context is serialised.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use comms_if::eqpt::motion::MotionEvent;
use log::{trace, warn};

use crate::{explore::explore_ctrl::DebounceToken, ports::DebounceScheduler};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Posts events into an [`EventQueue`]. Can be cloned and moved to other threads.
#[derive(Debug, Clone)]
pub struct EventSender(Sender<ExploreEvent>);

/// Single consumer end of the event queue.
#[derive(Debug)]
pub struct EventQueue {
    receiver: Receiver<ExploreEvent>,
}

/// A [`DebounceScheduler`] backed by timer threads, which post the token back into the event
/// queue once the delay has elapsed.
#[derive(Debug, Clone)]
pub struct TimerScheduler {
    sender: EventSender,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Every event the exploration controller reacts to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ExploreEvent {
    /// An event raised by the motion layer.
    Motion(MotionEvent),

    /// A previously scheduled debounce delay has elapsed.
    DebounceElapsed(DebounceToken),
}

#[derive(Debug, thiserror::Error)]
pub enum EventQueueError {
    #[error("All event senders have been dropped")]
    Disconnected,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl EventQueue {
    /// Create a new queue, returning the sender and the queue itself.
    pub fn new() -> (EventSender, Self) {
        let (tx, rx) = channel();
        (EventSender(tx), Self { receiver: rx })
    }

    /// Get the next event, waiting for up to `timeout` for one to arrive.
    ///
    /// Returns `Ok(None)` if no event arrived in time.
    pub fn next_timeout(&self, timeout: Duration) -> Result<Option<ExploreEvent>, EventQueueError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(e) => Ok(Some(e)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(EventQueueError::Disconnected),
        }
    }

    /// Get the next event if one is already waiting.
    pub fn try_next(&self) -> Option<ExploreEvent> {
        self.receiver.try_recv().ok()
    }
}

impl EventSender {
    /// Post an event into the queue.
    ///
    /// Returns false if the queue has been dropped, in which case the event is lost.
    pub fn post(&self, event: ExploreEvent) -> bool {
        trace!("Posting {:?}", event);
        self.0.send(event).is_ok()
    }
}

impl TimerScheduler {
    pub fn new(sender: EventSender) -> Self {
        Self { sender }
    }
}

impl DebounceScheduler for TimerScheduler {
    fn after(&mut self, delay: Duration, token: DebounceToken) {
        let sender = self.sender.clone();

        thread::spawn(move || {
            thread::sleep(delay);
            if !sender.post(ExploreEvent::DebounceElapsed(token)) {
                warn!("Event queue closed before {:?} could be delivered", token);
            }
        });
    }
}

//! # ExploreCtrl module
//!
//! This module implements the [`ExploreCtrl`] state machine, a right hand rule wall follower which
//! explores an unknown rectangular environment while recording a dead reckoned trace of the path
//! it has taken.
//!
//! The controller is purely reactive. Once [`ExploreCtrl::start`] has been called every
//! [`ExploreEvent`] taken from the event queue is handed to [`ExploreCtrl::handle_event`], which
//! inspects the current [`ExploreState`], updates the position estimate and issues at most one
//! follow up waypoint to the [`MotionPort`].
//!
//! Obstacle reports and wall probes are not trusted immediately. A [`DebounceToken`] is handed to
//! the [`DebounceScheduler`] and the sensor is re-read only once the token comes back. Tokens
//! carry the epoch of the run which issued them, so any token arriving after a `stop` (or from a
//! previous run) is dropped.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod coords;
mod debounce;
mod params;
mod state;
pub mod tm;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use self::{
    debounce::{DebounceKind, DebounceToken},
    params::ExploreCtrlParams,
    state::ExploreState,
    tm::ExploreTm,
};

use comms_if::eqpt::{
    motion::{MissReason, MotionEvent, Waypoint},
    range::RangeSensor,
};
use log::{debug, info, warn};

use super::{
    orientation::{Orientation, TurnDir},
    position_log::{Position, PositionLog},
};
use crate::{
    event_queue::ExploreEvent,
    ports::{DebounceScheduler, DistanceProbe, MotionPort},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Exploration controller
pub struct ExploreCtrl<M, P, S> {
    params: ExploreCtrlParams,

    motion: M,
    probe: P,
    scheduler: S,

    ctx: ExploreCtx,

    /// True between a `start` and the following `stop`.
    running: bool,

    /// Run generation, incremented on every `start` and `stop`.
    epoch: u64,

    /// The most recently issued waypoint, re-driven by [`ExploreCtrl::retry_last`].
    last_waypoint: Option<Waypoint>,

    /// Number of times `last_waypoint` has been retried.
    num_retries: u32,

    num_missed: u64,
}

/// Mutable exploration state of a single run.
///
/// Created fresh by every `start`, left intact by `stop` so the log can be consumed afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExploreCtx {
    pub state: ExploreState,
    pub orientation: Orientation,

    /// Last sampled forward range.
    ///
    /// Units: meters
    pub dist_front_m: f64,

    /// Last sampled range to the followed wall.
    ///
    /// Units: meters
    pub dist_wall_m: f64,

    /// Position estimate in the start frame.
    ///
    /// Units: meters
    pub x_m: f64,
    pub y_m: f64,

    /// Set while a wall probe has been answered by a forward leg towards the wall, so that the
    /// obstacle raised by that leg does not also move the position estimate.
    pub checking_wall: bool,

    pub log: PositionLog,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the exploration controller.
#[derive(Debug, thiserror::Error)]
pub enum ExploreError {
    #[error("Failed to load ExploreCtrlParams: {0:?}")]
    ParamLoadError(util::params::LoadError),

    #[error("The exploration controller is not running")]
    NotRunning,

    #[error("Waypoint {waypoint:?} was missed ({reason:?})")]
    WaypointMissed {
        waypoint: Waypoint,
        reason: MissReason,
    },

    #[error("No waypoint has been issued which could be retried")]
    NothingToRetry,

    #[error("The last waypoint has already been retried {0} times, giving up")]
    RetryLimitExceeded(u32),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<M, P, S> ExploreCtrl<M, P, S>
where
    M: MotionPort,
    P: DistanceProbe,
    S: DebounceScheduler,
{
    pub fn new(params: ExploreCtrlParams, motion: M, probe: P, scheduler: S) -> Self {
        Self {
            params,
            motion,
            probe,
            scheduler,
            ctx: ExploreCtx::default(),
            running: false,
            epoch: 0,
            last_waypoint: None,
            num_retries: 0,
            num_missed: 0,
        }
    }

    /// Load the parameters from `params_path` (relative to the software root's params directory)
    /// and create a new controller.
    pub fn init(params_path: &str, motion: M, probe: P, scheduler: S) -> Result<Self, ExploreError> {
        let params: ExploreCtrlParams = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(ExploreError::ParamLoadError(e)),
        };

        Ok(Self::new(params, motion, probe, scheduler))
    }

    /// Arm the controller and begin a new exploration run.
    ///
    /// Any previous run's context and log are discarded.
    pub fn start(&mut self) {
        self.epoch += 1;
        self.running = true;
        self.ctx = ExploreCtx::default();
        self.last_waypoint = None;
        self.num_retries = 0;
        self.num_missed = 0;

        self.halt_and_reset();
        self.motion
            .set_obstacle_avoidance(true, self.params.obstacle_standoff_m);

        // The first arrival event is what drives the machine, null waypoints raise it without
        // moving the robot.
        for _ in 0..self.params.initial_null_waypoints {
            self.issue(Waypoint::null());
        }

        info!("Exploration started (epoch {})", self.epoch);
    }

    /// Halt the robot and stop reacting to events.
    ///
    /// The state, orientation, position estimate and log are left untouched. Any debounce still in
    /// flight is invalidated.
    pub fn stop(&mut self) {
        self.epoch += 1;
        self.running = false;
        self.motion.clear_and_stop();

        info!(
            "Exploration stopped in {} with {} samples",
            self.ctx.state,
            self.ctx.log.len()
        );
    }

    /// Process a single event from the event queue.
    ///
    /// Only a missed waypoint produces an error, which the caller may recover from with
    /// [`ExploreCtrl::retry_last`].
    pub fn handle_event(&mut self, event: ExploreEvent) -> Result<(), ExploreError> {
        if !self.running {
            debug!("Ignoring {:?}, exploration is not running", event);
            return Ok(());
        }

        match event {
            ExploreEvent::Motion(MotionEvent::WaypointArrived { .. }) => {
                self.on_waypoint_arrived();
                Ok(())
            }
            ExploreEvent::Motion(MotionEvent::WaypointMissed {
                waypoint, reason, ..
            }) => self.on_waypoint_missed(waypoint, reason),
            ExploreEvent::Motion(MotionEvent::ObstacleAppeared) => {
                self.on_obstacle_appeared();
                Ok(())
            }
            ExploreEvent::Motion(MotionEvent::ObstacleCleared) => {
                self.on_obstacle_cleared();
                Ok(())
            }
            ExploreEvent::DebounceElapsed(token) => {
                self.on_debounce_elapsed(token);
                Ok(())
            }
        }
    }

    /// Re-issue the last waypoint after it was missed.
    pub fn retry_last(&mut self) -> Result<(), ExploreError> {
        if !self.running {
            return Err(ExploreError::NotRunning);
        }

        let waypoint = match self.last_waypoint {
            Some(w) => w,
            None => return Err(ExploreError::NothingToRetry),
        };

        if self.num_retries >= self.params.max_waypoint_retries {
            return Err(ExploreError::RetryLimitExceeded(self.num_retries));
        }

        self.num_retries += 1;
        info!(
            "Retrying {:?} (attempt {} of {})",
            waypoint, self.num_retries, self.params.max_waypoint_retries
        );
        self.motion.enqueue_waypoint(waypoint);

        Ok(())
    }

    pub fn state(&self) -> ExploreState {
        self.ctx.state
    }

    pub fn orientation(&self) -> Orientation {
        self.ctx.orientation
    }

    /// The current `(x, y)` estimate in meters.
    pub fn position(&self) -> (f64, f64) {
        (self.ctx.x_m, self.ctx.y_m)
    }

    pub fn ctx(&self) -> &ExploreCtx {
        &self.ctx
    }

    pub fn log(&self) -> &PositionLog {
        &self.ctx.log
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn params(&self) -> &ExploreCtrlParams {
        &self.params
    }

    pub fn tm(&self) -> ExploreTm {
        ExploreTm {
            running: self.running,
            state: self.ctx.state,
            orientation: self.ctx.orientation,
            x_m: self.ctx.x_m,
            y_m: self.ctx.y_m,
            num_samples: self.ctx.log.len(),
            num_missed_waypoints: self.num_missed,
        }
    }

    // ---- EVENT HANDLERS ----

    fn on_waypoint_arrived(&mut self) {
        self.num_retries = 0;
        self.halt_and_reset();

        match self.ctx.state {
            ExploreState::Start => {
                self.issue(Waypoint::forward(self.params.step_m));
            }
            ExploreState::Walking => {
                self.ctx.checking_wall = false;
                let now = self.ctx.dist_front_m;
                self.update_coordinates(now);
                self.ctx.dist_front_m = self.sample(RangeSensor::Forward);
                self.set_state(ExploreState::CheckingWall);
                self.turn(TurnDir::Right);
            }
            ExploreState::CheckingWall => {
                self.ctx.checking_wall = true;
                self.schedule(DebounceKind::WallProbe);
            }
            ExploreState::ObstacleDetected => {
                self.ctx.dist_front_m = self.sample(RangeSensor::Forward);

                if self.ctx.dist_front_m <= self.params.obstacle_standoff_m {
                    self.turn(TurnDir::Left);
                } else {
                    let waypoint = if self.ctx.dist_wall_m <= self.params.wall_close_m {
                        Waypoint::forward_lateral(self.params.step_m, self.params.wall_correction_m)
                    } else {
                        Waypoint::forward(self.params.step_m)
                    };
                    self.set_state(ExploreState::Walking);
                    self.issue(waypoint);
                }
            }
            ExploreState::CornerLeft => {
                self.ctx.dist_front_m = self.sample(RangeSensor::Forward);
                self.set_state(ExploreState::CornerForward);
                self.issue(Waypoint::forward(self.params.step_m));
            }
            ExploreState::CornerForward => {
                let now = self.sample(RangeSensor::Forward);
                self.update_coordinates(now);
                self.ctx.dist_front_m = now;
                self.set_state(ExploreState::CornerRight);
                self.turn(TurnDir::Right);
            }
            ExploreState::CornerRight => {
                self.ctx.dist_front_m = self.sample(RangeSensor::Forward);
                self.ctx.dist_wall_m = self.ctx.dist_front_m;
                self.set_state(ExploreState::CornerDone);
                self.issue(Waypoint::forward_lateral(
                    self.params.corner_leg_m,
                    -self.params.corner_correction_m,
                ));
            }
            ExploreState::CornerDone => {
                let now = self.sample(RangeSensor::Forward);
                self.update_coordinates(now);
                self.ctx.dist_front_m = now;
                self.set_state(ExploreState::Start);
                self.turn(TurnDir::Right);
            }
        }
    }

    fn on_waypoint_missed(
        &mut self,
        waypoint: Waypoint,
        reason: MissReason,
    ) -> Result<(), ExploreError> {
        self.num_missed += 1;
        warn!(
            "Waypoint {:?} missed in {} (reason code {})",
            waypoint,
            self.ctx.state,
            reason.code()
        );

        Err(ExploreError::WaypointMissed { waypoint, reason })
    }

    fn on_obstacle_appeared(&mut self) {
        debug!("Obstacle reported in {}, checking", self.ctx.state);
        self.schedule(DebounceKind::ObstacleCheck);
    }

    fn on_obstacle_cleared(&mut self) {
        debug!("Obstacle cleared in {}", self.ctx.state);
    }

    fn on_debounce_elapsed(&mut self, token: DebounceToken) {
        if token.epoch != self.epoch {
            debug!(
                "Dropping stale {:?} (current epoch {})",
                token, self.epoch
            );
            return;
        }

        match token.kind {
            DebounceKind::ObstacleCheck => self.confirm_obstacle(),
            DebounceKind::WallProbe => self.probe_wall(),
        }
    }

    /// Re-read the forward range after an obstacle report and react if it is still there.
    fn confirm_obstacle(&mut self) {
        let now = self.sample(RangeSensor::Forward);

        if now > self.params.obstacle_standoff_m {
            debug!("Obstacle not confirmed ({:.3} m), ignoring", now);
            return;
        }

        match self.ctx.state {
            ExploreState::CheckingWall | ExploreState::CornerLeft => {
                debug!("Obstacle confirmed in {}, no action", self.ctx.state);
                self.ctx.dist_front_m = now;
                return;
            }
            _ => (),
        }

        info!("Obstacle confirmed at {:.3} m in {}", now, self.ctx.state);
        self.halt_and_reset();

        match self.ctx.state {
            ExploreState::Start => {
                self.log_snapshot();
                self.set_state(ExploreState::ObstacleDetected);
                self.turn(TurnDir::Left);
            }
            ExploreState::Walking => {
                self.set_state(ExploreState::ObstacleDetected);
                if self.ctx.checking_wall {
                    // The leg into the wall was the probe's answer, not exploration progress
                    self.ctx.checking_wall = false;
                } else {
                    self.update_coordinates(now);
                }
                self.turn(TurnDir::Left);
            }
            ExploreState::CornerForward => {
                self.set_state(ExploreState::CornerRight);
                self.turn(TurnDir::Right);
            }
            ExploreState::CornerRight => {
                self.set_state(ExploreState::ObstacleDetected);
                self.turn(TurnDir::Left);
            }
            ExploreState::CornerDone => {
                // Credited with the full corner advance, not the partial step
                self.update_coordinates(now);
                self.set_state(ExploreState::ObstacleDetected);
                self.turn(TurnDir::Left);
            }
            ExploreState::ObstacleDetected => {
                self.turn(TurnDir::Left);
            }
            ExploreState::CheckingWall | ExploreState::CornerLeft => (),
        }

        self.ctx.dist_front_m = now;
    }

    /// Read the wall range after turning to face the followed wall.
    fn probe_wall(&mut self) {
        if self.ctx.state != ExploreState::CheckingWall {
            debug!("Wall probe fired in {}, ignoring", self.ctx.state);
            return;
        }

        self.ctx.dist_wall_m = self.sample(self.params.wall_probe_sensor);

        if self.ctx.dist_wall_m >= self.params.saturation_m {
            info!("No wall found, starting corner");
            self.ctx.checking_wall = false;
            self.set_state(ExploreState::CornerLeft);
            self.turn(TurnDir::Left);
        } else {
            debug!("Wall found at {:.3} m", self.ctx.dist_wall_m);
            self.set_state(ExploreState::Walking);
            self.issue(Waypoint::forward(self.params.step_m));
        }
    }

    // ---- HELPERS ----

    fn issue(&mut self, waypoint: Waypoint) {
        debug!("Issuing {:?}", waypoint);
        self.last_waypoint = Some(waypoint);
        self.motion.enqueue_waypoint(waypoint);
    }

    /// Turn on the spot, rotating the logical orientation to match.
    fn turn(&mut self, dir: TurnDir) {
        self.ctx.orientation = self.ctx.orientation.rotate(dir);
        self.issue(match dir {
            TurnDir::Left => Waypoint::turn_left(),
            TurnDir::Right => Waypoint::turn_right(),
        });
    }

    fn set_state(&mut self, new: ExploreState) {
        if new != self.ctx.state {
            info!("ExploreCtrl state change: {} -> {}", self.ctx.state, new);
            self.ctx.state = new;
        }
    }

    /// Drop any queued motion and make the current pose the origin of subsequent waypoints.
    fn halt_and_reset(&mut self) {
        self.motion.clear_and_stop();
        let pose = self.motion.current_pose();
        self.motion.reset_reference_frame(pose);
    }

    fn schedule(&mut self, kind: DebounceKind) {
        self.scheduler
            .after(self.params.debounce(), DebounceToken::new(kind, self.epoch));
    }

    /// Read a range sensor. A failed read is treated as the sensor's saturation value.
    fn sample(&mut self, sensor: RangeSensor) -> f64 {
        match self.probe.sample(sensor) {
            Ok(r) => r,
            Err(e) => {
                warn!("{}, assuming no return", e);
                self.params.saturation_m
            }
        }
    }

    /// Advance the position estimate by the distance covered in the current state and append the
    /// new position to the log.
    fn update_coordinates(&mut self, dist_front_now_m: f64) {
        let mag = match coords::step_magnitude(
            self.ctx.state,
            &self.params,
            self.ctx.dist_front_m,
            dist_front_now_m,
        ) {
            Some(m) => m,
            None => util::raise_error!(
                "Coordinates cannot be updated in {}",
                self.ctx.state
            ),
        };

        let (dx, dy) = coords::coord_delta(self.ctx.orientation, mag);
        self.ctx.x_m += dx;
        self.ctx.y_m += dy;

        self.log_snapshot();
    }

    fn log_snapshot(&mut self) {
        let pos = Position::new(self.ctx.x_m, self.ctx.y_m, self.ctx.orientation);
        debug!("Position sample {}: {:?}", self.ctx.log.len(), pos);
        self.ctx.log.push(pos);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ports::mock::{MockMotion, MockProbe, MockScheduler, MotionCall};
    use std::time::Duration;

    type TestCtrl = ExploreCtrl<MockMotion, MockProbe, MockScheduler>;

    const ALL_STATES: [ExploreState; 8] = [
        ExploreState::Start,
        ExploreState::Walking,
        ExploreState::CheckingWall,
        ExploreState::ObstacleDetected,
        ExploreState::CornerLeft,
        ExploreState::CornerForward,
        ExploreState::CornerRight,
        ExploreState::CornerDone,
    ];

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn started() -> TestCtrl {
        let mut c = ExploreCtrl::new(
            ExploreCtrlParams::default(),
            MockMotion::default(),
            MockProbe::default(),
            MockScheduler::default(),
        );
        c.start();
        c.motion.take();
        c
    }

    fn arrive(c: &mut TestCtrl) {
        c.handle_event(ExploreEvent::Motion(MotionEvent::WaypointArrived {
            waypoint: Waypoint::null(),
            is_last: true,
        }))
        .unwrap();
    }

    fn obstacle(c: &mut TestCtrl) {
        c.handle_event(ExploreEvent::Motion(MotionEvent::ObstacleAppeared))
            .unwrap();
    }

    /// Deliver every pending token of the given kind, in the order they were scheduled.
    fn fire(c: &mut TestCtrl, kind: DebounceKind) {
        let (due, rest) = std::mem::take(&mut c.scheduler.pending)
            .into_iter()
            .partition::<Vec<_>, _>(|(_, t)| t.kind == kind);
        c.scheduler.pending = rest;

        for (_, token) in due {
            c.handle_event(ExploreEvent::DebounceElapsed(token)).unwrap();
        }
    }

    /// Forward range of a robot which follows a wall 0.6 m to its right: blocked when facing the
    /// wall, open otherwise.
    fn corridor_probe(c: &mut TestCtrl) {
        c.probe.forward_m = match c.orientation() {
            Orientation::Right => 0.6,
            _ => 1.5,
        };
    }

    /// One walk-probe-bump cycle along a wall, starting and ending in `Walking`.
    fn walk_cycle(c: &mut TestCtrl) -> Vec<Waypoint> {
        c.motion.take();

        // Step complete, turn to face the wall
        corridor_probe(c);
        arrive(c);
        assert_eq!(c.state(), ExploreState::CheckingWall);

        // Turn complete, probe the wall after the debounce
        arrive(c);
        assert!(c.ctx.checking_wall);
        corridor_probe(c);
        fire(c, DebounceKind::WallProbe);
        assert_eq!(c.state(), ExploreState::Walking);

        // Driving into the wall raises an obstacle
        obstacle(c);
        fire(c, DebounceKind::ObstacleCheck);
        assert_eq!(c.state(), ExploreState::ObstacleDetected);
        assert!(!c.ctx.checking_wall);

        // Turned back, the way ahead is clear
        corridor_probe(c);
        arrive(c);
        assert_eq!(c.state(), ExploreState::Walking);

        c.motion.waypoints()
    }

    #[test]
    fn test_start_commands() {
        let mut c = ExploreCtrl::new(
            ExploreCtrlParams::default(),
            MockMotion::default(),
            MockProbe::default(),
            MockScheduler::default(),
        );
        assert!(!c.is_running());

        c.start();

        assert!(c.is_running());
        assert_eq!(c.state(), ExploreState::Start);
        assert_eq!(c.orientation(), Orientation::Forward);
        assert_eq!(c.position(), (0.0, 0.0));
        assert_eq!(
            c.motion.take(),
            vec![
                MotionCall::ClearAndStop,
                MotionCall::ResetFrame,
                MotionCall::ObstacleAvoidance(true, 1.0),
                MotionCall::Enqueue(Waypoint::null()),
                MotionCall::Enqueue(Waypoint::null()),
            ]
        );
    }

    #[test]
    fn test_arrival_table_is_total() {
        let table = [
            (ExploreState::Start, ExploreState::Start, Some(Waypoint::forward(0.5))),
            (ExploreState::Walking, ExploreState::CheckingWall, Some(Waypoint::turn_right())),
            (ExploreState::CheckingWall, ExploreState::CheckingWall, None),
            (
                ExploreState::ObstacleDetected,
                ExploreState::Walking,
                Some(Waypoint::forward_lateral(0.5, 0.1)),
            ),
            (ExploreState::CornerLeft, ExploreState::CornerForward, Some(Waypoint::forward(0.5))),
            (ExploreState::CornerForward, ExploreState::CornerRight, Some(Waypoint::turn_right())),
            (
                ExploreState::CornerRight,
                ExploreState::CornerDone,
                Some(Waypoint::forward_lateral(1.0, -0.1)),
            ),
            (ExploreState::CornerDone, ExploreState::Start, Some(Waypoint::turn_right())),
        ];

        for state in ALL_STATES.iter() {
            let (_, next, waypoint) = table.iter().find(|(s, _, _)| s == state).unwrap();

            let mut c = started();
            c.ctx.state = *state;
            arrive(&mut c);

            assert_eq!(c.state(), *next, "from {}", state);

            let calls = c.motion.take();
            assert_eq!(&calls[..2], &[MotionCall::ClearAndStop, MotionCall::ResetFrame]);
            match waypoint {
                Some(w) => assert_eq!(&calls[2..], &[MotionCall::Enqueue(*w)], "from {}", state),
                None => assert_eq!(calls.len(), 2, "from {}", state),
            }
        }
    }

    #[test]
    fn test_checking_wall_schedules_probe() {
        let mut c = started();
        c.ctx.state = ExploreState::CheckingWall;

        arrive(&mut c);

        assert!(c.ctx.checking_wall);
        assert_eq!(
            c.scheduler.pending,
            vec![(
                Duration::from_millis(300),
                DebounceToken::new(DebounceKind::WallProbe, c.epoch())
            )]
        );
    }

    #[test]
    fn test_walking_integration() {
        let mut c = started();
        c.ctx.state = ExploreState::Walking;

        walk_cycle(&mut c);
        walk_cycle(&mut c);

        assert!(approx(c.ctx.x_m, 1.0));
        assert_eq!(c.ctx.y_m, 0.0);
        assert_eq!(c.log().len(), 2);
        assert_eq!(c.orientation(), Orientation::Forward);
        assert!(!c.ctx.checking_wall);
    }

    #[test]
    fn test_partial_step() {
        let mut c = started();
        c.ctx.state = ExploreState::Walking;
        c.ctx.dist_front_m = 0.9;
        c.probe.forward_m = 0.3;

        obstacle(&mut c);
        fire(&mut c, DebounceKind::ObstacleCheck);

        assert_eq!(c.state(), ExploreState::ObstacleDetected);
        assert!(approx(c.ctx.x_m, 0.6));
        assert_eq!(c.log().len(), 1);
        assert_eq!(c.log().last().unwrap().orientation, Orientation::Forward);
        assert_eq!(c.ctx.dist_front_m, 0.3);
        assert_eq!(c.orientation(), Orientation::Left);
        assert_eq!(c.motion.waypoints(), vec![Waypoint::turn_left()]);
    }

    #[test]
    fn test_race_probe_then_obstacle() {
        let mut c = started();
        c.ctx.state = ExploreState::Walking;
        c.probe.forward_m = 0.6;

        arrive(&mut c);
        arrive(&mut c);
        let samples = c.log().len();
        let x = c.ctx.x_m;

        // Obstacle in the new heading reported before the probe has been read
        obstacle(&mut c);
        fire(&mut c, DebounceKind::WallProbe);
        assert_eq!(c.state(), ExploreState::Walking);
        assert!(c.ctx.checking_wall);

        fire(&mut c, DebounceKind::ObstacleCheck);

        assert_eq!(c.state(), ExploreState::ObstacleDetected);
        assert!(!c.ctx.checking_wall);
        assert_eq!(c.log().len(), samples);
        assert_eq!(c.ctx.x_m, x);
    }

    /// An obstacle confirmed while still turning to face the wall has no row in the confirm table,
    /// so it leaves the `checking_wall` latch set and commands nothing. The latch is cleared once
    /// the probe's answer drives the robot into the wall and that obstacle is confirmed.
    #[test]
    fn test_race_obstacle_then_probe() {
        let mut c = started();
        c.ctx.state = ExploreState::Walking;
        c.probe.forward_m = 0.6;

        arrive(&mut c);
        arrive(&mut c);
        let samples = c.log().len();
        c.motion.take();

        obstacle(&mut c);
        fire(&mut c, DebounceKind::ObstacleCheck);

        // Still turning towards the wall, nothing to do
        assert_eq!(c.state(), ExploreState::CheckingWall);
        assert!(c.ctx.checking_wall);
        assert!(c.motion.take().is_empty());

        fire(&mut c, DebounceKind::WallProbe);
        assert_eq!(c.state(), ExploreState::Walking);

        obstacle(&mut c);
        fire(&mut c, DebounceKind::ObstacleCheck);

        assert_eq!(c.state(), ExploreState::ObstacleDetected);
        assert!(!c.ctx.checking_wall);
        assert_eq!(c.log().len(), samples);
    }

    #[test]
    fn test_corner_sequence() {
        let mut c = started();
        c.ctx.state = ExploreState::Walking;
        c.probe.forward_m = 1.5;

        arrive(&mut c);
        let samples = c.log().len();
        assert_eq!(samples, 1);
        c.motion.take();

        let expected = [
            (ExploreState::CornerLeft, Waypoint::turn_left()),
            (ExploreState::CornerForward, Waypoint::forward(0.5)),
            (ExploreState::CornerRight, Waypoint::turn_right()),
            (ExploreState::CornerDone, Waypoint::forward_lateral(1.0, -0.1)),
            (ExploreState::Start, Waypoint::turn_right()),
        ];

        // CheckingWall arrival, then the saturated probe
        arrive(&mut c);
        fire(&mut c, DebounceKind::WallProbe);
        assert_eq!(c.state(), expected[0].0);
        assert_eq!(c.motion.waypoints(), vec![expected[0].1]);
        assert!(!c.ctx.checking_wall);

        for (state, waypoint) in expected.iter().skip(1) {
            c.motion.take();
            arrive(&mut c);
            assert_eq!(c.state(), *state);
            assert_eq!(c.motion.waypoints(), vec![*waypoint]);
        }

        assert_eq!(c.log().len(), samples + 2);
        assert!(approx(c.ctx.x_m, 1.0));
        assert!(approx(c.ctx.y_m, -1.25));
        assert_eq!(c.orientation(), Orientation::Backward);
    }

    #[test]
    fn test_obstacle_detected_branches() {
        // Still blocked, keep turning left
        let mut c = started();
        c.ctx.state = ExploreState::ObstacleDetected;
        c.probe.forward_m = 0.7;
        arrive(&mut c);
        assert_eq!(c.state(), ExploreState::ObstacleDetected);
        assert_eq!(c.orientation(), Orientation::Left);
        assert_eq!(c.motion.waypoints(), vec![Waypoint::turn_left()]);

        // Clear and far from the wall, no correction
        let mut c = started();
        c.ctx.state = ExploreState::ObstacleDetected;
        c.ctx.dist_wall_m = 1.2;
        arrive(&mut c);
        assert_eq!(c.state(), ExploreState::Walking);
        assert_eq!(c.motion.waypoints(), vec![Waypoint::forward(0.5)]);
    }

    #[test]
    fn test_confirm_table() {
        let table = [
            (ExploreState::Start, ExploreState::ObstacleDetected, Some(Waypoint::turn_left()), 1),
            (ExploreState::Walking, ExploreState::ObstacleDetected, Some(Waypoint::turn_left()), 1),
            (ExploreState::CheckingWall, ExploreState::CheckingWall, None, 0),
            (
                ExploreState::ObstacleDetected,
                ExploreState::ObstacleDetected,
                Some(Waypoint::turn_left()),
                0,
            ),
            (ExploreState::CornerLeft, ExploreState::CornerLeft, None, 0),
            (ExploreState::CornerForward, ExploreState::CornerRight, Some(Waypoint::turn_right()), 0),
            (ExploreState::CornerRight, ExploreState::ObstacleDetected, Some(Waypoint::turn_left()), 0),
            (ExploreState::CornerDone, ExploreState::ObstacleDetected, Some(Waypoint::turn_left()), 1),
        ];

        for (state, next, waypoint, samples) in table.iter() {
            let mut c = started();
            c.ctx.state = *state;
            c.ctx.dist_front_m = 1.0;
            c.probe.forward_m = 0.5;

            obstacle(&mut c);
            assert!(c.motion.take().is_empty(), "from {}", state);
            fire(&mut c, DebounceKind::ObstacleCheck);

            assert_eq!(c.state(), *next, "from {}", state);
            assert_eq!(c.log().len(), *samples, "from {}", state);
            match waypoint {
                Some(w) => assert_eq!(
                    c.motion.take(),
                    vec![
                        MotionCall::ClearAndStop,
                        MotionCall::ResetFrame,
                        MotionCall::Enqueue(*w)
                    ],
                    "from {}",
                    state
                ),
                None => assert!(c.motion.take().is_empty(), "from {}", state),
            }
        }
    }

    #[test]
    fn test_corner_done_confirm_credits_corner_advance() {
        let mut c = started();
        c.ctx.state = ExploreState::CornerDone;
        c.ctx.dist_front_m = 1.4;
        c.probe.forward_m = 0.9;

        obstacle(&mut c);
        fire(&mut c, DebounceKind::ObstacleCheck);

        assert_eq!(c.state(), ExploreState::ObstacleDetected);
        assert_eq!(c.log().len(), 1);
        assert!(approx(c.ctx.x_m, 1.25));
        assert!(approx(c.ctx.y_m, 0.0));
        assert_eq!(c.log().last().map(|p| p.orientation), Some(Orientation::Forward));
        assert_eq!(c.ctx.dist_front_m, 0.9);

        // Walking confirms still use the partial step
        let mut c = started();
        c.ctx.state = ExploreState::Walking;
        c.ctx.dist_front_m = 1.4;
        c.probe.forward_m = 0.9;

        obstacle(&mut c);
        fire(&mut c, DebounceKind::ObstacleCheck);

        assert!(approx(c.ctx.x_m, 0.5));
    }

    #[test]
    fn test_side_wall_probe() {
        let params = ExploreCtrlParams {
            wall_probe_sensor: RangeSensor::Side,
            ..ExploreCtrlParams::default()
        };
        let mut c = ExploreCtrl::new(
            params,
            MockMotion::default(),
            MockProbe::default(),
            MockScheduler::default(),
        );
        c.start();
        c.ctx.state = ExploreState::Walking;

        // Open ahead but a wall on the side, the side reading decides
        c.probe.forward_m = 1.5;
        c.probe.side_m = 0.6;
        arrive(&mut c);
        arrive(&mut c);
        c.motion.take();
        fire(&mut c, DebounceKind::WallProbe);

        assert_eq!(c.state(), ExploreState::Walking);
        assert_eq!(c.ctx.dist_wall_m, 0.6);
        assert!(c.ctx.checking_wall);

        // Blocked ahead but nothing on the side starts a corner
        c.ctx.state = ExploreState::Walking;
        c.probe.forward_m = 0.6;
        c.probe.side_m = 1.5;
        arrive(&mut c);
        arrive(&mut c);
        c.motion.take();
        fire(&mut c, DebounceKind::WallProbe);

        assert_eq!(c.state(), ExploreState::CornerLeft);
        assert_eq!(c.ctx.dist_wall_m, 1.5);
        assert!(!c.ctx.checking_wall);
        assert_eq!(c.motion.waypoints(), vec![Waypoint::turn_left()]);
    }

    #[test]
    fn test_start_obstacle_logs_origin() {
        let mut c = started();
        c.probe.forward_m = 0.8;

        obstacle(&mut c);
        fire(&mut c, DebounceKind::ObstacleCheck);

        assert_eq!(
            c.log().as_slice(),
            &[Position::new(0.0, 0.0, Orientation::Forward)]
        );
        assert_eq!(c.orientation(), Orientation::Left);
    }

    #[test]
    fn test_unconfirmed_obstacle() {
        let mut c = started();
        c.ctx.state = ExploreState::Walking;
        c.probe.forward_m = 1.2;

        obstacle(&mut c);
        fire(&mut c, DebounceKind::ObstacleCheck);

        assert_eq!(c.state(), ExploreState::Walking);
        assert!(c.motion.take().is_empty());
        assert!(c.log().is_empty());
    }

    #[test]
    fn test_stop_drops_events() {
        let mut c = started();
        c.ctx.state = ExploreState::CheckingWall;
        arrive(&mut c);
        obstacle(&mut c);
        c.motion.take();

        c.stop();
        assert!(!c.is_running());
        assert_eq!(c.motion.take(), vec![MotionCall::ClearAndStop]);

        fire(&mut c, DebounceKind::WallProbe);
        fire(&mut c, DebounceKind::ObstacleCheck);
        arrive(&mut c);

        assert_eq!(c.state(), ExploreState::CheckingWall);
        assert!(c.motion.take().is_empty());
        assert!(c.scheduler.pending.is_empty());
    }

    #[test]
    fn test_stale_token_after_restart() {
        let mut c = started();
        c.ctx.state = ExploreState::CheckingWall;
        arrive(&mut c);
        let stale = c.scheduler.pending.clone();

        c.stop();
        c.start();
        c.ctx.state = ExploreState::CheckingWall;
        c.motion.take();

        for (_, token) in stale {
            c.handle_event(ExploreEvent::DebounceElapsed(token)).unwrap();
        }

        assert_eq!(c.state(), ExploreState::CheckingWall);
        assert!(c.motion.take().is_empty());
    }

    #[test]
    fn test_restart_discards_log() {
        let mut c = started();
        c.ctx.state = ExploreState::Walking;
        arrive(&mut c);
        assert_eq!(c.log().len(), 1);

        c.stop();

        // Stop leaves the run intact
        assert_eq!(c.log().len(), 1);
        assert_eq!(c.state(), ExploreState::CheckingWall);
        assert_eq!(c.orientation(), Orientation::Right);

        c.start();

        assert!(c.log().is_empty());
        assert_eq!(c.state(), ExploreState::Start);
        assert_eq!(c.orientation(), Orientation::Forward);
        assert_eq!(c.position(), (0.0, 0.0));
    }

    #[test]
    fn test_failed_probe_reads_as_saturated() {
        // Failed obstacle re-check does not confirm the obstacle
        let mut c = started();
        c.probe.fail = true;
        obstacle(&mut c);
        fire(&mut c, DebounceKind::ObstacleCheck);
        assert_eq!(c.state(), ExploreState::Start);
        assert!(c.motion.take().is_empty());

        // Failed wall probe finds no wall
        let mut c = started();
        c.probe.fail = true;
        c.ctx.state = ExploreState::CheckingWall;
        arrive(&mut c);
        fire(&mut c, DebounceKind::WallProbe);
        assert_eq!(c.state(), ExploreState::CornerLeft);
        assert_eq!(c.ctx.dist_wall_m, 1.5);
    }

    #[test]
    fn test_missed_waypoint_retry() {
        let mut c = started();
        arrive(&mut c);
        c.motion.take();

        let res = c.handle_event(ExploreEvent::Motion(MotionEvent::WaypointMissed {
            waypoint: Waypoint::forward(0.5),
            is_last: true,
            reason: MissReason::Timeout,
        }));
        assert!(matches!(
            res,
            Err(ExploreError::WaypointMissed {
                reason: MissReason::Timeout,
                ..
            })
        ));
        assert_eq!(c.tm().num_missed_waypoints, 1);

        for _ in 0..3 {
            c.retry_last().unwrap();
        }
        assert_eq!(c.motion.waypoints(), vec![Waypoint::forward(0.5); 3]);
        assert!(matches!(
            c.retry_last(),
            Err(ExploreError::RetryLimitExceeded(3))
        ));

        // A successful arrival resets the limit
        arrive(&mut c);
        assert!(c.retry_last().is_ok());

        c.stop();
        assert!(matches!(c.retry_last(), Err(ExploreError::NotRunning)));
    }

    #[test]
    fn test_nothing_to_retry() {
        let params = ExploreCtrlParams {
            initial_null_waypoints: 0,
            ..Default::default()
        };
        let mut c = ExploreCtrl::new(
            params,
            MockMotion::default(),
            MockProbe::default(),
            MockScheduler::default(),
        );

        c.start();

        assert!(matches!(c.retry_last(), Err(ExploreError::NothingToRetry)));
    }

    #[test]
    fn test_corridor() {
        let mut c = started();
        c.ctx.state = ExploreState::Walking;

        for _ in 0..3 {
            let waypoints = walk_cycle(&mut c);

            assert!(!c.state().is_corner());
            assert_eq!(
                waypoints.last(),
                Some(&Waypoint::forward_lateral(0.5, 0.1))
            );
            assert_eq!(c.ctx.dist_wall_m, 0.6);
        }

        assert!(approx(c.ctx.x_m, 1.5));
        assert_eq!(c.log().len(), 3);
        assert!(c
            .log()
            .iter()
            .all(|p| p.orientation == Orientation::Forward && p.y_m == 0.0));
    }

    #[test]
    fn test_tm() {
        let mut c = started();
        c.ctx.state = ExploreState::Walking;
        arrive(&mut c);

        let tm = c.tm();
        assert!(tm.running);
        assert_eq!(tm.state, ExploreState::CheckingWall);
        assert_eq!(tm.orientation, Orientation::Right);
        assert_eq!(tm.num_samples, 1);
        assert!(approx(tm.x_m, 0.5));
    }
}

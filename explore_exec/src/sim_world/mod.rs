//! # Simulated world
//!
//! A rectangular, initially unknown room containing a single robot. The world plays the part of
//! every collaborator of the exploration controller:
//!
//! - The robot's motion layer, executing relative waypoints one at a time and halting in front of
//!   obstacles when obstacle avoidance is enabled.
//! - The forward and side ultrasonic range sensors, modelled as ray casts against the room walls
//!   which saturate at the sensor's maximum range.
//! - A virtual clock for debounce timers, so whole runs can be stepped deterministically.
//!
//! Events raised while stepping are buffered and collected with [`SimWorld::drain_events`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;
use std::f64::consts::FRAC_PI_2;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use comms_if::eqpt::{
    motion::{MissReason, MotionEvent, MotionPose, Waypoint},
    range::RangeSensor,
};
use log::{debug, trace, warn};
use util::maths::wrap_pi;

pub use self::params::SimWorldParams;
use crate::{
    event_queue::ExploreEvent,
    explore::explore_ctrl::DebounceToken,
    ports::{DebounceScheduler, DistanceProbe, MotionPort, ProbeError},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimWorld {
    params: SimWorldParams,

    /// True pose of the robot in the world frame.
    pose: MotionPose,

    /// Origin of the frame waypoints are given relative to.
    frame: MotionPose,

    queue: VecDeque<Waypoint>,
    active: Option<ActiveWaypoint>,

    /// Obstacle avoidance standoff, `None` when avoidance is disabled.
    ///
    /// Units: meters
    avoidance_standoff_m: Option<f64>,

    /// An obstacle has been reported and not yet cleared.
    obstacle_reported: bool,

    /// Units: seconds
    time_s: f64,

    /// Pending debounce timers and the simulation time they fall due.
    timers: Vec<(f64, DebounceToken)>,

    events: Vec<ExploreEvent>,
}

/// Shared handle to a [`SimWorld`], implementing the controller's ports.
#[derive(Clone)]
pub struct SimHandle(Arc<Mutex<SimWorld>>);

/// A [`DebounceScheduler`] running on the simulation's clock.
#[derive(Clone)]
pub struct VirtualScheduler {
    world: SimHandle,
}

struct ActiveWaypoint {
    waypoint: Waypoint,
    target: MotionPose,

    /// Held by obstacle avoidance, the obstacle has already been reported.
    blocked: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

enum Progress {
    Moving,
    Arrived,
    Collided,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimWorld {
    pub fn new(params: SimWorldParams) -> Self {
        let pose = MotionPose {
            x_m: params.start_position_m[0],
            y_m: params.start_position_m[1],
            heading_rad: wrap_pi(params.start_heading_rad),
        };

        Self {
            params,
            pose,
            frame: pose,
            queue: VecDeque::new(),
            active: None,
            avoidance_standoff_m: None,
            obstacle_reported: false,
            time_s: 0.0,
            timers: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Load the parameters from `params_path` and create a new world.
    pub fn init(params_path: &str) -> Result<Self, util::params::LoadError> {
        Ok(Self::new(util::params::load(params_path)?))
    }

    pub fn params(&self) -> &SimWorldParams {
        &self.params
    }

    pub fn pose(&self) -> MotionPose {
        self.pose
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Returns true if the robot has no waypoint to execute.
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    /// Advance the world by `dt_s` seconds.
    pub fn tick(&mut self, dt_s: f64) {
        self.time_s += dt_s;
        self.fire_timers();

        if self.obstacle_reported {
            let standoff = self.avoidance_standoff_m.unwrap_or(0.0);
            if self.range(RangeSensor::Forward) > standoff {
                self.obstacle_reported = false;
                self.post(MotionEvent::ObstacleCleared);
            }
        }

        if self.active.is_none() {
            if let Some(waypoint) = self.queue.pop_front() {
                self.active = Some(self.activate(waypoint));
            }
        }

        let mut active = match self.active.take() {
            Some(a) => a,
            None => return,
        };

        match self.step_active(&mut active, dt_s) {
            Progress::Moving => self.active = Some(active),
            Progress::Arrived => {
                debug!("Sim: arrived at {:?}", active.waypoint);
                let is_last = self.queue.is_empty();
                self.post(MotionEvent::WaypointArrived {
                    waypoint: active.waypoint,
                    is_last,
                });
            }
            Progress::Collided => {
                warn!("Sim: collision while executing {:?}", active.waypoint);
                self.queue.clear();
                self.post(MotionEvent::WaypointMissed {
                    waypoint: active.waypoint,
                    is_last: true,
                    reason: MissReason::Blocked,
                });
            }
        }
    }

    /// Take all events raised since the last call.
    pub fn drain_events(&mut self) -> Vec<ExploreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Range measured by the given sensor.
    ///
    /// Units: meters
    pub fn range(&self, sensor: RangeSensor) -> f64 {
        let bearing = match sensor {
            RangeSensor::Forward => self.pose.heading_rad,
            RangeSensor::Side => self.pose.heading_rad - FRAC_PI_2,
        };
        let (c, s) = (bearing.cos(), bearing.sin());

        let mut t = f64::INFINITY;
        if c > 0.0 {
            t = t.min((self.params.room_width_m - self.pose.x_m) / c);
        } else if c < 0.0 {
            t = t.min(-self.pose.x_m / c);
        }
        if s > 0.0 {
            t = t.min((self.params.room_height_m - self.pose.y_m) / s);
        } else if s < 0.0 {
            t = t.min(-self.pose.y_m / s);
        }

        t.max(0.0).min(self.params.saturation_m)
    }

    // ---- MOTION LAYER ----

    pub fn enqueue(&mut self, waypoint: Waypoint) {
        self.queue.push_back(waypoint);
    }

    pub fn clear_and_stop(&mut self) {
        self.queue.clear();
        self.active = None;
    }

    pub fn reset_frame(&mut self, pose: MotionPose) {
        self.frame = pose;
    }

    pub fn set_obstacle_avoidance(&mut self, enabled: bool, standoff_m: f64) {
        self.avoidance_standoff_m = match enabled {
            true => Some(standoff_m),
            false => None,
        };
    }

    /// Deliver `token` once `delay` of simulation time has elapsed.
    pub fn schedule(&mut self, delay: Duration, token: DebounceToken) {
        self.timers
            .push((self.time_s + delay.as_secs_f64(), token));
    }

    // ---- PRIVATE ----

    fn post(&mut self, event: MotionEvent) {
        self.events.push(ExploreEvent::Motion(event));
    }

    fn fire_timers(&mut self) {
        let now = self.time_s;
        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|(t, _)| *t <= now);
        self.timers = pending;

        self.events.extend(
            due.into_iter()
                .map(|(_, token)| ExploreEvent::DebounceElapsed(token)),
        );
    }

    /// Resolve a waypoint against the current reference frame.
    fn activate(&self, waypoint: Waypoint) -> ActiveWaypoint {
        let (c, s) = (self.frame.heading_rad.cos(), self.frame.heading_rad.sin());

        ActiveWaypoint {
            waypoint,
            target: MotionPose {
                x_m: self.frame.x_m + waypoint.dx_m * c - waypoint.dy_m * s,
                y_m: self.frame.y_m + waypoint.dx_m * s + waypoint.dy_m * c,
                heading_rad: wrap_pi(self.frame.heading_rad + waypoint.dtheta_rad),
            },
            blocked: false,
        }
    }

    /// Translate towards the target first, then turn on the spot to the target heading.
    fn step_active(&mut self, active: &mut ActiveWaypoint, dt_s: f64) -> Progress {
        let ex = active.target.x_m - self.pose.x_m;
        let ey = active.target.y_m - self.pose.y_m;
        let dist = ex.hypot(ey);

        if dist > 0.0 {
            let forward = ex * self.pose.heading_rad.cos() + ey * self.pose.heading_rad.sin();

            if let Some(standoff) = self.avoidance_standoff_m {
                if forward > 0.0 && self.range(RangeSensor::Forward) <= standoff {
                    if !active.blocked {
                        debug!("Sim: obstacle ahead, holding {:?}", active.waypoint);
                        active.blocked = true;
                        self.obstacle_reported = true;
                        self.post(MotionEvent::ObstacleAppeared);
                    }
                    return Progress::Moving;
                }
            }

            let step = self.params.linear_speed_ms * dt_s;
            let (nx, ny) = if step >= dist {
                (active.target.x_m, active.target.y_m)
            } else {
                (
                    self.pose.x_m + ex / dist * step,
                    self.pose.y_m + ey / dist * step,
                )
            };

            if self.collides(nx, ny) {
                return Progress::Collided;
            }

            self.pose.x_m = nx;
            self.pose.y_m = ny;
            trace!("Sim: pose {:?}", self.pose);
            return Progress::Moving;
        }

        let err = wrap_pi(active.target.heading_rad - self.pose.heading_rad);
        if err != 0.0 {
            let step = self.params.angular_speed_rads * dt_s;
            self.pose.heading_rad = if err.abs() <= step {
                active.target.heading_rad
            } else {
                wrap_pi(self.pose.heading_rad + step * err.signum())
            };
            return Progress::Moving;
        }

        Progress::Arrived
    }

    fn collides(&self, x_m: f64, y_m: f64) -> bool {
        let r = self.params.robot_radius_m;

        x_m < r
            || y_m < r
            || x_m > self.params.room_width_m - r
            || y_m > self.params.room_height_m - r
    }
}

impl SimHandle {
    pub fn new(world: SimWorld) -> Self {
        Self(Arc::new(Mutex::new(world)))
    }

    /// Lock the world. A poisoned lock is recovered, the world holds no invariants which a
    /// panicking holder could break half way.
    pub fn lock(&self) -> MutexGuard<'_, SimWorld> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MotionPort for SimHandle {
    fn enqueue_waypoint(&mut self, waypoint: Waypoint) {
        self.lock().enqueue(waypoint)
    }

    fn clear_and_stop(&mut self) {
        self.lock().clear_and_stop()
    }

    fn current_pose(&self) -> MotionPose {
        self.lock().pose()
    }

    fn reset_reference_frame(&mut self, pose: MotionPose) {
        self.lock().reset_frame(pose)
    }

    fn set_obstacle_avoidance(&mut self, enabled: bool, standoff_m: f64) {
        self.lock().set_obstacle_avoidance(enabled, standoff_m)
    }
}

impl DistanceProbe for SimHandle {
    fn sample_forward(&mut self) -> Result<f64, ProbeError> {
        Ok(self.lock().range(RangeSensor::Forward))
    }

    fn sample_side(&mut self) -> Result<f64, ProbeError> {
        Ok(self.lock().range(RangeSensor::Side))
    }
}

impl VirtualScheduler {
    pub fn new(world: SimHandle) -> Self {
        Self { world }
    }
}

impl DebounceScheduler for VirtualScheduler {
    fn after(&mut self, delay: Duration, token: DebounceToken) {
        self.world.lock().schedule(delay, token)
    }
}

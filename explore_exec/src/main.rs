//! Main exploration executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise the simulated world and the exploration controller
//!     - Start exploring
//!     - Main loop:
//!         - Wait for the next event from the event queue
//!         - Process the event in the exploration controller
//!         - Recover from missed waypoints
//!         - Periodically log telemetry
//!     - Stop exploring and save the position log

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::tc::{explore::ExploreCmd, Tc};
use explore_lib::{
    event_queue::{EventQueue, TimerScheduler},
    explore::{explore_ctrl::ExploreError, ExploreCtrl},
    params::ExploreExecParams,
    sim_client::SimClient,
    sim_world::{SimHandle, SimWorld},
    tc_processor,
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(
    name = "explore_exec",
    about = "Explores a simulated room by following its walls"
)]
struct Opt {
    /// Run duration in seconds, overrides the value in explore_exec.toml
    #[structopt(short, long)]
    duration_s: Option<f64>,

    /// Minimum level of log messages, at least `info`
    #[structopt(short, long, default_value = "info")]
    log_level: LevelFilter,

    /// Telecommands executed in order once the modules are running, as JSON packets such as
    /// `{"type": "EXPLORE", "payload": "Start"}`. Exploration starts immediately if none are given
    #[structopt(short, long = "tc")]
    tcs: Vec<String>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("explore_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Wall Following Exploration Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let mut exec_params: ExploreExecParams =
        util::params::load("explore_exec.toml").wrap_err("Could not load exec params")?;

    if let Some(d) = opt.duration_s {
        exec_params.run_duration_s = d;
    }

    exec_params
        .validate()
        .wrap_err("Invalid exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let (sender, queue) = EventQueue::new();

    let world = SimHandle::new(
        SimWorld::init("sim_world.toml").wrap_err("Failed to initialise the SimWorld")?,
    );
    let tick_period_s = world.lock().params().tick_period_s;
    info!("SimWorld init complete");

    let mut ctrl = ExploreCtrl::init(
        "explore_ctrl.toml",
        world.clone(),
        world.clone(),
        TimerScheduler::new(sender.clone()),
    )
    .wrap_err("Failed to initialise ExploreCtrl")?;
    info!("ExploreCtrl init complete");

    let mut sim_client = SimClient::start(world.clone(), sender, tick_period_s)
        .wrap_err("Failed to start the SimClient")?;
    info!("SimClient started");

    info!("Module initialisation complete\n");

    let mut arch_position = Archiver::from_path(&session, &exec_params.position_arch_path)
        .wrap_err("Failed to create the position archive")?;

    let startup_tcs = match opt.tcs.is_empty() {
        true => vec![Tc::Explore(ExploreCmd::Start)],
        false => opt
            .tcs
            .iter()
            .map(|t| Tc::from_json(t))
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("Invalid startup TC")?,
    };

    // ---- MAIN LOOP ----

    for tc in startup_tcs.iter() {
        tc_processor::exec(&mut ctrl, tc);
    }

    let run_duration = Duration::from_secs_f64(exec_params.run_duration_s);
    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let tm_period = match exec_params.tm_period_s.is_finite() {
        true => Duration::from_secs_f64(exec_params.tm_period_s),
        false => Duration::MAX,
    };
    let run_start = Instant::now();
    let mut last_tm = Instant::now();

    info!("Beginning main loop\n");

    while run_start.elapsed() < run_duration {
        let event = queue
            .next_timeout(cycle_period)
            .wrap_err("Event queue failed")?;

        if let Some(event) = event {
            match ctrl.handle_event(event) {
                Ok(()) => (),
                Err(e @ ExploreError::WaypointMissed { .. }) => {
                    warn!("{}", e);
                    if let Err(e) = ctrl.retry_last() {
                        error!("Could not recover from missed waypoint: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    error!("{}", e);
                    break;
                }
            }
        }

        if last_tm.elapsed() >= tm_period {
            info!("{:?}", ctrl.tm());
            last_tm = Instant::now();
        }
    }

    // ---- SHUTDOWN ----

    tc_processor::exec(&mut ctrl, &Tc::Explore(ExploreCmd::Stop));

    sim_client
        .stop()
        .wrap_err("Failed to stop the SimClient")?;

    info!(
        "Exploration finished with {} position samples, final estimate {:?}",
        ctrl.log().len(),
        ctrl.position()
    );

    for position in ctrl.log() {
        arch_position
            .serialise(position)
            .wrap_err("Failed to archive the position log")?;
    }

    debug!(
        "Position log: {}",
        ctrl.log()
            .to_json()
            .wrap_err("Failed to serialise the position log")?
    );

    session.save(&exec_params.position_log_path, ctrl.log().clone());
    session.save(&exec_params.tm_path, ctrl.tm());

    info!("End of execution");

    session.exit();

    Ok(())
}

//! # Minicar Control Executable
//!
//! This executable drives the minicar: it receives normalised joystick
//! demands over UDP and actuates the steering and drive motors through
//! their H-bridges.
//!
//! The general execution methodology consists of:
//!
//!     - Initialise session, logging and parameters
//!     - Bind the command socket
//!     - Acquire the GPIO capability and claim both motors' pins
//!     - Main loop (until interrupted):
//!         - Bounded-timeout command receive, holding the last command on
//!           channel failure
//!         - Actuate both motors
//!     - Orderly shutdown: stop PWM and deassert direction pins before the
//!       GPIO capability is released

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use structopt::StructOpt;

// Internal
use car_lib::{
    ctrl_loop,
    motor_ctrl::Motor,
    params::CarExecParams,
};
use comms_if::net::CmdSocket;
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(StructOpt)]
#[structopt(
    name = "car_exec",
    about = "Drives the minicar's motors from UDP joystick commands"
)]
struct Opt {
    /// Path to the parameter file
    #[structopt(long, default_value = "params/car_exec.toml")]
    params: PathBuf,

    /// Override the bind address from the parameter file
    #[structopt(long)]
    bind_address: Option<String>,
}

// ---------------------------------------------------------------------------
// MAIN
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("car_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Minicar Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let mut params: CarExecParams =
        util::params::load(&opt.params).wrap_err("Could not load parameters")?;

    if let Some(addr) = opt.bind_address {
        params.bind_address = addr;
    }

    info!("Parameters loaded");

    // ---- SHUTDOWN FLAG ----

    // Set from the interrupt handler, polled once per loop cycle
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
        })
        .wrap_err("Failed to set the interrupt handler")?;
    }

    // ---- COMMAND SOCKET ----

    let mut cmd_socket = CmdSocket::bind(
        params.bind_address.as_str(),
        Duration::from_millis(params.recv_timeout_ms),
    )
    .wrap_err("Failed to bind the command socket")?;

    info!("Command socket bound to {}", params.bind_address);

    // ---- MOTOR INITIALISATION ----

    // Acquire the GPIO capability, handed down to each motor constructor
    let mut gpio = init_gpio()?;

    let mut steering = Motor::new(
        &mut gpio,
        &params.steering.pins,
        params.pwm_frequency_hz,
        params.steering.shaping,
    )
    .wrap_err("Failed to initialise the steering motor")?;

    let mut drive = Motor::new(
        &mut gpio,
        &params.drive.pins,
        params.pwm_frequency_hz,
        params.drive.shaping,
    )
    .wrap_err("Failed to initialise the drive motor")?;

    info!(
        "Motors initialised (steering: {}, drive: {})",
        steering.policy(),
        drive.policy()
    );

    // ---- MAIN LOOP ----

    info!("Initialisation complete, entering main loop");

    let loop_result = ctrl_loop::run(&mut cmd_socket, &mut steering, &mut drive, &shutdown);

    // ---- SHUTDOWN ----

    // Stop PWM output and deassert the direction pins before the GPIO
    // capability is released, even if the loop failed
    info!("Cleaning up...");

    if let Err(e) = steering.stop() {
        warn!("Failed to stop the steering motor: {}", e);
    }
    if let Err(e) = drive.stop() {
        warn!("Failed to stop the drive motor: {}", e);
    }

    drop(gpio);

    loop_result.wrap_err("Control loop failed")?;

    info!("Shutdown complete");

    Ok(())
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the GPIO subsystem for this host.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
fn init_gpio() -> Result<car_lib::gpio::rpi::RpiGpio> {
    car_lib::gpio::rpi::RpiGpio::new().wrap_err("Failed to initialise the GPIO subsystem")
}

/// Initialise the GPIO subsystem for this host.
///
/// Not a Raspberry Pi target, so the mock backend is used - the executable
/// runs and logs but does not touch hardware.
#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
fn init_gpio() -> Result<car_lib::gpio::mock::MockGpio> {
    warn!("Not running on the car, actuating a mock GPIO board");
    Ok(car_lib::gpio::mock::MockGpio::new())
}

//! # Control Loop
//!
//! The cyclic heart of the executable: one bounded-timeout command receive
//! per cycle, then actuation of both motors with whichever command is
//! current. Channel failures are expected and non-fatal - the car holds its
//! last commanded state (decaying towards zero under the smoothing policy)
//! rather than stopping the loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::atomic::{AtomicBool, Ordering};

use comms_if::{
    cmd::DriveCmd,
    net::{CmdSocket, CmdSocketError},
};
use log::{info, trace, warn};

use crate::gpio::{GpioDriver, PeripheralError};
use crate::motor_ctrl::Motor;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of drive commands polled once per cycle.
///
/// Implemented by [`CmdSocket`]; the loop is generic over it so tests can
/// inject failing or scripted sources.
pub trait CmdSource {
    fn recv_cmd(&mut self) -> Result<DriveCmd, CmdSocketError>;
}

impl CmdSource for CmdSocket {
    fn recv_cmd(&mut self) -> Result<DriveCmd, CmdSocketError> {
        CmdSocket::recv_cmd(self)
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run the control loop until the shutdown flag is set.
///
/// Every cycle both motors are actuated, even when no new command arrived,
/// so the time-based shaping state keeps advancing. Commands are applied in
/// strict receipt order, latest wins. Only a [`PeripheralError`] terminates
/// the loop early; the caller must still perform the motor stop sequence
/// afterwards.
pub fn run<S, G>(
    source: &mut S,
    steering: &mut Motor<G>,
    drive: &mut Motor<G>,
    shutdown: &AtomicBool,
) -> Result<(), PeripheralError>
where
    S: CmdSource,
    G: GpioDriver,
{
    // Until the first command arrives the car sits at the neutral demand
    let mut cmd = DriveCmd::default();
    let mut comms_lost = true;

    while !shutdown.load(Ordering::Relaxed) {
        // The receive is the only suspension point in the cycle, bounded by
        // the socket's receive timeout
        match source.recv_cmd() {
            Ok(c) => {
                if comms_lost {
                    info!("Command link up");
                    comms_lost = false;
                }

                cmd = c;
                trace!("F/B: {:+.2} L/R: {:+.2}", cmd.forward, cmd.lateral);
            }
            Err(CmdSocketError::Timeout) => {
                if !comms_lost {
                    warn!("No command received, holding last demand");
                    comms_lost = true;
                }
            }
            Err(e) => {
                warn!("Command receive failed: {}", e);
            }
        }

        steering.set(cmd.lateral)?;
        drive.set(cmd.forward)?;
    }

    info!("Shutdown requested, leaving control loop");

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

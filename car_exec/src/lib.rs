//! # Minicar Control Library
//!
//! Library side of the minicar control executable. Holds the GPIO interface
//! abstraction, the motor control module and the control loop, so they can
//! be exercised by tests and by the `motor_test` binary as well as the main
//! executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Control loop tying the command socket to the motors.
pub mod ctrl_loop;

/// GPIO peripheral interface consumed by the motor module.
pub mod gpio;

/// Motor actuation and command shaping.
pub mod motor_ctrl;

/// Parameters for the car executable.
pub mod params;

//! # Motor Control Module
//!
//! This module converts normalised joystick demands into H-bridge pin states
//! and PWM duty cycles. A [`Motor`] owns one H-bridge's two direction pins
//! and one PWM pin, and shapes each demand through one of two policies
//! selected at construction:
//!
//! - [`shaping::DeadzoneRescale`] - deadzone compensation with magnitude
//!   rescaling, for direct (unsmoothed) actuation.
//! - [`shaping::LeakyIntegrator`] - continuous-time exponential smoothing,
//!   so abrupt setpoint changes become bounded-rate ramps.
//!
//! Shaping never fails: out-of-range or non-finite demands are sanitised,
//! not propagated, so a bad command can never stall actuation.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod motor;
pub mod shaping;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use motor::*;
pub use shaping::{Direction, Drive, Shaper, ShapingConfig};

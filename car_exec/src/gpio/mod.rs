//! # GPIO Interface Module
//!
//! This module provides a unified interface over the GPIO/PWM peripheral
//! driver, so the motor module can be written once and run against either
//! the real Raspberry Pi pins or a mock board in tests.
//!
//! The [`GpioDriver`] instance is the process-wide GPIO capability: it is
//! constructed exactly once by the composition root and handed down to each
//! motor constructor, which claims its pins from it. Dropping the driver
//! releases the subsystem.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Mock [`GpioDriver`] implementation recording pin state.
pub mod mock;

/// [`GpioDriver`] implementation for the Raspberry Pi, using software PWM.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub mod rpi;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A digital output pin, exclusively owned by its claimer.
pub trait OutputPin {
    /// Drive the pin high (`true`) or low (`false`).
    fn write(&mut self, high: bool) -> Result<(), PeripheralError>;
}

/// A PWM output channel, exclusively owned by its claimer.
pub trait PwmChannel {
    /// Set the duty cycle as a percentage.
    ///
    /// ## Arguments
    /// - `duty_cycle_pct` - The duty cycle to set, between 0.0 and 100.0.
    ///   Values outside this range are clamped by the implementation.
    fn set_duty_cycle(&mut self, duty_cycle_pct: f64) -> Result<(), PeripheralError>;

    /// Stop PWM output on this channel, leaving the pin low.
    fn stop(&mut self) -> Result<(), PeripheralError>;
}

/// Trait to provide a unified API for accessing the GPIO peripheral.
pub trait GpioDriver {
    /// The concrete output pin type for this driver.
    type Output: OutputPin;

    /// The concrete PWM channel type for this driver.
    type Pwm: PwmChannel;

    /// Claim a pin as a digital output.
    ///
    /// Each pin may be claimed at most once for the lifetime of the driver.
    fn claim_output(&mut self, pin: u8) -> Result<Self::Output, PeripheralError>;

    /// Claim a pin as a PWM output at the given frequency, initially at duty
    /// cycle zero.
    fn claim_pwm(&mut self, pin: u8, frequency_hz: f64)
        -> Result<Self::Pwm, PeripheralError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the GPIO peripheral.
///
/// Any of these imply the hardware is in an unknown state, so they are
/// treated as fatal by the executable (after attempting a graceful stop).
#[derive(Debug, thiserror::Error)]
pub enum PeripheralError {
    #[error("GPIO subsystem initialisation failed: {0}")]
    InitFailed(String),

    #[error("Pin {0} is not available: {1}")]
    PinUnavailable(u8, String),

    #[error("Failed to write to pin {0}: {1}")]
    WriteFailed(u8, String),

    #[error("Failed to drive PWM on pin {0}: {1}")]
    PwmFailed(u8, String),
}

//! # Raspberry Pi GPIO Driver
//!
//! [`GpioDriver`] implementation backed by `rppal`, driving the H-bridge
//! PWM line with rppal's software PWM so any GPIO pin can be used.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use rppal::gpio::Gpio;

use super::{GpioDriver, OutputPin, PeripheralError, PwmChannel};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The Raspberry Pi GPIO capability.
///
/// Wraps the rppal GPIO subsystem handle. Pins claimed from this driver are
/// released when they are dropped, the subsystem itself when the driver is.
pub struct RpiGpio {
    gpio: Gpio,
}

/// A claimed Raspberry Pi output pin.
pub struct RpiOutputPin {
    pin: rppal::gpio::OutputPin,
}

/// A claimed Raspberry Pi software PWM channel.
pub struct RpiPwm {
    pin_num: u8,
    pin: rppal::gpio::OutputPin,
    frequency_hz: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RpiGpio {
    /// Initialise the GPIO subsystem.
    pub fn new() -> Result<Self, PeripheralError> {
        let gpio = Gpio::new().map_err(|e| PeripheralError::InitFailed(e.to_string()))?;

        Ok(Self { gpio })
    }
}

impl GpioDriver for RpiGpio {
    type Output = RpiOutputPin;
    type Pwm = RpiPwm;

    fn claim_output(&mut self, pin: u8) -> Result<Self::Output, PeripheralError> {
        let pin_handle = self
            .gpio
            .get(pin)
            .map_err(|e| PeripheralError::PinUnavailable(pin, e.to_string()))?
            .into_output();

        Ok(RpiOutputPin { pin: pin_handle })
    }

    fn claim_pwm(
        &mut self,
        pin: u8,
        frequency_hz: f64,
    ) -> Result<Self::Pwm, PeripheralError> {
        let pin_handle = self
            .gpio
            .get(pin)
            .map_err(|e| PeripheralError::PinUnavailable(pin, e.to_string()))?
            .into_output();

        let mut pwm = RpiPwm {
            pin_num: pin,
            pin: pin_handle,
            frequency_hz,
        };

        pwm.set_duty_cycle(0.0)?;

        Ok(pwm)
    }
}

impl OutputPin for RpiOutputPin {
    fn write(&mut self, high: bool) -> Result<(), PeripheralError> {
        // rppal pin writes are infallible once the pin is claimed
        if high {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }

        Ok(())
    }
}

impl PwmChannel for RpiPwm {
    fn set_duty_cycle(&mut self, duty_cycle_pct: f64) -> Result<(), PeripheralError> {
        let duty = duty_cycle_pct.max(0.0).min(100.0) / 100.0;

        self.pin
            .set_pwm_frequency(self.frequency_hz, duty)
            .map_err(|e| PeripheralError::PwmFailed(self.pin_num, e.to_string()))
    }

    fn stop(&mut self) -> Result<(), PeripheralError> {
        self.pin
            .clear_pwm()
            .map_err(|e| PeripheralError::PwmFailed(self.pin_num, e.to_string()))?;

        self.pin.set_low();

        Ok(())
    }
}

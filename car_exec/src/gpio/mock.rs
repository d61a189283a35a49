//! # Mock GPIO Driver
//!
//! Records pin levels and duty cycles in shared state instead of touching
//! hardware. Used by the unit tests, and as the fallback backend when the
//! executable is run on a development host rather than the car.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::{GpioDriver, OutputPin, PeripheralError, PwmChannel};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of the mock board, shared between the driver and its claimed pins.
#[derive(Default)]
pub struct MockBoard {
    /// Level of each output pin.
    pub levels: HashMap<u8, bool>,

    /// Current duty cycle (percent) of each PWM pin.
    pub duty_cycle_pct: HashMap<u8, f64>,

    /// Number of duty cycle writes per PWM pin.
    pub duty_writes: HashMap<u8, u32>,

    /// PWM pins which have been stopped.
    pub pwm_stopped: HashSet<u8>,

    claimed: HashSet<u8>,
}

/// Mock implementation of [`GpioDriver`].
pub struct MockGpio {
    board: Arc<Mutex<MockBoard>>,
}

/// A claimed mock output pin.
pub struct MockOutputPin {
    pin: u8,
    board: Arc<Mutex<MockBoard>>,
}

/// A claimed mock PWM channel.
pub struct MockPwm {
    pin: u8,
    board: Arc<Mutex<MockBoard>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MockBoard {
    /// Get the level of an output pin, defaulting to low.
    pub fn level(&self, pin: u8) -> bool {
        *self.levels.get(&pin).unwrap_or(&false)
    }

    /// Get the duty cycle of a PWM pin, defaulting to zero.
    pub fn duty_cycle(&self, pin: u8) -> f64 {
        *self.duty_cycle_pct.get(&pin).unwrap_or(&0.0)
    }
}

impl MockGpio {
    pub fn new() -> Self {
        Self {
            board: Arc::new(Mutex::new(MockBoard::default())),
        }
    }

    /// Get a handle on the board state, for inspection by tests.
    pub fn board(&self) -> Arc<Mutex<MockBoard>> {
        self.board.clone()
    }

    fn claim(&mut self, pin: u8) -> Result<(), PeripheralError> {
        let mut board = self.board.lock().unwrap();

        if !board.claimed.insert(pin) {
            return Err(PeripheralError::PinUnavailable(
                pin,
                "already claimed".into(),
            ));
        }

        Ok(())
    }
}

impl Default for MockGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioDriver for MockGpio {
    type Output = MockOutputPin;
    type Pwm = MockPwm;

    fn claim_output(&mut self, pin: u8) -> Result<Self::Output, PeripheralError> {
        self.claim(pin)?;

        Ok(MockOutputPin {
            pin,
            board: self.board.clone(),
        })
    }

    fn claim_pwm(
        &mut self,
        pin: u8,
        _frequency_hz: f64,
    ) -> Result<Self::Pwm, PeripheralError> {
        self.claim(pin)?;

        let mut board = self.board.lock().unwrap();
        board.duty_cycle_pct.insert(pin, 0.0);

        Ok(MockPwm {
            pin,
            board: self.board.clone(),
        })
    }
}

impl OutputPin for MockOutputPin {
    fn write(&mut self, high: bool) -> Result<(), PeripheralError> {
        let mut board = self.board.lock().unwrap();
        board.levels.insert(self.pin, high);
        Ok(())
    }
}

impl PwmChannel for MockPwm {
    fn set_duty_cycle(&mut self, duty_cycle_pct: f64) -> Result<(), PeripheralError> {
        let mut board = self.board.lock().unwrap();

        board
            .duty_cycle_pct
            .insert(self.pin, duty_cycle_pct.max(0.0).min(100.0));
        *board.duty_writes.entry(self.pin).or_insert(0) += 1;
        board.pwm_stopped.remove(&self.pin);

        Ok(())
    }

    fn stop(&mut self) -> Result<(), PeripheralError> {
        let mut board = self.board.lock().unwrap();

        board.duty_cycle_pct.insert(self.pin, 0.0);
        board.pwm_stopped.insert(self.pin);

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exclusive_claim() {
        let mut gpio = MockGpio::new();

        let mut pin = gpio.claim_output(17).unwrap();

        // Second claim of the same pin must fail
        assert!(matches!(
            gpio.claim_output(17),
            Err(PeripheralError::PinUnavailable(17, _))
        ));

        pin.write(true).unwrap();
        assert!(gpio.board().lock().unwrap().level(17));
    }
}

//! # Motor Actuator
//!
//! A [`Motor`] owns one H-bridge interface: two direction pins and one PWM
//! pin, claimed exclusively for the process lifetime.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::gpio::{GpioDriver, OutputPin, PeripheralError, PwmChannel};

use super::shaping::{Direction, Shaper, ShapingConfig};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The pin triple driving one H-bridge.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MotorPins {
    /// First direction pin (asserted for reverse).
    pub in1: u8,

    /// Second direction pin (asserted for forward).
    pub in2: u8,

    /// PWM speed pin.
    pub pwm: u8,
}

/// A single DC motor behind a direction-plus-PWM H-bridge.
///
/// Invariant: the two direction pins are never both asserted, which would
/// short the H-bridge (shoot-through).
pub struct Motor<G: GpioDriver> {
    in1: G::Output,
    in2: G::Output,
    pwm: G::Pwm,

    shaper: Shaper,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<G: GpioDriver> Motor<G> {
    /// Claim the motor's pins from the GPIO capability and start PWM at duty
    /// cycle zero, with both direction pins deasserted.
    pub fn new(
        gpio: &mut G,
        pins: &MotorPins,
        pwm_frequency_hz: f64,
        shaping: ShapingConfig,
    ) -> Result<Self, PeripheralError> {
        let mut in1 = gpio.claim_output(pins.in1)?;
        let mut in2 = gpio.claim_output(pins.in2)?;
        let mut pwm = gpio.claim_pwm(pins.pwm, pwm_frequency_hz)?;

        in1.write(false)?;
        in2.write(false)?;
        pwm.set_duty_cycle(0.0)?;

        Ok(Self {
            in1,
            in2,
            pwm,
            shaper: Shaper::from_config(shaping),
        })
    }

    /// Actuate the motor with a normalised demand in [-1, +1].
    ///
    /// The demand is shaped by the motor's policy, then the direction pins
    /// and duty cycle are written. Bad demands are sanitised by the shaping
    /// policy; only peripheral write failures propagate.
    pub fn set(&mut self, demand: f64) -> Result<(), PeripheralError> {
        let drive = self.shaper.shape(demand);

        // Drop the previously asserted pin before raising the other so the
        // pins are never both high, even transiently
        match drive.direction {
            Direction::Reverse => {
                self.in2.write(false)?;
                self.in1.write(true)?;
            }
            Direction::Forward => {
                self.in1.write(false)?;
                self.in2.write(true)?;
            }
        }

        self.pwm.set_duty_cycle(drive.duty_cycle_pct)
    }

    /// Stop the motor: duty cycle to zero, PWM output stopped, both
    /// direction pins deasserted.
    ///
    /// Must be called on the shutdown path so the motor is not left
    /// energised at its last duty cycle after process exit.
    pub fn stop(&mut self) -> Result<(), PeripheralError> {
        self.pwm.set_duty_cycle(0.0)?;
        self.pwm.stop()?;

        self.in1.write(false)?;
        self.in2.write(false)?;

        Ok(())
    }

    /// Name of the shaping policy active on this motor.
    pub fn policy(&self) -> &'static str {
        self.shaper.policy()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::gpio::mock::MockGpio;

    const PINS: MotorPins = MotorPins {
        in1: 23,
        in2: 22,
        pwm: 24,
    };

    fn deadzone_motor(gpio: &mut MockGpio) -> Motor<MockGpio> {
        Motor::new(
            gpio,
            &PINS,
            100.0,
            ShapingConfig::DeadzoneRescale { deadzone: 0.2 },
        )
        .unwrap()
    }

    #[test]
    fn test_full_forward() {
        let mut gpio = MockGpio::new();
        let board = gpio.board();
        let mut motor = deadzone_motor(&mut gpio);

        motor.set(1.0).unwrap();

        let board = board.lock().unwrap();
        assert!(!board.level(PINS.in1));
        assert!(board.level(PINS.in2));
        assert_eq!(board.duty_cycle(PINS.pwm), 100.0);
    }

    #[test]
    fn test_full_reverse() {
        let mut gpio = MockGpio::new();
        let board = gpio.board();
        let mut motor = deadzone_motor(&mut gpio);

        motor.set(-1.0).unwrap();

        let board = board.lock().unwrap();
        assert!(board.level(PINS.in1));
        assert!(!board.level(PINS.in2));
        assert_eq!(board.duty_cycle(PINS.pwm), 100.0);
    }

    #[test]
    fn test_no_shoot_through() {
        let mut gpio = MockGpio::new();
        let board = gpio.board();
        let mut motor = deadzone_motor(&mut gpio);

        // Alternating demands including noisy and out-of-range values
        for demand in &[1.0, -1.0, 0.5, -0.5, 0.0, 5.0, -5.0, f64::NAN, 0.1, -0.1] {
            motor.set(*demand).unwrap();

            let board = board.lock().unwrap();
            assert!(
                !(board.level(PINS.in1) && board.level(PINS.in2)),
                "direction pins both asserted after demand {}",
                demand
            );
        }
    }

    #[test]
    fn test_smoothed_motor_respects_ceiling() {
        let mut gpio = MockGpio::new();
        let board = gpio.board();
        let mut motor = Motor::new(
            &mut gpio,
            &PINS,
            100.0,
            ShapingConfig::LeakyIntegrator {
                rate_constant: 2.0,
                max_value_pct: 60.0,
                duty_floor_pct: 10.0,
            },
        )
        .unwrap();

        for _ in 0..50 {
            motor.set(1.0).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));

            let board = board.lock().unwrap();
            assert!(board.duty_cycle(PINS.pwm) <= 60.0);
            // Smoothed state is non-negative under a positive demand
            assert!(!board.level(PINS.in1));
        }
    }

    #[test]
    fn test_stop() {
        let mut gpio = MockGpio::new();
        let board = gpio.board();
        let mut motor = deadzone_motor(&mut gpio);

        motor.set(1.0).unwrap();
        motor.stop().unwrap();

        let board = board.lock().unwrap();
        assert_eq!(board.duty_cycle(PINS.pwm), 0.0);
        assert!(board.pwm_stopped.contains(&PINS.pwm));
        assert!(!board.level(PINS.in1));
        assert!(!board.level(PINS.in2));
    }

    #[test]
    fn test_exclusive_pin_ownership() {
        let mut gpio = MockGpio::new();
        let _motor = deadzone_motor(&mut gpio);

        // A second motor on overlapping pins must be rejected
        assert!(Motor::new(
            &mut gpio,
            &PINS,
            100.0,
            ShapingConfig::DeadzoneRescale { deadzone: 0.2 },
        )
        .is_err());
    }
}

//! # Command Shaping Policies
//!
//! Turns a raw normalised demand into a direction and a duty cycle. Two
//! policies are provided; which one a motor uses is part of its
//! configuration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::time::Instant;

use util::maths::{clamp, lin_map};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Upper bound on the elapsed time used for a single integrator step, in
/// seconds.
///
/// After a command stall the first update would otherwise see a very large
/// `dt` and jump almost straight to the target; the cap bounds the maximum
/// single-step correction fraction to `1 - exp(-k * MAX_STEP_DT_S)`.
pub const MAX_STEP_DT_S: f64 = 0.5;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Direction of motor rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Configuration of a shaping policy, selected per motor in the parameter
/// file.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ShapingConfig {
    /// Deadzone compensation and magnitude rescale, no smoothing.
    DeadzoneRescale {
        /// Demands with magnitude below this are treated as zero.
        deadzone: f64,
    },

    /// Continuous-time exponential smoothing towards the demand.
    LeakyIntegrator {
        /// Rate constant `k` of the exponential approach, in 1/seconds.
        rate_constant: f64,

        /// Ceiling on the smoothed magnitude, in duty cycle percent.
        max_value_pct: f64,

        /// Magnitudes below this produce duty cycle zero, as many H-bridges
        /// cannot reliably actuate at very low duty cycles.
        duty_floor_pct: f64,
    },
}

/// A runtime shaping policy.
pub enum Shaper {
    DeadzoneRescale(DeadzoneRescale),
    LeakyIntegrator(LeakyIntegrator),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A shaped drive output: what actually gets written to the H-bridge.
#[derive(Clone, Copy, Debug)]
pub struct Drive {
    pub direction: Direction,

    /// Duty cycle in percent, guaranteed to be in [0, 100].
    pub duty_cycle_pct: f64,
}

/// Deadzone-rescale shaping (no smoothing).
///
/// Demands inside the deadzone produce no drive at all, compensating for
/// joystick noise near centre. Above the deadzone the magnitude is rescaled
/// so the full duty cycle range remains reachable, reaching 100% at full
/// demand.
pub struct DeadzoneRescale {
    deadzone: f64,
}

/// Leaky-integrator shaping.
///
/// The internal state decays exponentially towards the (clamped) target, so
/// full-reverse-to-full-forward demands become a bounded-rate ramp. The
/// direction only switches once the smoothed value crosses zero, which also
/// stops direction-pin chatter from noisy near-zero demands.
pub struct LeakyIntegrator {
    current: f64,
    last_update: Instant,

    rate_constant: f64,
    max_value_pct: f64,
    duty_floor_pct: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Shaper {
    /// Build the runtime policy from its configuration.
    pub fn from_config(config: ShapingConfig) -> Self {
        match config {
            ShapingConfig::DeadzoneRescale { deadzone } => {
                Shaper::DeadzoneRescale(DeadzoneRescale::new(deadzone))
            }
            ShapingConfig::LeakyIntegrator {
                rate_constant,
                max_value_pct,
                duty_floor_pct,
            } => Shaper::LeakyIntegrator(LeakyIntegrator::new(
                rate_constant,
                max_value_pct,
                duty_floor_pct,
            )),
        }
    }

    /// Shape a normalised demand in [-1, +1] into a drive output.
    pub fn shape(&mut self, demand: f64) -> Drive {
        match self {
            Shaper::DeadzoneRescale(s) => s.shape(demand),
            Shaper::LeakyIntegrator(s) => s.shape(demand),
        }
    }

    /// Name of the active policy.
    pub fn policy(&self) -> &'static str {
        match self {
            Shaper::DeadzoneRescale(_) => "deadzone_rescale",
            Shaper::LeakyIntegrator(_) => "leaky_integrator",
        }
    }
}

impl DeadzoneRescale {
    pub fn new(deadzone: f64) -> Self {
        Self { deadzone }
    }

    /// Shape a normalised demand.
    pub fn shape(&self, demand: f64) -> Drive {
        // Sanitise, never error: a bad demand must not stall actuation
        let demand = if demand.is_finite() { demand } else { 0.0 };
        let demand = clamp(&demand, &-1.0, &1.0);

        let direction = if demand < 0.0 {
            Direction::Reverse
        } else {
            Direction::Forward
        };

        let mag = demand.abs();

        let duty_cycle_pct = if mag < self.deadzone {
            0.0
        } else {
            // Rescale so full duty remains reachable above the deadzone
            let rescaled = lin_map((self.deadzone, 1.0), (0.0, 1.0), mag);
            clamp(&(100.0 * rescaled).round(), &0.0, &100.0)
        };

        Drive {
            direction,
            duty_cycle_pct,
        }
    }
}

impl LeakyIntegrator {
    pub fn new(rate_constant: f64, max_value_pct: f64, duty_floor_pct: f64) -> Self {
        Self {
            current: 0.0,
            last_update: Instant::now(),
            rate_constant,
            max_value_pct,
            duty_floor_pct,
        }
    }

    /// Advance the integrator state by `dt_s` seconds towards `target_pct`
    /// and return the new state.
    ///
    /// The target is clamped to the configured ceiling and `dt_s` is capped
    /// at [`MAX_STEP_DT_S`] before the exponential update is applied.
    pub fn step(&mut self, target_pct: f64, dt_s: f64) -> f64 {
        let target = if target_pct.is_finite() { target_pct } else { 0.0 };
        let target = clamp(&target, &-self.max_value_pct, &self.max_value_pct);

        let dt = clamp(&dt_s, &0.0, &MAX_STEP_DT_S);

        self.current += (target - self.current) * (1.0 - (-self.rate_constant * dt).exp());

        self.current
    }

    /// Shape a normalised demand, advancing the state by the wall-clock time
    /// elapsed since the previous call.
    pub fn shape(&mut self, demand: f64) -> Drive {
        let demand = if demand.is_finite() { demand } else { 0.0 };

        let now = Instant::now();
        let dt_s = now.duration_since(self.last_update).as_secs_f64();
        self.last_update = now;

        // Demand is normalised, the integrator works in duty cycle percent
        let current = self.step(demand * 100.0, dt_s);

        self.drive_for(current)
    }

    /// Map an integrator state onto a drive output.
    ///
    /// Direction follows the sign of the smoothed state, not the raw demand.
    fn drive_for(&self, current: f64) -> Drive {
        let direction = if current < 0.0 {
            Direction::Reverse
        } else {
            Direction::Forward
        };

        let mag = current.abs();

        let duty_cycle_pct = if mag < self.duty_floor_pct {
            // Turn off completely rather than issue a sub-threshold PWM value
            0.0
        } else {
            clamp(&mag.round(), &0.0, &100.0)
        };

        Drive {
            direction,
            duty_cycle_pct,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const DEADZONE: f64 = 0.2;

    #[test]
    fn test_deadzone_zero_inside() {
        let shaper = DeadzoneRescale::new(DEADZONE);

        for demand in &[0.0, 0.05, -0.05, 0.19, -0.19] {
            assert_eq!(
                shaper.shape(*demand).duty_cycle_pct,
                0.0,
                "demand {} should be inside the deadzone",
                demand
            );
        }
    }

    #[test]
    fn test_deadzone_rescale_monotonic_and_full_range() {
        let shaper = DeadzoneRescale::new(DEADZONE);

        let mut last_duty = 0.0;

        for i in 0..=100 {
            let demand = DEADZONE + (1.0 - DEADZONE) * (i as f64 / 100.0);
            let duty = shaper.shape(demand).duty_cycle_pct;

            assert!(duty >= last_duty, "duty must not decrease with demand");
            last_duty = duty;
        }

        // Full demand reaches full duty, after the rescale (1-0.2)/0.8 = 1
        assert_eq!(shaper.shape(1.0).duty_cycle_pct, 100.0);
        assert_eq!(shaper.shape(1.0).direction, Direction::Forward);
    }

    #[test]
    fn test_deadzone_rescale_sanitises() {
        let shaper = DeadzoneRescale::new(DEADZONE);

        // Out of range demands clamp rather than error
        assert_eq!(shaper.shape(5.0).duty_cycle_pct, 100.0);
        assert_eq!(shaper.shape(-5.0).duty_cycle_pct, 100.0);
        assert_eq!(shaper.shape(-5.0).direction, Direction::Reverse);

        // Non-finite demands are treated as zero
        assert_eq!(shaper.shape(f64::NAN).duty_cycle_pct, 0.0);
        assert_eq!(shaper.shape(f64::INFINITY).duty_cycle_pct, 0.0);
    }

    #[test]
    fn test_integrator_converges_without_overshoot() {
        let mut integ = LeakyIntegrator::new(2.0, 99.0, 10.0);

        let target = 80.0;
        let mut last = 0.0;

        for _ in 0..200 {
            let current = integ.step(target, 0.1);

            assert!(current >= last, "approach must be monotonic");
            assert!(current <= target, "state must never overshoot the target");
            last = current;
        }

        // After 20 simulated seconds at k = 2 the state is indistinguishable
        // from the target
        assert!((last - target).abs() < 1e-6);
    }

    #[test]
    fn test_integrator_dt_saturation() {
        let mut a = LeakyIntegrator::new(2.0, 99.0, 10.0);
        let mut b = LeakyIntegrator::new(2.0, 99.0, 10.0);

        // A huge dt behaves exactly like the cap
        assert_eq!(a.step(50.0, 1000.0), b.step(50.0, MAX_STEP_DT_S));
    }

    #[test]
    fn test_integrator_ceiling() {
        let mut integ = LeakyIntegrator::new(2.0, 60.0, 10.0);

        // Demand far above the ceiling is clamped before smoothing
        for _ in 0..500 {
            let current = integ.step(100.0, MAX_STEP_DT_S);
            assert!(current <= 60.0);
        }

        assert!((integ.current - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_integrator_duty_floor() {
        let integ = LeakyIntegrator::new(2.0, 99.0, 10.0);

        assert_eq!(integ.drive_for(9.9).duty_cycle_pct, 0.0);
        assert_eq!(integ.drive_for(-9.9).duty_cycle_pct, 0.0);
        assert_eq!(integ.drive_for(10.0).duty_cycle_pct, 10.0);
        assert_eq!(integ.drive_for(-42.4).duty_cycle_pct, 42.0);
    }

    #[test]
    fn test_integrator_direction_follows_state() {
        let integ = LeakyIntegrator::new(2.0, 99.0, 10.0);

        assert_eq!(integ.drive_for(-30.0).direction, Direction::Reverse);
        assert_eq!(integ.drive_for(30.0).direction, Direction::Forward);
        assert_eq!(integ.drive_for(0.0).direction, Direction::Forward);
    }
}

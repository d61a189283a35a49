//! # Car Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::motor_ctrl::{MotorPins, ShapingConfig};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CarExecParams {
    /// Local address to bind the command socket to.
    pub bind_address: String,

    /// Command receive timeout in milliseconds. Bounds the duration of one
    /// control loop cycle.
    pub recv_timeout_ms: u64,

    /// PWM frequency used for both motors.
    pub pwm_frequency_hz: f64,

    /// Left/right steering motor.
    pub steering: MotorParams,

    /// Forward/backward drive motor.
    pub drive: MotorParams,
}

/// Parameters for a single motor.
#[derive(Deserialize)]
pub struct MotorParams {
    /// H-bridge pin triple.
    pub pins: MotorPins,

    /// Shaping policy for this motor.
    pub shaping: ShapingConfig,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::path::Path;

    /// The parameter file shipped in the repo must stay loadable.
    #[test]
    fn test_load_default_params() {
        let params: CarExecParams =
            util::params::load(Path::new("../params/car_exec.toml")).unwrap();

        assert!(params.recv_timeout_ms > 0);

        // Drive ceiling is kept below the steering ceiling to cap forward
        // speed
        match (params.drive.shaping, params.steering.shaping) {
            (
                ShapingConfig::LeakyIntegrator {
                    max_value_pct: drv, ..
                },
                ShapingConfig::LeakyIntegrator {
                    max_value_pct: steer,
                    ..
                },
            ) => assert!(drv < steer),
            _ => panic!("Default params expected to use the leaky integrator"),
        }
    }
}

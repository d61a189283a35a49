//! Single motor hardware check
//!
//! Ramps one motor from full reverse to full forward in 21 steps, half a
//! second apart, using the deadzone-rescale policy, then stops it. Run this
//! on the bench to verify an H-bridge's wiring before driving the car.

use std::thread;
use std::time::Duration;

use color_eyre::{eyre::WrapErr, Result};
use structopt::StructOpt;

use car_lib::motor_ctrl::{Motor, MotorPins, ShapingConfig};

#[derive(StructOpt)]
#[structopt(name = "motor_test", about = "Ramp a single motor for bench testing")]
struct Opt {
    /// First direction pin
    #[structopt(long, default_value = "23")]
    in1: u8,

    /// Second direction pin
    #[structopt(long, default_value = "24")]
    in2: u8,

    /// PWM pin
    #[structopt(long, default_value = "25")]
    pwm: u8,

    /// Deadzone of the shaping policy
    #[structopt(long, default_value = "0.2")]
    deadzone: f64,

    /// PWM frequency
    #[structopt(long, default_value = "100.0")]
    pwm_frequency_hz: f64,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let pins = MotorPins {
        in1: opt.in1,
        in2: opt.in2,
        pwm: opt.pwm,
    };

    let mut gpio = init_gpio()?;

    let mut motor = Motor::new(
        &mut gpio,
        &pins,
        opt.pwm_frequency_hz,
        ShapingConfig::DeadzoneRescale {
            deadzone: opt.deadzone,
        },
    )
    .wrap_err("Failed to initialise the motor")?;

    println!("Ramping motor on pins {:?}", pins);

    for i in 0..=20 {
        let demand = (i as f64 - 10.0) / 10.0;
        println!("demand: {:+.1}", demand);

        motor.set(demand).wrap_err("Failed to actuate the motor")?;
        thread::sleep(Duration::from_millis(500));
    }

    motor.stop().wrap_err("Failed to stop the motor")?;
    println!("Done");

    Ok(())
}

#[cfg(all(target_arch = "arm", target_os = "linux"))]
fn init_gpio() -> Result<car_lib::gpio::rpi::RpiGpio> {
    car_lib::gpio::rpi::RpiGpio::new().wrap_err("Failed to initialise the GPIO subsystem")
}

#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
fn init_gpio() -> Result<car_lib::gpio::mock::MockGpio> {
    println!("Not running on the car, actuating a mock GPIO board");
    Ok(car_lib::gpio::mock::MockGpio::new())
}

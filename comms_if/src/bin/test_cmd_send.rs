//! Simple command sender test
//!
//! Sends a short sequence of drive commands to a running car executable,
//! useful for bench testing the UDP link without a joystick attached.

use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use structopt::StructOpt;

use comms_if::cmd::DriveCmd;

#[derive(StructOpt)]
#[structopt(name = "test_cmd_send", about = "Sends test drive commands over UDP")]
struct Opt {
    /// Address of the car's command socket
    #[structopt(long, default_value = "127.0.0.1:6789")]
    remote_addr: String,

    /// Time between commands in milliseconds
    #[structopt(long, default_value = "100")]
    period_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Opt::from_args();

    let socket = UdpSocket::bind("0.0.0.0:0")?;

    println!("Sending commands to {}", opt.remote_addr);

    // Ramp forward up and back down, then a steering sweep
    let mut cmds: Vec<DriveCmd> = Vec::new();

    for i in 0..=20 {
        cmds.push(DriveCmd {
            forward: (i as f64 - 10.0) / 10.0,
            lateral: 0.0,
        });
    }
    for i in 0..=20 {
        cmds.push(DriveCmd {
            forward: 0.0,
            lateral: (i as f64 - 10.0) / 10.0,
        });
    }

    // Finish on neutral so the car stops
    cmds.push(DriveCmd::default());

    for cmd in cmds {
        println!("F/B: {:+.2} L/R: {:+.2}", cmd.forward, cmd.lateral);
        socket.send_to(&cmd.to_datagram(), &opt.remote_addr)?;
        thread::sleep(Duration::from_millis(opt.period_ms));
    }

    Ok(())
}

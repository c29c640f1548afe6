//! Device-side sink: prints what a device driver would be told.
//!
//! Run with:
//!   cargo run --example device-sink
//!
//! In another terminal:
//!   cargo run -- send linear 0.5 40 --device 1 --motor 1 --repeat 20 --interval-ms 5

use std::thread;
use std::time::Duration;

use motionrelay::{Action, Command, Relay, RelayConfig};

/// Device drivers take milliseconds and unit-range intensities.
fn drive(command: Command) {
    let device = command.device;
    let motor = command.motor;
    match command.action {
        Action::Linear { .. } => {
            let duration_ms = command.action.duration_ms().unwrap_or(0);
            eprintln!(
                "[sink] linear device={device} motor={motor} position={:.2} over {duration_ms}ms",
                command.scalar()
            );
        }
        Action::Vibrate { .. } => {
            eprintln!(
                "[sink] vibrate device={device} motor={motor} intensity={:.2}",
                command.scalar()
            );
        }
        Action::Rotate { clockwise, .. } => {
            eprintln!(
                "[sink] rotate device={device} motor={motor} speed={:.2} clockwise={clockwise}",
                command.scalar()
            );
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut relay = Relay::start(RelayConfig::device(), drive)?;
    eprintln!(
        "Listening on {}, replies go to {}",
        relay.local_addr(),
        relay.destination()
    );

    thread::sleep(Duration::from_secs(30));

    relay.stop();
    eprintln!("[sink] stats: {:?}", relay.stats());
    Ok(())
}

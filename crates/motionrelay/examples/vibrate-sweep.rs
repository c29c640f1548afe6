//! Sweep vibration speed from a source relay into a device relay in-process.
//!
//! Run with:
//!   cargo run --example vibrate-sweep
//!
//! The source sends far faster than the device flushes, so most steps are
//! coalesced away and the sink only sees a handful of speeds.

use std::thread;
use std::time::Duration;

use motionrelay::transport::EndpointConfig;
use motionrelay::{Command, Relay, RelayConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Ephemeral ports so the example never collides with a running device.
    let mut device = Relay::start(
        RelayConfig::device().with_endpoint(EndpointConfig::device().with_listen_port(0)),
        |command: Command| eprintln!("[device] {:?} -> {:.2}", command.target(), command.scalar()),
    )?;
    let mut source = Relay::start(
        RelayConfig::source().with_endpoint(
            EndpointConfig::source()
                .with_listen_port(0)
                .with_send_port(device.local_addr().port()),
        ),
        |_command: Command| {},
    )?;

    for step in 0..=100u8 {
        source.send_vibrate_to(1, 0, f32::from(step));
        source.send_rotate_to(1, 1, f32::from(100 - step), step % 2 == 0);
        thread::sleep(Duration::from_millis(2));
    }
    thread::sleep(Duration::from_millis(100));

    source.stop();
    device.stop();

    let stats = device.stats();
    eprintln!(
        "received={} coalesced={} flushes={} emitted={}",
        stats.transport.datagrams_received,
        stats.scheduler.commands_coalesced,
        stats.scheduler.flushes,
        stats.scheduler.commands_emitted
    );
    Ok(())
}

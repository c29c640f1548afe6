use std::sync::Arc;
use std::thread;
use std::time::Duration;

use motionrelay_frame::Command;
use motionrelay_relay::CommandSender;
use motionrelay_transport::{EndpointConfig, QueueConfig, UdpTransport};
use tracing::debug;

use crate::cmd::{SendAction, SendArgs};
use crate::exit::{transport_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let options = args.action.options();

    // Ephemeral listen port unless one is given, so `send` can run next to a
    // process that already owns the source port.
    let endpoint = options
        .endpoint
        .resolve(EndpointConfig::source().with_listen_port(0));
    let transport = UdpTransport::bind(&endpoint, QueueConfig::default().with_capacity(1))
        .map_err(|err| transport_error("bind failed", err))?;
    let sender = CommandSender::new(Arc::new(transport));

    let command = build_command(&args.action);
    let interval = Duration::from_millis(options.interval_ms);
    for i in 0..options.repeat {
        if i > 0 && !interval.is_zero() {
            thread::sleep(interval);
        }
        sender.send(&command);
    }

    let stats = sender.transport().stats();
    debug!(
        destination = %sender.transport().destination(),
        sent = stats.datagrams_sent,
        send_errors = stats.send_errors,
        "send finished"
    );

    Ok(SUCCESS)
}

fn build_command(action: &SendAction) -> Command {
    match action {
        SendAction::Linear(args) => Command::linear(
            args.options.device,
            args.options.motor,
            args.duration,
            args.position,
        ),
        SendAction::Vibrate(args) => {
            Command::vibrate(args.options.device, args.options.motor, args.speed)
        }
        SendAction::Rotate(args) => Command::rotate(
            args.options.device,
            args.options.motor,
            args.speed,
            args.clockwise,
        ),
    }
}

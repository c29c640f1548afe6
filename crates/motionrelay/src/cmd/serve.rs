use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use motionrelay_frame::Command;
use motionrelay_relay::{Relay, RelayConfig};
use motionrelay_transport::{EndpointConfig, QueueConfig};
use tracing::info;

use crate::cmd::ServeArgs;
use crate::exit::{relay_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_command, OutputFormat};

/// How often the print loop re-checks the Ctrl-C flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = RelayConfig::device()
        .with_endpoint(args.endpoint.resolve(EndpointConfig::device()))
        .with_queue(
            QueueConfig::default()
                .with_capacity(args.queue_capacity)
                .with_overflow(args.overflow.into()),
        )
        .with_poll_interval(Duration::from_millis(args.poll_ms))
        .with_flush_rate(args.flush_hz);

    // The listener runs on the scheduler thread; printing stays on this one.
    let (tx, rx) = crossbeam_channel::unbounded::<Command>();
    let mut relay = Relay::start(config, move |command: Command| {
        let _ = tx.send(command);
    })
    .map_err(|err| relay_error("start failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let outcome = print_until(&rx, &running, args.count, |command| {
        print_command(command, format)
    });

    relay.stop();
    let stats = relay.stats();
    info!(
        printed = outcome.as_ref().copied().unwrap_or_default(),
        datagrams_received = stats.transport.datagrams_received,
        datagrams_dropped = stats.transport.datagrams_dropped,
        frames_rejected = stats.scheduler.frames_rejected,
        commands_coalesced = stats.scheduler.commands_coalesced,
        flushes = stats.scheduler.flushes,
        "relay stopped"
    );

    outcome.map(|_| SUCCESS)
}

/// Hand flushed commands to `print` until Ctrl-C, `count` or the scheduler
/// thread going away. Returns how many were printed.
fn print_until<F>(
    rx: &Receiver<Command>,
    running: &AtomicBool,
    count: Option<usize>,
    mut print: F,
) -> CliResult<usize>
where
    F: FnMut(&Command),
{
    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        if count.is_some_and(|count| printed >= count) {
            break;
        }

        let command = match rx.recv_timeout(SHUTDOWN_POLL) {
            Ok(command) => command,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(CliError::new(
                    FAILURE,
                    format!("relay scheduler stopped after {printed} commands"),
                ));
            }
        };

        print(&command);
        printed = printed.saturating_add(1);
    }
    Ok(printed)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

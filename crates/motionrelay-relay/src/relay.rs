use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use motionrelay_transport::{TransportStatsSnapshot, UdpTransport};
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::listener::CommandListener;
use crate::scheduler::{CoalescingScheduler, SchedulerStats, SchedulerStatsSnapshot};
use crate::sender::CommandSender;

const SCHEDULER_THREAD_NAME: &str = "motionrelay-scheduler";

/// Lifecycle of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Running,
    Stopped,
}

/// Combined transport and scheduler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub transport: TransportStatsSnapshot,
    pub scheduler: SchedulerStatsSnapshot,
}

/// One transport plus the scheduler thread draining it.
///
/// The host constructs and owns the relay; there is no global instance. A
/// relay exists only in the `Running` state after a successful start and
/// moves to `Stopped` on [`Relay::stop`] or drop.
pub struct Relay {
    transport: Arc<UdpTransport>,
    sender: CommandSender,
    running: Arc<AtomicBool>,
    scheduler_thread: Option<JoinHandle<()>>,
    scheduler_stats: Arc<SchedulerStats>,
    config: RelayConfig,
}

impl Relay {
    /// Bind the transport and start the scheduler thread.
    ///
    /// `listener` is moved onto the scheduler thread and called there for
    /// every flushed command. Transport failures are returned as-is and are
    /// never retried.
    pub fn start<L>(config: RelayConfig, listener: L) -> Result<Self>
    where
        L: CommandListener + 'static,
    {
        let transport = Arc::new(UdpTransport::bind(&config.endpoint, config.queue)?);

        let mut scheduler = CoalescingScheduler::new(config.flush_interval, Instant::now());
        let scheduler_stats = scheduler.stats();
        let running = Arc::new(AtomicBool::new(true));

        let thread_transport = Arc::clone(&transport);
        let thread_running = Arc::clone(&running);
        let poll_interval = config.poll_interval;
        let spawned = thread::Builder::new()
            .name(SCHEDULER_THREAD_NAME.to_string())
            .spawn(move || {
                let mut listener = listener;
                debug!("scheduler loop started");
                while thread_running.load(Ordering::Acquire) {
                    scheduler.tick(Instant::now(), &*thread_transport, &mut listener);
                    thread::sleep(poll_interval);
                }
                debug!("scheduler loop exited");
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                transport.stop();
                return Err(RelayError::Spawn(err));
            }
        };

        info!(
            local_addr = %transport.local_addr(),
            destination = %transport.destination(),
            flush_interval = ?config.flush_interval,
            poll_interval = ?config.poll_interval,
            "relay started"
        );

        Ok(Self {
            sender: CommandSender::new(Arc::clone(&transport)),
            transport,
            running,
            scheduler_thread: Some(handle),
            scheduler_stats,
            config,
        })
    }

    /// Stop the scheduler thread, then the transport. Idempotent.
    ///
    /// Commands still pending at this point are discarded.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.scheduler_thread.take() {
            if handle.join().is_err() {
                warn!("scheduler thread panicked");
            }
            self.transport.stop();
            info!(local_addr = %self.transport.local_addr(), "relay stopped");
        }
    }

    /// `Running` while the scheduler thread is alive and not asked to stop.
    pub fn state(&self) -> RelayState {
        match &self.scheduler_thread {
            Some(handle) if self.running.load(Ordering::Acquire) && !handle.is_finished() => {
                RelayState::Running
            }
            _ => RelayState::Stopped,
        }
    }

    /// A sender sharing this relay's transport.
    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    pub fn send(&self, command: &motionrelay_frame::Command) {
        self.sender.send(command);
    }

    pub fn send_linear(&self, duration: f32, position: f32) {
        self.sender.send_linear(duration, position);
    }

    pub fn send_linear_to(&self, device: u8, motor: u8, duration: f32, position: f32) {
        self.sender.send_linear_to(device, motor, duration, position);
    }

    pub fn send_vibrate(&self, speed: f32) {
        self.sender.send_vibrate(speed);
    }

    pub fn send_vibrate_to(&self, device: u8, motor: u8, speed: f32) {
        self.sender.send_vibrate_to(device, motor, speed);
    }

    pub fn send_rotate(&self, speed: f32, clockwise: bool) {
        self.sender.send_rotate(speed, clockwise);
    }

    pub fn send_rotate_to(&self, device: u8, motor: u8, speed: f32, clockwise: bool) {
        self.sender.send_rotate_to(device, motor, speed, clockwise);
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            transport: self.transport.stats(),
            scheduler: self.scheduler_stats.snapshot(),
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn destination(&self) -> SocketAddr {
        self.transport.destination()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("local_addr", &self.local_addr())
            .field("destination", &self.destination())
            .field("state", &self.state())
            .finish()
    }
}

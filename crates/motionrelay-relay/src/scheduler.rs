use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use motionrelay_frame::try_decode_frame;
use motionrelay_transport::DatagramSource;
use tracing::{debug, trace};

use crate::listener::CommandListener;
use crate::pending::PendingSet;

/// Scheduler counters, readable from any thread.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    /// Datagrams that decoded into a command.
    pub frames_decoded: AtomicU64,
    /// Datagrams dropped because they were not a valid frame.
    pub frames_rejected: AtomicU64,
    /// Commands that replaced an earlier one for the same target.
    pub commands_coalesced: AtomicU64,
    /// Flushes that invoked the listener.
    pub flushes: AtomicU64,
    /// Commands handed to the listener.
    pub commands_emitted: AtomicU64,
}

impl SchedulerStats {
    pub fn snapshot(&self) -> SchedulerStatsSnapshot {
        SchedulerStatsSnapshot {
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            commands_coalesced: self.commands_coalesced.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            commands_emitted: self.commands_emitted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SchedulerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStatsSnapshot {
    pub frames_decoded: u64,
    pub frames_rejected: u64,
    pub commands_coalesced: u64,
    pub flushes: u64,
    pub commands_emitted: u64,
}

/// Merges decoded commands per target and flushes them at a fixed cadence.
///
/// The scheduler takes the current time as an argument instead of reading a
/// clock, so the relay thread drives it with `Instant::now()` and tests drive
/// it with synthetic instants.
#[derive(Debug)]
pub struct CoalescingScheduler {
    pending: PendingSet,
    flush_interval: Duration,
    last_flush: Instant,
    stats: Arc<SchedulerStats>,
}

impl CoalescingScheduler {
    /// Create a scheduler whose first coalescing window opens at `now`.
    pub fn new(flush_interval: Duration, now: Instant) -> Self {
        Self {
            pending: PendingSet::new(),
            flush_interval,
            last_flush: now,
            stats: Arc::new(SchedulerStats::default()),
        }
    }

    /// Decode one datagram and merge it into the pending set.
    ///
    /// Returns `false` if the datagram was rejected.
    pub fn ingest(&mut self, datagram: &[u8]) -> bool {
        match try_decode_frame(datagram) {
            Ok(command) => {
                self.stats.frames_decoded.fetch_add(1, Ordering::Relaxed);
                if self.pending.upsert(command).is_some() {
                    self.stats.commands_coalesced.fetch_add(1, Ordering::Relaxed);
                }
                true
            }
            Err(err) => {
                self.stats.frames_rejected.fetch_add(1, Ordering::Relaxed);
                trace!(len = datagram.len(), error = %err, "dropping malformed frame");
                false
            }
        }
    }

    /// Pop every datagram queued when the drain started and ingest it.
    ///
    /// Datagrams arriving during the drain wait for the next pass, so a
    /// flooding sender cannot keep the scheduler from flushing.
    /// Returns the number of datagrams that decoded.
    pub fn drain<S: DatagramSource + ?Sized>(&mut self, source: &S) -> usize {
        let queued = source.pending();
        let mut decoded = 0;
        for _ in 0..queued {
            let Some(datagram) = source.dequeue() else {
                break;
            };
            if self.ingest(&datagram) {
                decoded += 1;
            }
        }
        decoded
    }

    /// True once a full flush interval has passed since the last boundary.
    pub fn flush_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_flush) >= self.flush_interval
    }

    /// Emit the pending set if a flush boundary has been reached.
    ///
    /// An idle window (nothing pending) still advances the boundary but never
    /// calls the listener. Returns the number of commands emitted.
    pub fn maybe_flush<L: CommandListener + ?Sized>(
        &mut self,
        now: Instant,
        listener: &mut L,
    ) -> usize {
        if !self.flush_due(now) {
            return 0;
        }
        self.last_flush = now;

        if !self.pending.is_dirty() {
            return 0;
        }

        let mut emitted = 0;
        for (_, command) in self.pending.drain() {
            listener.on_command(command);
            emitted += 1;
        }

        self.stats.flushes.fetch_add(1, Ordering::Relaxed);
        self.stats
            .commands_emitted
            .fetch_add(emitted as u64, Ordering::Relaxed);
        debug!(emitted, "flushed pending commands");
        emitted
    }

    /// One scheduler iteration: drain, then flush if due.
    pub fn tick<S, L>(&mut self, now: Instant, source: &S, listener: &mut L) -> usize
    where
        S: DatagramSource + ?Sized,
        L: CommandListener + ?Sized,
    {
        self.drain(source);
        self.maybe_flush(now, listener)
    }

    pub fn pending(&self) -> &PendingSet {
        &self.pending
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Shared handle on the counters.
    pub fn stats(&self) -> Arc<SchedulerStats> {
        Arc::clone(&self.stats)
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

/// Transport counters, updated from the receive thread and senders.
///
/// All counters use relaxed atomics; a snapshot is consistent per counter,
/// not across counters.
#[derive(Debug, Default)]
pub struct TransportStats {
    /// Non-empty datagrams read from the socket.
    pub datagrams_received: AtomicU64,
    /// Datagrams discarded because the queue was full.
    pub datagrams_dropped: AtomicU64,
    /// Receive errors that were swallowed by the loop.
    pub recv_errors: AtomicU64,
    /// Datagrams handed to the socket successfully.
    pub datagrams_sent: AtomicU64,
    /// Send attempts that failed and were swallowed.
    pub send_errors: AtomicU64,
}

impl TransportStats {
    pub fn snapshot(&self) -> TransportStatsSnapshot {
        TransportStatsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            datagrams_dropped: self.datagrams_dropped.load(Ordering::Relaxed),
            recv_errors: self.recv_errors.load(Ordering::Relaxed),
            datagrams_sent: self.datagrams_sent.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`TransportStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStatsSnapshot {
    pub datagrams_received: u64,
    pub datagrams_dropped: u64,
    pub recv_errors: u64,
    pub datagrams_sent: u64,
    pub send_errors: u64,
}

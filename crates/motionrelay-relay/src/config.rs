use std::time::Duration;

use motionrelay_transport::{EndpointConfig, QueueConfig};

/// Default number of flushes per second.
pub const DEFAULT_FLUSH_RATE_HZ: u32 = 60;

/// Default sleep between two scheduler iterations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Everything needed to start a [`crate::Relay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Local listen port and remote send port.
    pub endpoint: EndpointConfig,
    /// Receive queue bounds.
    pub queue: QueueConfig,
    /// Sleep between drain passes.
    pub poll_interval: Duration,
    /// Minimum wall-clock time between two flushes.
    pub flush_interval: Duration,
}

impl RelayConfig {
    /// Device side defaults: listen on 15601, send to 15600.
    pub fn device() -> Self {
        Self {
            endpoint: EndpointConfig::device(),
            queue: QueueConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            flush_interval: flush_interval_for(DEFAULT_FLUSH_RATE_HZ),
        }
    }

    /// Motion-source side defaults: listen on 15600, send to 15601.
    pub fn source() -> Self {
        Self {
            endpoint: EndpointConfig::source(),
            ..Self::device()
        }
    }

    pub fn with_endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_queue(mut self, queue: QueueConfig) -> Self {
        self.queue = queue;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Set the flush cadence in flushes per second. Zero is treated as one.
    pub fn with_flush_rate(self, hz: u32) -> Self {
        self.with_flush_interval(flush_interval_for(hz))
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::device()
    }
}

fn flush_interval_for(hz: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(hz.max(1)))
}

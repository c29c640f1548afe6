//! Command relay between a motion source and a device sink.
//!
//! A [`Relay`] owns one transport and one scheduler thread. The scheduler
//! drains raw datagrams, decodes them, keeps only the latest command per
//! target and hands that set to a [`CommandListener`] at a fixed cadence.
//! The same relay also exposes the encode-and-send entry points used by the
//! sending side.

pub mod config;
pub mod error;
pub mod listener;
pub mod pending;
pub mod relay;
pub mod scheduler;
pub mod sender;

pub use config::{RelayConfig, DEFAULT_FLUSH_RATE_HZ, DEFAULT_POLL_INTERVAL};
pub use error::{RelayError, Result};
pub use listener::CommandListener;
pub use pending::PendingSet;
pub use relay::{Relay, RelayState, RelayStats};
pub use scheduler::{CoalescingScheduler, SchedulerStats, SchedulerStatsSnapshot};
pub use sender::CommandSender;

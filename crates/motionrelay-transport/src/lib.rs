//! Best-effort UDP datagram transport.
//!
//! Owns one socket bound on the local listen port and a fixed send
//! destination. A dedicated thread blocks in `recv_from` and pushes raw
//! datagrams into a bounded queue; consumers pop them without blocking.
//!
//! Delivery is at-most-once and unordered. Nothing here retries, acknowledges
//! or reports per-datagram failures; counters in [`TransportStats`] are the
//! only trace of loss.

pub mod config;
pub mod error;
pub mod stats;
pub mod traits;
pub mod udp;

pub use config::{
    EndpointConfig, OverflowPolicy, QueueConfig, DEFAULT_BIND_ADDRESS, DEFAULT_QUEUE_CAPACITY,
    DEVICE_LISTEN_PORT, SOURCE_LISTEN_PORT,
};
pub use error::{Result, TransportError};
pub use stats::{TransportStats, TransportStatsSnapshot};
pub use traits::DatagramSource;
pub use udp::UdpTransport;

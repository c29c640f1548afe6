use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::error::{Result, TransportError};

/// Loopback peer address both relay endpoints use by default.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Port the device side listens on (and the motion source sends to).
pub const DEVICE_LISTEN_PORT: u16 = 15601;

/// Port the motion source listens on (and the device side sends to).
pub const SOURCE_LISTEN_PORT: u16 = 15600;

/// Default capacity of the receive queue, in datagrams.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Where a transport listens and where it sends.
///
/// The two relay endpoints use swapped ports: each listens on the port the
/// other one sends to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// IP literal of the peer; only the send destination uses it. The
    /// receive socket always binds the unspecified address of the same family.
    pub bind_address: String,
    /// Local port for the receive socket. `0` picks an ephemeral port.
    pub listen_port: u16,
    /// Remote port datagrams are sent to.
    pub send_port: u16,
}

impl EndpointConfig {
    /// Device-side endpoint: listens on 15601, sends to 15600.
    pub fn device() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            listen_port: DEVICE_LISTEN_PORT,
            send_port: SOURCE_LISTEN_PORT,
        }
    }

    /// Motion-source endpoint: listens on 15600, sends to 15601.
    pub fn source() -> Self {
        Self::device().swapped()
    }

    /// The mirror endpoint of this one (listen and send ports exchanged).
    pub fn swapped(&self) -> Self {
        Self {
            bind_address: self.bind_address.clone(),
            listen_port: self.send_port,
            send_port: self.listen_port,
        }
    }

    pub fn with_bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = address.into();
        self
    }

    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    pub fn with_send_port(mut self, port: u16) -> Self {
        self.send_port = port;
        self
    }

    /// Parse the peer address.
    pub fn ip(&self) -> Result<IpAddr> {
        self.bind_address
            .trim()
            .parse()
            .map_err(|source| TransportError::InvalidAddress {
                address: self.bind_address.clone(),
                source,
            })
    }

    /// Address of the local receive socket: every interface, `listen_port`.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let any = match self.ip()? {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        Ok(SocketAddr::new(any, self.listen_port))
    }

    /// Fixed destination for outgoing datagrams.
    pub fn send_addr(&self) -> Result<SocketAddr> {
        Ok(SocketAddr::new(self.ip()?, self.send_port))
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::device()
    }
}

/// What the receive loop does when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest queued datagram to make room for the new one.
    #[default]
    DropOldest,
    /// Discard the incoming datagram and keep the queue as is.
    DropNewest,
}

/// Receive queue bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of queued datagrams. Values below 1 are treated as 1.
    pub capacity: usize,
    /// Behavior when `capacity` is reached.
    pub overflow: OverflowPolicy,
}

impl QueueConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub(crate) fn effective_capacity(&self) -> usize {
        self.capacity.max(1)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_and_source_ports_are_swapped() {
        let device = EndpointConfig::device();
        let source = EndpointConfig::source();
        assert_eq!(device.listen_port, source.send_port);
        assert_eq!(device.send_port, source.listen_port);
        assert_eq!(device.swapped(), source);
    }

    #[test]
    fn resolves_listen_and_send_addresses() {
        let config = EndpointConfig::device();
        assert_eq!(
            config.listen_addr().unwrap(),
            "0.0.0.0:15601".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            config.send_addr().unwrap(),
            "127.0.0.1:15600".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn peer_address_only_affects_destination() {
        let config = EndpointConfig::device().with_bind_address("192.0.2.10");
        assert_eq!(
            config.listen_addr().unwrap(),
            "0.0.0.0:15601".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            config.send_addr().unwrap(),
            "192.0.2.10:15600".parse::<SocketAddr>().unwrap()
        );

        let v6 = EndpointConfig::device().with_bind_address("::1");
        assert_eq!(
            v6.listen_addr().unwrap(),
            "[::]:15601".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn rejects_non_ip_bind_address() {
        let config = EndpointConfig::device().with_bind_address("not-an-ip");
        assert!(matches!(
            config.ip(),
            Err(TransportError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(
            QueueConfig::default().with_capacity(0).effective_capacity(),
            1
        );
    }
}

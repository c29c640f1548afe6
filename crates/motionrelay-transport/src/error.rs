use std::net::SocketAddr;

/// Errors that can occur while setting up the transport.
///
/// Steady-state failures (receive and send) never surface here; they are
/// counted in [`crate::TransportStats`] and swallowed.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The configured bind address is not an IP literal.
    #[error("invalid bind address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },

    /// Failed to bind the receive socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to start the receive thread.
    #[error("failed to spawn receive thread: {0}")]
    Spawn(std::io::Error),

    /// An I/O error occurred while configuring the socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

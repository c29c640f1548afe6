/// Errors that can occur while starting a relay.
///
/// Only initialization fails loudly. Malformed or lost datagrams after start
/// are absorbed and show up in [`crate::RelayStats`] only.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The transport could not be initialized.
    #[error("transport error: {0}")]
    Transport(#[from] motionrelay_transport::TransportError),

    /// The scheduler thread could not be started.
    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(std::io::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;

use crate::kind::CommandKind;

/// Reasons a datagram was rejected by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The buffer is too short to carry the fixed header.
    #[error("frame header incomplete ({len} bytes, need {min})")]
    HeaderTooShort { len: usize, min: usize },

    /// The buffer is shorter than the minimum length for its kind.
    #[error("{kind} frame truncated ({len} bytes, need {min})")]
    Truncated {
        kind: CommandKind,
        len: usize,
        min: usize,
    },

    /// The kind tag is not one of the known command kinds.
    #[error("unknown command kind tag {0}")]
    UnknownKind(u8),
}

pub type Result<T> = std::result::Result<T, FrameError>;

//! Fixed binary frames for motion commands.
//!
//! Every datagram carries exactly one command:
//! - a 1-byte declared length (informational)
//! - a 1-byte kind tag (linear, vibrate, rotate)
//! - a 1-byte device id and a 1-byte motor id (0 addresses all)
//! - little-endian `f32` parameters whose count depends on the kind
//!
//! Decoding never fails loudly: a buffer that cannot be a command is noise on
//! an unreliable transport and simply yields `None`.

pub mod codec;
pub mod error;
pub mod kind;

pub use codec::{
    decode_frame, encode_frame, try_decode_frame, Action, Command, TargetKey, DEVICE_ALL,
    HEADER_SIZE, MOTOR_ALL,
};
pub use error::{FrameError, Result};
pub use kind::{CommandKind, LINEAR, ROTATE, VIBRATE};

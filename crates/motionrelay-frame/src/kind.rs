//! Command kind tags.
//!
//! The tag occupies byte 1 of every frame. Each kind fixes both the
//! parameter layout and the minimum frame length.

use std::fmt;

use crate::error::FrameError;

/// Tag for a linear move: `[duration, position]`.
pub const LINEAR: u8 = 0;

/// Tag for a vibration: `[speed]`.
pub const VIBRATE: u8 = 1;

/// Tag for a rotation: `[speed, clockwise]`.
pub const ROTATE: u8 = 2;

/// The three command kinds understood on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CommandKind {
    Linear = LINEAR,
    Vibrate = VIBRATE,
    Rotate = ROTATE,
}

impl CommandKind {
    /// Wire tag for this kind.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Smallest buffer that can hold a frame of this kind.
    pub fn min_frame_len(self) -> usize {
        match self {
            CommandKind::Linear => 12,
            CommandKind::Vibrate => 8,
            CommandKind::Rotate => 9,
        }
    }

    /// Number of numeric parameters a command of this kind carries.
    pub fn param_count(self) -> usize {
        match self {
            CommandKind::Linear | CommandKind::Rotate => 2,
            CommandKind::Vibrate => 1,
        }
    }

    /// Lowercase name used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Linear => "linear",
            CommandKind::Vibrate => "vibrate",
            CommandKind::Rotate => "rotate",
        }
    }
}

impl TryFrom<u8> for CommandKind {
    type Error = FrameError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            LINEAR => Ok(CommandKind::Linear),
            VIBRATE => Ok(CommandKind::Vibrate),
            ROTATE => Ok(CommandKind::Rotate),
            other => Err(FrameError::UnknownKind(other)),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

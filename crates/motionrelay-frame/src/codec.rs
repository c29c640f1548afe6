use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::kind::CommandKind;

/// Fixed header: length (1) + kind (1) + device (1) + motor (1) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Device id addressing every device the sink manages.
pub const DEVICE_ALL: u8 = 0;

/// Motor id addressing every motor of the addressed device(s).
pub const MOTOR_ALL: u8 = 0;

/// Offset of the kind tag; the smallest prefix that still identifies a kind.
const KIND_OFFSET: usize = 1;

/// What a command asks the device to do, with kind-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Move to `position` (0-100) over `duration` seconds.
    Linear { duration: f32, position: f32 },
    /// Vibrate at `speed` (0-100).
    Vibrate { speed: f32 },
    /// Rotate at `speed` (0-100) in the given direction.
    Rotate { speed: f32, clockwise: bool },
}

impl Action {
    /// The wire kind of this action.
    pub fn kind(&self) -> CommandKind {
        match self {
            Action::Linear { .. } => CommandKind::Linear,
            Action::Vibrate { .. } => CommandKind::Vibrate,
            Action::Rotate { .. } => CommandKind::Rotate,
        }
    }

    /// Linear move duration in whole milliseconds, `None` for other kinds.
    ///
    /// Negative and NaN durations clamp to zero.
    pub fn duration_ms(&self) -> Option<u32> {
        match self {
            Action::Linear { duration, .. } => Some((duration * 1000.0) as u32),
            _ => None,
        }
    }
}

/// One decoded motion command addressed to a device/motor pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    /// Target device, [`DEVICE_ALL`] for every device.
    pub device: u8,
    /// Target motor, [`MOTOR_ALL`] for every motor.
    pub motor: u8,
    /// The requested action.
    pub action: Action,
}

impl Command {
    /// Create a linear move command.
    pub fn linear(device: u8, motor: u8, duration: f32, position: f32) -> Self {
        Self {
            device,
            motor,
            action: Action::Linear { duration, position },
        }
    }

    /// Create a vibrate command.
    pub fn vibrate(device: u8, motor: u8, speed: f32) -> Self {
        Self {
            device,
            motor,
            action: Action::Vibrate { speed },
        }
    }

    /// Create a rotate command.
    pub fn rotate(device: u8, motor: u8, speed: f32, clockwise: bool) -> Self {
        Self {
            device,
            motor,
            action: Action::Rotate { speed, clockwise },
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.action.kind()
    }

    /// The coalescing slot this command occupies.
    pub fn target(&self) -> TargetKey {
        TargetKey {
            kind: self.kind(),
            device: self.device,
            motor: self.motor,
        }
    }

    /// Parameters in wire order; the length always equals `kind().param_count()`.
    pub fn params(&self) -> Vec<f32> {
        match self.action {
            Action::Linear { duration, position } => vec![duration, position],
            Action::Vibrate { speed } => vec![speed],
            Action::Rotate { speed, clockwise } => vec![speed, if clockwise { 1.0 } else { 0.0 }],
        }
    }

    /// Position or speed mapped from the 0-100 wire range to 0.0-1.0.
    pub fn scalar(&self) -> f64 {
        let raw = match self.action {
            Action::Linear { position, .. } => position,
            Action::Vibrate { speed } | Action::Rotate { speed, .. } => speed,
        };
        f64::from(raw) / 100.0
    }

    /// True when the device or the motor is the ALL sentinel.
    pub fn is_broadcast(&self) -> bool {
        self.device == DEVICE_ALL || self.motor == MOTOR_ALL
    }

    /// Encoded length of this command on the wire.
    pub fn wire_size(&self) -> usize {
        self.kind().min_frame_len()
    }

    /// Encode into a standalone buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_frame(self, &mut buf);
        buf.freeze()
    }
}

/// Identifies a coalescing slot: at most one pending command per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey {
    pub kind: CommandKind,
    pub device: u8,
    pub motor: u8,
}

/// Encode a command into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬────────┬────────┬────────┬──────────────────────────┐
/// │ Length │ Kind   │ Device │ Motor  │ Params                   │
/// │ (1B)   │ (1B)   │ (1B)   │ (1B)   │ linear:  f32 LE, f32 LE  │
/// │        │        │        │        │ vibrate: f32 LE          │
/// │        │        │        │        │ rotate:  f32 LE, u8      │
/// └────────┴────────┴────────┴────────┴──────────────────────────┘
/// ```
///
/// The length byte is set to the number of bytes actually written.
pub fn encode_frame(command: &Command, dst: &mut BytesMut) {
    let size = command.wire_size();
    dst.reserve(size);
    // every frame size fits in one byte
    dst.put_u8(size as u8);
    dst.put_u8(command.kind().tag());
    dst.put_u8(command.device);
    dst.put_u8(command.motor);
    match command.action {
        Action::Linear { duration, position } => {
            dst.put_f32_le(duration);
            dst.put_f32_le(position);
        }
        Action::Vibrate { speed } => dst.put_f32_le(speed),
        Action::Rotate { speed, clockwise } => {
            dst.put_f32_le(speed);
            dst.put_u8(u8::from(clockwise));
        }
    }
}

/// Decode a command, reporting why a buffer was rejected.
///
/// The declared length byte is informational only. Buffers longer than the
/// kind's minimum are accepted and trailing bytes are ignored.
pub fn try_decode_frame(src: &[u8]) -> Result<Command> {
    if src.len() <= KIND_OFFSET {
        return Err(FrameError::HeaderTooShort {
            len: src.len(),
            min: HEADER_SIZE,
        });
    }

    let kind = CommandKind::try_from(src[KIND_OFFSET])?;
    let min = kind.min_frame_len();
    if src.len() < min {
        return Err(FrameError::Truncated {
            kind,
            len: src.len(),
            min,
        });
    }

    let mut buf = &src[..min];
    let _declared_len = buf.get_u8();
    let _tag = buf.get_u8();
    let device = buf.get_u8();
    let motor = buf.get_u8();

    let action = match kind {
        CommandKind::Linear => Action::Linear {
            duration: buf.get_f32_le(),
            position: buf.get_f32_le(),
        },
        CommandKind::Vibrate => Action::Vibrate {
            speed: buf.get_f32_le(),
        },
        CommandKind::Rotate => Action::Rotate {
            speed: buf.get_f32_le(),
            clockwise: buf.get_u8() != 0,
        },
    };

    Ok(Command {
        device,
        motor,
        action,
    })
}

/// Decode a command, or `None` if the buffer is not a valid frame.
pub fn decode_frame(src: &[u8]) -> Option<Command> {
    try_decode_frame(src).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() <= f32::EPSILON, "{a} != {b}");
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let commands = [
            Command::linear(0, 0, 0.5, 40.0),
            Command::linear(3, 2, 1.25, 99.5),
            Command::vibrate(1, 0, 75.0),
            Command::vibrate(255, 255, 0.0),
            Command::rotate(2, 1, 33.3, true),
            Command::rotate(0, 0, 100.0, false),
        ];

        for command in commands {
            let bytes = command.to_bytes();
            let decoded = decode_frame(&bytes).expect("encoded frame should decode");
            assert_eq!(decoded.kind(), command.kind());
            assert_eq!(decoded.device, command.device);
            assert_eq!(decoded.motor, command.motor);
            for (got, want) in decoded.params().iter().zip(command.params()) {
                assert_close(*got, want);
            }
        }
    }

    #[test]
    fn test_length_byte_matches_encoded_size() {
        assert_eq!(Command::linear(0, 0, 1.0, 1.0).to_bytes()[0], 12);
        assert_eq!(Command::vibrate(0, 0, 1.0).to_bytes()[0], 8);
        assert_eq!(Command::rotate(0, 0, 1.0, true).to_bytes()[0], 9);
    }

    #[test]
    fn test_wire_layout() {
        let bytes = Command::linear(4, 7, 0.5, 40.0).to_bytes();
        assert_eq!(&bytes[..4], &[12u8, 0, 4, 7]);
        assert_eq!(&bytes[4..8], &0.5f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &40.0f32.to_le_bytes());

        let bytes = Command::rotate(1, 2, 10.0, true).to_bytes();
        assert_eq!(&bytes[..4], &[9u8, 2, 1, 2]);
        assert_eq!(bytes[8], 1);
    }

    #[test]
    fn test_decode_rejects_short_vibrate() {
        let buf = [3u8, 1, 1];
        assert!(decode_frame(&buf).is_none());
        assert_eq!(
            try_decode_frame(&buf),
            Err(FrameError::Truncated {
                kind: CommandKind::Vibrate,
                len: 3,
                min: 8
            })
        );
    }

    #[test]
    fn test_decode_rejects_below_minimum_per_kind() {
        let linear = Command::linear(1, 1, 1.0, 1.0).to_bytes();
        assert!(decode_frame(&linear[..11]).is_none());

        let rotate = Command::rotate(1, 1, 1.0, true).to_bytes();
        assert!(decode_frame(&rotate[..8]).is_none());

        let vibrate = Command::vibrate(1, 1, 1.0).to_bytes();
        assert!(decode_frame(&vibrate[..7]).is_none());
    }

    #[test]
    fn test_decode_rejects_empty_and_tagless() {
        assert!(decode_frame(&[]).is_none());
        assert!(matches!(
            try_decode_frame(&[8]),
            Err(FrameError::HeaderTooShort { len: 1, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let mut buf = Command::linear(1, 1, 1.0, 1.0).to_bytes().to_vec();
        buf[1] = 9;
        assert_eq!(try_decode_frame(&buf), Err(FrameError::UnknownKind(9)));
    }

    #[test]
    fn test_declared_length_is_not_validated() {
        let mut buf = Command::vibrate(2, 1, 10.0).to_bytes().to_vec();
        buf[0] = 200;
        let decoded = decode_frame(&buf).expect("declared length is informational");
        assert_eq!(decoded, Command::vibrate(2, 1, 10.0));
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let mut buf = Command::vibrate(2, 1, 10.0).to_bytes().to_vec();
        buf.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(decode_frame(&buf), Some(Command::vibrate(2, 1, 10.0)));
    }

    #[test]
    fn test_nonzero_clockwise_byte_means_clockwise() {
        let mut buf = Command::rotate(1, 1, 50.0, false).to_bytes().to_vec();
        buf[8] = 7;
        let decoded = decode_frame(&buf).unwrap();
        assert_eq!(
            decoded.action,
            Action::Rotate {
                speed: 50.0,
                clockwise: true
            }
        );
        assert_eq!(decoded.params(), vec![50.0, 1.0]);
    }

    #[test]
    fn test_target_key_separates_kinds() {
        let linear = Command::linear(1, 1, 1.0, 1.0);
        let vibrate = Command::vibrate(1, 1, 1.0);
        assert_ne!(linear.target(), vibrate.target());
        assert_eq!(vibrate.target(), Command::vibrate(1, 1, 50.0).target());
    }

    #[test]
    fn test_sink_helpers() {
        let linear = Command::linear(0, 0, 0.5, 40.0);
        assert_eq!(linear.action.duration_ms(), Some(500));
        assert!((linear.scalar() - 0.4).abs() < 1e-6);
        assert!(linear.is_broadcast());

        let vibrate = Command::vibrate(2, 1, 10.0);
        assert_eq!(vibrate.action.duration_ms(), None);
        assert!(!vibrate.is_broadcast());
        assert_eq!(Command::linear(0, 0, -1.0, 0.0).action.duration_ms(), Some(0));
    }
}

use std::sync::Arc;

use bytes::BytesMut;
use motionrelay_frame::{encode_frame, Command, DEVICE_ALL, MOTOR_ALL};
use motionrelay_transport::UdpTransport;
use tracing::trace;

/// Encode-and-send entry points for the motion source.
///
/// Cheap to clone; every clone sends through the same transport. Sends are
/// fire-and-forget like the transport beneath them.
#[derive(Debug, Clone)]
pub struct CommandSender {
    transport: Arc<UdpTransport>,
}

impl CommandSender {
    pub fn new(transport: Arc<UdpTransport>) -> Self {
        Self { transport }
    }

    /// Encode and send one command.
    pub fn send(&self, command: &Command) {
        let mut buf = BytesMut::with_capacity(command.wire_size());
        encode_frame(command, &mut buf);
        trace!(
            kind = %command.kind(),
            device = command.device,
            motor = command.motor,
            "sending command"
        );
        self.transport.send(&buf);
    }

    /// Linear move on every device and motor.
    pub fn send_linear(&self, duration: f32, position: f32) {
        self.send_linear_to(DEVICE_ALL, MOTOR_ALL, duration, position);
    }

    pub fn send_linear_to(&self, device: u8, motor: u8, duration: f32, position: f32) {
        self.send(&Command::linear(device, motor, duration, position));
    }

    /// Vibration on every device and motor.
    pub fn send_vibrate(&self, speed: f32) {
        self.send_vibrate_to(DEVICE_ALL, MOTOR_ALL, speed);
    }

    pub fn send_vibrate_to(&self, device: u8, motor: u8, speed: f32) {
        self.send(&Command::vibrate(device, motor, speed));
    }

    /// Rotation on every device and motor.
    pub fn send_rotate(&self, speed: f32, clockwise: bool) {
        self.send_rotate_to(DEVICE_ALL, MOTOR_ALL, speed, clockwise);
    }

    pub fn send_rotate_to(&self, device: u8, motor: u8, speed: f32, clockwise: bool) {
        self.send(&Command::rotate(device, motor, speed, clockwise));
    }

    pub fn transport(&self) -> &UdpTransport {
        &self.transport
    }
}

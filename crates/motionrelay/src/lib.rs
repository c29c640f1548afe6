//! Relay motion, vibration and rotation commands between two processes.
//!
//! A motion source encodes commands into tiny fixed frames and sends them
//! over UDP; the device side receives them, keeps the latest command per
//! target and hands the coalesced set to a device sink at a fixed rate.
//!
//! # Crate Structure
//!
//! - [`frame`]: Wire codec for linear, vibrate and rotate frames
//! - [`transport`]: UDP socket, background receive loop, bounded queue
//! - [`relay`]: Coalescing scheduler, listener and send entry points

/// Re-export frame types.
pub mod frame {
    pub use motionrelay_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use motionrelay_transport::*;
}

/// Re-export relay types.
pub mod relay {
    pub use motionrelay_relay::*;
}

pub use motionrelay_frame::{Action, Command, CommandKind};
pub use motionrelay_relay::{CommandListener, CommandSender, Relay, RelayConfig, RelayState};

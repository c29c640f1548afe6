use clap::{Args, Subcommand, ValueEnum};
use motionrelay_transport::{EndpointConfig, OverflowPolicy};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the device side and print coalesced commands.
    Serve(ServeArgs),
    /// Send commands as the motion source.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Version(args) => version::run(args),
    }
}

/// Socket addressing shared by every networked subcommand.
#[derive(Args, Debug, Default)]
pub struct EndpointArgs {
    /// Peer IP address to send to. The listen socket binds every interface.
    #[arg(long = "bind", value_name = "ADDR", env = "MOTIONRELAY_BIND")]
    pub bind_address: Option<String>,
    /// Local port to receive on.
    #[arg(long, value_name = "PORT", env = "MOTIONRELAY_LISTEN_PORT")]
    pub listen_port: Option<u16>,
    /// Remote port to send to.
    #[arg(long, value_name = "PORT", env = "MOTIONRELAY_SEND_PORT")]
    pub send_port: Option<u16>,
}

impl EndpointArgs {
    /// Apply the flags that were given on top of `defaults`.
    pub fn resolve(&self, defaults: EndpointConfig) -> EndpointConfig {
        let mut endpoint = defaults;
        if let Some(address) = &self.bind_address {
            endpoint = endpoint.with_bind_address(address.clone());
        }
        if let Some(port) = self.listen_port {
            endpoint = endpoint.with_listen_port(port);
        }
        if let Some(port) = self.send_port {
            endpoint = endpoint.with_send_port(port);
        }
        endpoint
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum OverflowArg {
    #[default]
    DropOldest,
    DropNewest,
}

impl From<OverflowArg> for OverflowPolicy {
    fn from(arg: OverflowArg) -> Self {
        match arg {
            OverflowArg::DropOldest => OverflowPolicy::DropOldest,
            OverflowArg::DropNewest => OverflowPolicy::DropNewest,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,
    /// Exit after printing N commands.
    #[arg(long)]
    pub count: Option<usize>,
    /// Flushes per second.
    #[arg(long, default_value = "60")]
    pub flush_hz: u32,
    /// Sleep between scheduler passes, in milliseconds.
    #[arg(long, default_value = "16")]
    pub poll_ms: u64,
    /// Receive queue capacity, in datagrams.
    #[arg(long, default_value = "256")]
    pub queue_capacity: usize,
    /// What to drop when the receive queue is full.
    #[arg(long, value_enum, default_value = "drop-oldest")]
    pub overflow: OverflowArg,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(subcommand)]
    pub action: SendAction,
}

#[derive(Subcommand, Debug)]
pub enum SendAction {
    /// Move to a position over a duration.
    Linear(LinearArgs),
    /// Vibrate at a speed.
    Vibrate(VibrateArgs),
    /// Rotate at a speed.
    Rotate(RotateArgs),
}

impl SendAction {
    pub fn options(&self) -> &SendOptions {
        match self {
            SendAction::Linear(args) => &args.options,
            SendAction::Vibrate(args) => &args.options,
            SendAction::Rotate(args) => &args.options,
        }
    }
}

/// Target and pacing flags shared by every `send` action.
#[derive(Args, Debug)]
pub struct SendOptions {
    #[command(flatten)]
    pub endpoint: EndpointArgs,
    /// Target device (0 = all).
    #[arg(long, default_value = "0")]
    pub device: u8,
    /// Target motor (0 = all).
    #[arg(long, default_value = "0")]
    pub motor: u8,
    /// Number of times to send the command.
    #[arg(long, default_value = "1")]
    pub repeat: u32,
    /// Pause between repeated sends, in milliseconds.
    #[arg(long, default_value = "0")]
    pub interval_ms: u64,
}

#[derive(Args, Debug)]
pub struct LinearArgs {
    /// Move duration in seconds.
    pub duration: f32,
    /// Target position (0-100).
    pub position: f32,
    #[command(flatten)]
    pub options: SendOptions,
}

#[derive(Args, Debug)]
pub struct VibrateArgs {
    /// Vibration speed (0-100).
    pub speed: f32,
    #[command(flatten)]
    pub options: SendOptions,
}

#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Rotation speed (0-100).
    pub speed: f32,
    /// Rotate clockwise instead of counter-clockwise.
    #[arg(long)]
    pub clockwise: bool,
    #[command(flatten)]
    pub options: SendOptions,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_flags_override_defaults() {
        let args = EndpointArgs {
            bind_address: Some("0.0.0.0".to_string()),
            listen_port: None,
            send_port: Some(9000),
        };
        let endpoint = args.resolve(EndpointConfig::device());
        assert_eq!(endpoint.bind_address, "0.0.0.0");
        assert_eq!(endpoint.listen_port, 15601);
        assert_eq!(endpoint.send_port, 9000);
    }

    #[test]
    fn empty_endpoint_flags_keep_defaults() {
        let endpoint = EndpointArgs::default().resolve(EndpointConfig::source());
        assert_eq!(endpoint, EndpointConfig::source());
    }
}

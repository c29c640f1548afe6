use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use motionrelay_frame::{Action, Command};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct CommandOutput {
    kind: &'static str,
    device: u8,
    motor: u8,
    params: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clockwise: Option<bool>,
    broadcast: bool,
    timestamp: String,
}

impl CommandOutput {
    fn new(command: &Command) -> Self {
        let clockwise = match command.action {
            Action::Rotate { clockwise, .. } => Some(clockwise),
            _ => None,
        };
        Self {
            kind: command.kind().name(),
            device: command.device,
            motor: command.motor,
            params: command.params(),
            duration_ms: command.action.duration_ms(),
            clockwise,
            broadcast: command.is_broadcast(),
            timestamp: now_unix_seconds(),
        }
    }
}

pub fn print_command(command: &Command, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&CommandOutput::new(command))
                    .unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "DEVICE", "MOTOR", "PARAMS"])
                .add_row(vec![
                    command.kind().name().to_string(),
                    target_label(command.device),
                    target_label(command.motor),
                    describe_action(&command.action),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "kind={} device={} motor={} {}",
                command.kind(),
                target_label(command.device),
                target_label(command.motor),
                describe_action(&command.action)
            );
        }
        OutputFormat::Raw => {
            print_raw(&command.to_bytes());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn target_label(id: u8) -> String {
    if id == 0 {
        "all".to_string()
    } else {
        id.to_string()
    }
}

fn describe_action(action: &Action) -> String {
    match *action {
        Action::Linear { duration, position } => {
            format!("duration={duration}s position={position}")
        }
        Action::Vibrate { speed } => format!("speed={speed}"),
        Action::Rotate { speed, clockwise } => {
            let direction = if clockwise { "cw" } else { "ccw" };
            format!("speed={speed} direction={direction}")
        }
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

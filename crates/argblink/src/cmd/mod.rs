use std::time::Duration;

use argblink_device::{Microcontroller, PullLoop};
use argblink_proto::{Command as DeviceCommand, LedFrame, Message, RGB8};
use argblink_transport::{LinkConfig, SerialPortLink};
use clap::{Args, Subcommand};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::exit::{device_error, proto_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::{print_message, OutputFormat};

pub mod encode;
pub mod fill;
pub mod listen;
pub mod read;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a command envelope without sending it.
    #[command(subcommand)]
    Encode(EncodeCommand),
    /// Send a read command and print the replies.
    Read(ReadArgs),
    /// Light every LED with one color and wait for the device to finish.
    Fill(FillArgs),
    /// Print messages from the device as they arrive.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(command) => encode::run(command, format),
        Command::Read(args) => read::run(args, format),
        Command::Fill(args) => fill::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Subcommand, Debug)]
pub enum EncodeCommand {
    /// Encode a read command.
    Read,
    /// Encode a solid-color write command.
    Fill(FrameArgs),
}

/// Serial port selection and link settings.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Serial port (e.g. /dev/ttyACM0, COM3).
    #[arg(env = "ARGBLINK_PORT")]
    pub port: String,
    /// Baud rate.
    #[arg(long, default_value_t = argblink_transport::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Read timeout per attempt (e.g. 100ms).
    #[arg(long, default_value = "100ms")]
    pub read_timeout: String,
    /// Write timeout (e.g. 5s).
    #[arg(long, default_value = "5s")]
    pub write_timeout: String,
    /// Pause after each word sent (e.g. 20ms).
    #[arg(long, default_value = "20ms")]
    pub word_delay: String,
}

impl LinkArgs {
    pub fn config(&self) -> CliResult<LinkConfig> {
        Ok(LinkConfig {
            baud_rate: self.baud,
            read_timeout: parse_duration(&self.read_timeout)?,
            write_timeout: parse_duration(&self.write_timeout)?,
            word_delay: parse_duration(&self.word_delay)?,
            ..LinkConfig::default()
        })
    }

    pub fn open(&self) -> CliResult<Microcontroller<SerialPortLink>> {
        let config = self.config()?;
        Microcontroller::open(&self.port, config).map_err(|err| device_error("open failed", err))
    }
}

/// Solid-color animation parameters.
#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Color as RRGGBB hex (a leading '#' is accepted).
    #[arg(long, value_parser = parse_color)]
    pub color: RGB8,
    /// Number of LEDs on the strip.
    #[arg(long, default_value_t = 1)]
    pub leds: usize,
    /// Number of frames to send.
    #[arg(long, default_value_t = 1)]
    pub frames: usize,
    /// Delay between frames in milliseconds.
    #[arg(long, default_value_t = 0)]
    pub delay: u16,
}

impl FrameArgs {
    pub fn command(&self) -> CliResult<DeviceCommand> {
        let frame = LedFrame::filled(self.color, self.leds);
        let frames = vec![frame; self.frames];
        DeviceCommand::write(self.delay, frames).map_err(|err| proto_error("invalid frames", err))
    }
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// How long to collect replies (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub wait: String,
}

#[derive(Args, Debug)]
pub struct FillArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    #[command(flatten)]
    pub frame: FrameArgs,
    /// Maximum time to wait for DONE or ERR (e.g. 5s).
    #[arg(long, default_value = "5s")]
    pub wait: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(INTERNAL, format!("runtime setup failed: {err}")))
}

/// Outcome of [`print_messages`].
pub struct Printed {
    pub count: usize,
    pub last: Option<Message>,
}

/// Print device messages until `done` accepts one, `deadline` passes, or
/// the pull loop stops (cancelled or failed).
pub async fn print_messages(
    device: &Microcontroller<SerialPortLink>,
    mut messages: watch::Receiver<Message>,
    pull: &PullLoop,
    deadline: Option<Instant>,
    format: OutputFormat,
    mut done: impl FnMut(&Message, usize) -> bool,
) -> Printed {
    let stopped = pull.cancellation_token();
    let mut printed = Printed {
        count: 0,
        last: None,
    };

    loop {
        let expired = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = expired => break,
            _ = stopped.cancelled() => break,
            changed = messages.changed() => {
                if changed.is_err() {
                    break;
                }
                let message = messages.borrow_and_update().clone();
                print_message(&message, device.name(), format);
                printed.count += 1;
                let finished = done(&message, printed.count);
                printed.last = Some(message);
                if finished {
                    break;
                }
            }
        }
    }
    printed
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "ms")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

fn parse_color(input: &str) -> Result<RGB8, String> {
    let hex = input.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected RRGGBB hex color, got '{input}'"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|err| err.to_string())
    };
    Ok(RGB8::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

use std::fmt;

use crate::error::{ProtoError, Result};
use crate::led_frame::LedFrame;

/// Envelope start marker.
pub const MARKER_BEGIN: &str = "BEGIN";

/// Envelope end marker.
pub const MARKER_END: &str = "END";

/// Read command type code.
pub const TYPE_READ: u8 = 0;

/// Write command type code.
pub const TYPE_WRITE: u8 = 1;

/// A command sent to the microcontroller.
///
/// Every command renders to the envelope
/// ```text
/// BEGIN <type> [<data>...] END
/// ```
/// with tokens separated by single spaces. Data tokens are integers only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the device to report its state. Carries no data.
    Read,
    /// Upload an animation.
    Write(WriteCommand),
}

impl Command {
    /// Build a write command. Fails if `frames` is empty.
    pub fn write(frame_delay: u16, frames: Vec<LedFrame>) -> Result<Self> {
        WriteCommand::new(frame_delay, frames).map(Self::Write)
    }

    /// Integer type code of this command.
    pub fn type_code(&self) -> u8 {
        match self {
            Self::Read => TYPE_READ,
            Self::Write(_) => TYPE_WRITE,
        }
    }

    /// Data tokens of this command, or `None` if it carries no data.
    pub fn data_tokens(&self) -> Option<Vec<String>> {
        match self {
            Self::Read => None,
            Self::Write(write) => Some(write.data_tokens()),
        }
    }

    /// All envelope tokens in transmission order.
    pub fn words(&self) -> Vec<String> {
        let data = self.data_tokens().unwrap_or_default();
        let mut words = Vec::with_capacity(data.len() + 3);
        words.push(MARKER_BEGIN.to_string());
        words.push(self.type_code().to_string());
        words.extend(data);
        words.push(MARKER_END.to_string());
        words
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.words().join(" "))
    }
}

impl From<WriteCommand> for Command {
    fn from(write: WriteCommand) -> Self {
        Self::Write(write)
    }
}

/// Payload of a write command: an animation of one or more frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCommand {
    frame_delay: u16,
    frames: Vec<LedFrame>,
}

impl WriteCommand {
    /// Create a write command playing `frames` with `frame_delay` ms between them.
    pub fn new(frame_delay: u16, frames: Vec<LedFrame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(ProtoError::InvalidArgument(
                "frames cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            frame_delay,
            frames,
        })
    }

    /// Delay between animation frames.
    pub fn frame_delay(&self) -> u16 {
        self.frame_delay
    }

    /// Animation frames.
    pub fn frames(&self) -> &[LedFrame] {
        &self.frames
    }

    /// `<frame count> <delay> <packed colors of every frame, in order>`
    fn data_tokens(&self) -> Vec<String> {
        let colors = self.frames.iter().map(|frame| frame.len()).sum::<usize>();
        let mut tokens = Vec::with_capacity(colors + 2);
        tokens.push(self.frames.len().to_string());
        tokens.push(self.frame_delay.to_string());
        tokens.extend(
            self.frames
                .iter()
                .flat_map(|frame| frame.colors565().iter().map(u16::to_string)),
        );
        tokens
    }
}

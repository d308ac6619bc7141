//! Wire protocol for ARGB LED microcontrollers.
//!
//! Outbound commands are text envelopes sent one word per line:
//! ```text
//! BEGIN <type> [<data>...] END
//! ```
//! where a write command's data is the frame count, the inter-frame delay
//! and every LED color packed as RGB565 in base-10.
//!
//! Inbound messages are whitespace-tokenized lines (`INIT`, `DONE`,
//! `DATA name 1 2 3`, `ERR text`, ...). Decoding is total: garbled input
//! becomes [`Message::Unsupported`], never an error.

pub mod color565;
pub mod command;
pub mod error;
pub mod led_frame;
pub mod message;
pub mod reader;
pub mod writer;

pub use color565::{decode_color, encode_color};
pub use command::{Command, WriteCommand, MARKER_BEGIN, MARKER_END, TYPE_READ, TYPE_WRITE};
pub use error::{ProtoError, Result};
pub use led_frame::LedFrame;
pub use message::{parse_message, Message};
pub use reader::LineReader;
pub use rgb::RGB8;
pub use writer::WordWriter;

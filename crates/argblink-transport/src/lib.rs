//! Serial link abstraction for ARGB LED microcontrollers.
//!
//! The microcontroller is reached over a single serial port. This crate owns
//! opening that port and splitting it into a write side ([`SerialLink`]) and
//! an independent read side ([`LinkReader`]), so the upper layers can read
//! and write concurrently.
//!
//! This is the lowest layer of argblink. Everything else builds on top of
//! the traits defined here.

pub mod config;
pub mod error;
pub mod serial;
pub mod traits;

pub use config::{
    LinkConfig, DEFAULT_BAUD_RATE, DEFAULT_MAX_LINE_LENGTH, DEFAULT_READ_TIMEOUT,
    DEFAULT_WORD_DELAY, DEFAULT_WRITE_TIMEOUT,
};
pub use error::{Result, TransportError};
pub use serial::{SerialPortLink, SerialPortReader};
pub use traits::{LinkReader, SerialLink};

//! Async microcontroller session over a serial link.
//!
//! A [`Microcontroller`] owns one serial connection. Commands are sent word
//! by word with a short pause between words; inbound lines are decoded into
//! [`Message`](argblink_proto::Message)s and published on a last-value
//! stream. Reads and writes run on tokio's blocking pool so a slow port
//! never stalls the caller's scheduler.

pub mod error;
pub mod microcontroller;
pub mod pull_loop;

#[cfg(test)]
mod test_support;

pub use error::{DeviceError, Result};
pub use microcontroller::Microcontroller;
pub use pull_loop::{PullLoop, DEFAULT_PULL_INTERVAL};

//! Drive ARGB LED strips through a microcontroller over a serial port.
//!
//! The host sends commands as whitespace-separated words framed by
//! `BEGIN`/`END`, with colors packed as RGB565. The microcontroller answers
//! with one message per line.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial link abstraction and the `serialport` backend
//! - [`proto`]: color codec, frames, command envelopes, message parsing
//! - [`device`]: async microcontroller session with a message stream
//!
//! # Example
//!
//! ```no_run
//! use argblink::device::Microcontroller;
//! use argblink::proto::{Command, LedFrame, RGB8};
//! use argblink::transport::LinkConfig;
//!
//! # async fn demo() -> argblink::device::Result<()> {
//! let device = Microcontroller::open("/dev/ttyACM0", LinkConfig::default())?;
//! let frame = LedFrame::filled(RGB8::new(255, 64, 0), 30);
//! device.send_command(&Command::write(50, vec![frame])?).await?;
//! device.pull_messages().await?;
//! println!("{}", device.latest());
//! device.dispose()?;
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use argblink_transport::*;
}

/// Re-export protocol types.
pub mod proto {
    pub use argblink_proto::*;
}

/// Re-export device types.
pub mod device {
    pub use argblink_device::*;
}

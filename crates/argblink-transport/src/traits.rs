use std::io::{Read, Write};

use crate::error::Result;

/// The read side of a serial link.
///
/// Obtained from [`SerialLink::try_clone_reader`]. It reads from the same
/// physical port as its link but through an independent handle, so a
/// blocking read never holds up a write.
pub trait LinkReader: Read + Send + 'static {
    /// Close the read side. Reads after close fail with `NotConnected`.
    fn close(&mut self) -> std::io::Result<()>;
}

/// A connected serial link to a microcontroller.
///
/// The link is the write side and owns the connection's lifetime: closing
/// it closes the port for every handle. Implementations must report the
/// number of bytes the port actually accepted from `write`, since callers
/// treat a short write as a failed transmission.
pub trait SerialLink: Write + Send + 'static {
    /// Read-side handle type.
    type Reader: LinkReader;

    /// System name of the port (e.g. `/dev/ttyACM0`, `COM2`).
    fn name(&self) -> &str;

    /// Human-readable description of the port.
    fn description(&self) -> &str {
        self.name()
    }

    /// Open an independent read handle to the same port.
    fn try_clone_reader(&self) -> Result<Self::Reader>;

    /// Flush and close the connection.
    fn close(&mut self) -> Result<()>;
}

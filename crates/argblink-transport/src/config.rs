use std::time::Duration;

/// Baud rate the microcontroller firmware listens at.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default blocking read timeout. Kept short so the pull loop stays responsive.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Default blocking write timeout.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default pause after each outbound word, matching the device's intake rate.
pub const DEFAULT_WORD_DELAY: Duration = Duration::from_millis(20);

/// Default maximum inbound line length: 64 KiB.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Connection parameters for a microcontroller link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Serial baud rate. Default: 115200.
    pub baud_rate: u32,
    /// Timeout for a single blocking read.
    pub read_timeout: Duration,
    /// Timeout for a single blocking write.
    ///
    /// Windows keeps one timeout setting per COM device, shared by every
    /// handle to it. Once the read handle is cloned, writes there run under
    /// `read_timeout` instead; see [`LinkConfig::effective_write_timeout`].
    pub write_timeout: Duration,
    /// Delay after each word of an outbound command.
    pub word_delay: Duration,
    /// Maximum accepted length of an inbound line in bytes.
    pub max_line_length: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            word_delay: DEFAULT_WORD_DELAY,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl LinkConfig {
    /// The write timeout the OS applies once the link has a read handle.
    ///
    /// Equal to `write_timeout` except on Windows, where the read handle's
    /// timeout overwrites the device-wide setting.
    pub fn effective_write_timeout(&self) -> Duration {
        if cfg!(windows) {
            self.read_timeout
        } else {
            self.write_timeout
        }
    }
}

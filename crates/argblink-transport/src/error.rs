/// Errors that can occur on the serial link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial port.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// An I/O error occurred on the serial link.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link has already been closed.
    #[error("serial link closed")]
    Closed,
}

impl From<TransportError> for std::io::Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Io(io) => io,
            TransportError::Closed => {
                std::io::Error::new(std::io::ErrorKind::NotConnected, "serial link closed")
            }
            other => std::io::Error::other(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

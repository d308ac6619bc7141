/// Errors that can occur while building commands or moving them over the wire.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// A command was constructed from invalid arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The link accepted fewer bytes than were sent.
    #[error("short write: {written}/{expected} bytes sent")]
    ShortWrite { written: usize, expected: usize },

    /// An inbound line exceeded the configured maximum length.
    #[error("line too long ({len} bytes, max {max})")]
    LineTooLong { len: usize, max: usize },

    /// An I/O error occurred while reading or writing.
    #[error("protocol I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProtoError>;

/// Errors that can occur in microcontroller operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] argblink_transport::TransportError),

    /// Protocol-level error.
    #[error("protocol error: {0}")]
    Proto(#[from] argblink_proto::ProtoError),

    /// The microcontroller connection has been disposed.
    #[error("microcontroller disposed")]
    Disposed,

    /// A blocking I/O task panicked or was cancelled.
    #[error("I/O task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, DeviceError>;

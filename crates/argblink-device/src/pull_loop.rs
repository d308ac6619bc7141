use std::sync::Arc;
use std::time::Duration;

use argblink_transport::SerialLink;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Result;
use crate::microcontroller::Microcontroller;

/// Pause between pulls when none is given.
pub const DEFAULT_PULL_INTERVAL: Duration = Duration::from_millis(10);

/// Handle to a background task that pulls messages from a microcontroller.
///
/// Dropping the handle detaches the task; call [`shutdown`](Self::shutdown)
/// to stop it and collect its result.
#[derive(Debug)]
pub struct PullLoop {
    token: CancellationToken,
    handle: JoinHandle<Result<()>>,
}

impl PullLoop {
    pub(crate) fn spawn<L: SerialLink>(
        device: Arc<Microcontroller<L>>,
        interval: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let _exit = cancelled.clone().drop_guard();
            debug!(port = %device.name(), ?interval, "pull loop started");
            loop {
                if let Err(err) = device.pull_until(Some(&cancelled)).await {
                    warn!(port = %device.name(), error = %err, "pull loop stopped");
                    return Err(err);
                }
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            debug!(port = %device.name(), "pull loop cancelled");
            Ok(())
        });

        Self { token, handle }
    }

    /// Token that stops the loop when cancelled.
    ///
    /// The loop also cancels it on exit, so waiting on
    /// [`cancelled`](CancellationToken::cancelled) observes a failed pull.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether the task has exited, either cancelled or on error.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the loop and wait for it to exit.
    ///
    /// The loop stops between lines: a read already in progress completes
    /// and its message is published, so this waits up to one read timeout.
    /// Returns the error that ended the loop early, if any.
    pub async fn shutdown(self) -> Result<()> {
        self.token.cancel();
        self.handle.await?
    }
}

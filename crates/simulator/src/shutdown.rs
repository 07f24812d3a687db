//! Shutdown coordination for the bot fleet
//!
//! The controller owns the root [`CancellationToken`]. Each worker gets a
//! child token, so cancelling the root stops every bot while a single bot
//! can still be stopped on its own.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Root cancellation handle shared by the supervisor and the signal listener.
///
/// # Example
///
/// ```ignore
/// let shutdown = ShutdownController::with_ctrl_c();
///
/// let token = shutdown.child_token();
/// tokio::spawn(worker.run(token));
///
/// shutdown.wait_for_shutdown().await;
/// ```
#[derive(Clone)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Controller that cancels itself on Ctrl+C (SIGINT).
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_ctrl_c() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();

        tokio::spawn(async move {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => {
                        info!("Interrupt received, stopping bots");
                        token.cancel();
                    }
                    Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
                },
                _ = token.cancelled() => {}
            }
        });

        controller
    }

    /// Token cancelled together with this controller, or on its own
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            info!("Shutdown requested");
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn wait_for_shutdown(&self) {
        self.token.cancelled().await;
    }
}

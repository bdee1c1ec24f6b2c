//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Screens return commands from `update()`, and the App spawns them with
//! completion detection and status tracking.

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

use crate::api::ApiResult;
use crate::app::AppMessage;

/// Async commands that perform side effects.
///
/// Commands are spawned by the App and tracked for status display.
/// They send their results back to the screen through its own channel and
/// may post toasts through `app_tx`.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for status display.
    /// Include context like role names or page numbers.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()>;
}

/// Show `message` as an info toast.
pub struct NoticeCmd {
    pub message: String,
}

#[async_trait]
impl Command for NoticeCmd {
    fn name(&self) -> String {
        "Notice".to_string()
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let _ = app_tx.send(AppMessage::info(self.message));
        Ok(())
    }
}

/// Report the outcome of a create/update/delete call.
///
/// On success the App shows `success` as a toast and the screen receives
/// `done`, which makes it reload. On failure only an error toast is shown.
pub fn report_mutation<M>(
    outcome: ApiResult<()>,
    success: String,
    app_tx: &UnboundedSender<AppMessage>,
    tx: &UnboundedSender<M>,
    done: M,
) {
    match outcome {
        Ok(()) => {
            info!("{success}");
            let _ = app_tx.send(AppMessage::success(success));
            let _ = tx.send(done);
        }
        Err(e) => {
            error!(error = %e, "Mutation failed");
            let _ = app_tx.send(AppMessage::failure(e.user_message()));
        }
    }
}

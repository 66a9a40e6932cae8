//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the backend worker. Returns whether the command was
/// actually queued so callers can hold off on side effects (clearing inputs,
/// marking a card busy) when the queue refuses it.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = match &cmd {
        BackendCommand::Configure { .. } => "configure",
        BackendCommand::LoadShelf { .. } => "load_shelf",
        BackendCommand::ApplyUpdate { .. } => "apply_update",
        BackendCommand::FetchPoster { .. } => "fetch_poster",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                .to_string();
            false
        }
    }
}

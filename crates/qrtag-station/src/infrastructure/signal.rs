//! Ctrl-C hook.

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::application::stop_signal::StopSignal;

/// Spawns a task that raises `stop` on the first Ctrl-C (SIGINT).
///
/// Must be called from inside a Tokio runtime.
pub fn spawn_ctrl_c_handler(stop: StopSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, stopping");
                stop.request();
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    })
}

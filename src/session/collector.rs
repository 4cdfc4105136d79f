use std::sync::Arc;

use log::{info, warn};
use tokio::sync::{mpsc, watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::db::Finding;
use crate::tools::ToolKind;

use super::state::{ScanState, ScanStatus};

/// What the hardware scanning collaborator emits while a session runs.
/// Closing the channel is the terminal success signal.
#[derive(Debug, Clone)]
pub enum SensorEvent {
    Discovered {
        /// Sub-tool identifier that produced the finding (e.g.
        /// "ble-advertise", "mdns").
        source: String,
        finding: Finding,
    },
    /// Unrecoverable collaborator failure; the session instance is done.
    Failed(String),
}

/// Boundary to the raw hardware access, out of scope for this crate.
pub trait SensorFeed: Send + Sync {
    fn subscribe(&self, tool: ToolKind) -> mpsc::Receiver<SensorEvent>;
}

/// Folds collaborator events into the shared session state until the feed
/// ends, the collaborator fails, or cancellation is requested. Results that
/// arrive after cancellation are dropped on the floor.
pub async fn collection_loop(
    session_id: String,
    mut events: mpsc::Receiver<SensorEvent>,
    state: Arc<Mutex<ScanState>>,
    progress: watch::Sender<ScanState>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Collection for session {session_id} cancelled");
                break;
            }
            event = events.recv() => {
                match event {
                    Some(SensorEvent::Discovered { source, finding }) => {
                        let mut guard = state.lock().await;
                        // A stale collector must never touch a newer session.
                        if guard.status != ScanStatus::Running
                            || guard.session_id.as_deref() != Some(session_id.as_str())
                        {
                            break;
                        }
                        guard.record_finding(source, finding);
                        let _ = progress.send(guard.clone());
                    }
                    Some(SensorEvent::Failed(message)) => {
                        warn!("Sensor failed for session {session_id}: {message}");
                        let mut guard = state.lock().await;
                        if guard.session_id.as_deref() == Some(session_id.as_str()) {
                            guard.fail(message);
                            let _ = progress.send(guard.clone());
                        }
                        break;
                    }
                    None => {
                        info!("Sensor feed for session {session_id} finished");
                        break;
                    }
                }
            }
        }
    }
}

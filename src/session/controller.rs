use std::sync::Arc;

use chrono::Utc;
use log::{error, info};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    db::{ScanHistoryStore, ScanRecord},
    permissions::PermissionGate,
    tools::{PermissionKind, ToolItem},
};

use super::{
    collector::{collection_loop, SensorFeed},
    state::{ScanState, ScanStatus},
    ScanError,
};

struct ActiveCollector {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Coordinates one tool's scan lifecycle: permission-gated start, background
/// collection, completion into the history store, cooperative cancellation.
/// One controller serves successive sessions; each `start` mints a fresh
/// session instance.
#[derive(Clone)]
pub struct ScanController {
    state: Arc<Mutex<ScanState>>,
    store: ScanHistoryStore,
    feed: Arc<dyn SensorFeed>,
    location_gate: Arc<PermissionGate>,
    camera_gate: Arc<PermissionGate>,
    collector: Arc<Mutex<Option<ActiveCollector>>>,
    progress_tx: watch::Sender<ScanState>,
}

impl ScanController {
    pub fn new(
        store: ScanHistoryStore,
        feed: Arc<dyn SensorFeed>,
        location_gate: Arc<PermissionGate>,
        camera_gate: Arc<PermissionGate>,
    ) -> Self {
        let (progress_tx, _) = watch::channel(ScanState::new());
        Self {
            state: Arc::new(Mutex::new(ScanState::new())),
            store,
            feed,
            location_gate,
            camera_gate,
            collector: Arc::new(Mutex::new(None)),
            progress_tx,
        }
    }

    fn gate_for(&self, kind: PermissionKind) -> &Arc<PermissionGate> {
        match kind {
            PermissionKind::Location => &self.location_gate,
            PermissionKind::Camera => &self.camera_gate,
        }
    }

    pub async fn get_state(&self) -> ScanState {
        self.state.lock().await.clone()
    }

    /// Observable progress stream: a snapshot per state change or finding.
    pub fn observe_progress(&self) -> watch::Receiver<ScanState> {
        self.progress_tx.subscribe()
    }

    /// Starts a session for `tool`. Fails fast when the tool's permission
    /// gate has not resolved to an authorized state; otherwise spawns the
    /// collector and returns immediately — the outcome arrives through state
    /// transitions, not this call.
    pub async fn start(&self, tool: &ToolItem) -> Result<ScanState, ScanError> {
        let gate = self.gate_for(tool.kind.required_permission());
        match gate.current_state() {
            Some(state) if state.is_authorized() => {}
            _ => return Err(ScanError::PermissionRequired),
        }

        let session_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();

        {
            let mut state = self.state.lock().await;
            if state.status == ScanStatus::Running {
                return Err(ScanError::AlreadyActive);
            }
            state.begin_session(session_id.clone(), tool.kind, started_at);
            let _ = self.progress_tx.send(state.clone());
        }

        let events = self.feed.subscribe(tool.kind);
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(collection_loop(
            session_id.clone(),
            events,
            self.state.clone(),
            self.progress_tx.clone(),
            cancel_token.clone(),
        ));

        let mut collector = self.collector.lock().await;
        if let Some(stale) = collector.replace(ActiveCollector {
            handle,
            cancel_token,
        }) {
            stale.cancel_token.cancel();
            stale.handle.abort();
        }

        info!("Started {} scan session {session_id}", tool.kind.as_str());
        Ok(self.get_state().await)
    }

    /// Finalizes the running session into an immutable record and appends it
    /// to history. On a persistence failure the completed result set stays
    /// in the session state; only the durable copy is missing.
    pub async fn stop(&self) -> Result<ScanRecord, ScanError> {
        let record = {
            let mut state = self.state.lock().await;
            match state.status {
                ScanStatus::Running => {}
                ScanStatus::Failed => {
                    let message = state
                        .failure
                        .clone()
                        .unwrap_or_else(|| "sensor reported an error".to_string());
                    return Err(ScanError::SensorUnavailable(message));
                }
                _ => return Err(ScanError::NotRunning),
            }

            let Some(tool) = state.tool else {
                return Err(ScanError::NotRunning);
            };

            state.complete();
            let _ = self.progress_tx.send(state.clone());

            ScanRecord {
                id: state
                    .session_id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                date: Utc::now(),
                scan_type: tool,
                findings: state.findings.clone(),
                tools_used: state.tools_used.clone(),
            }
        };

        self.shutdown_collector().await;

        // Lock released above: the append runs on the store's worker thread
        // and must not hold the session state hostage.
        if let Err(err) = self.store.append(&record).await {
            error!("Failed to persist scan record {}: {err:#}", record.id);
            return Err(ScanError::Persistence(err));
        }

        info!(
            "Scan session {} completed with {} findings",
            record.id,
            record.findings.len()
        );
        Ok(record)
    }

    /// Cooperative cancellation: the collector observes the token and stops
    /// emitting; nothing is persisted. Cancelling an idle controller is a
    /// no-op.
    pub async fn cancel(&self) -> Result<(), ScanError> {
        {
            let mut state = self.state.lock().await;
            if state.status != ScanStatus::Running {
                return Ok(());
            }
            state.cancel();
            let _ = self.progress_tx.send(state.clone());
        }

        self.shutdown_collector().await;
        info!("Scan session cancelled");
        Ok(())
    }

    async fn shutdown_collector(&self) {
        let active = self.collector.lock().await.take();
        if let Some(active) = active {
            active.cancel_token.cancel();
            if let Err(err) = active.handle.await {
                if !err.is_cancelled() {
                    error!("Collector task failed to join: {err}");
                }
            }
        }
    }
}

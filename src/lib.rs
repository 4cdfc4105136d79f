pub mod db;
pub mod flags;
pub mod nav;
pub mod net;
pub mod permissions;
pub mod session;
pub mod tools;

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Result;
use tokio::sync::mpsc;

use db::ScanHistoryStore;
use flags::{FileFlagStore, FlagStore};
use nav::{FlowEvent, RootCoordinator, ScreenHost};
use permissions::{AuthorizationBackend, PermissionGate};
use session::{ScanController, SensorFeed};

/// External collaborators the core cannot own: OS authorization subsystems,
/// the raw hardware feed, and the screen-rendering host.
pub struct Collaborators {
    pub location: Arc<dyn AuthorizationBackend>,
    pub camera: Arc<dyn AuthorizationBackend>,
    pub feed: Arc<dyn SensorFeed>,
    pub host: Arc<dyn ScreenHost>,
}

/// Long-lived aggregate built once at launch: the history store, the two
/// permission gates, and the scan controller the home flow drives.
pub struct AppState {
    pub history: ScanHistoryStore,
    pub location_gate: Arc<PermissionGate>,
    pub camera_gate: Arc<PermissionGate>,
    pub scans: ScanController,
    pub flags: Arc<dyn FlagStore>,
}

impl AppState {
    pub fn new(data_dir: &Path, collaborators: &Collaborators) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let history = ScanHistoryStore::new(data_dir.join("bugsweep.sqlite3"))?;
        let flags: Arc<dyn FlagStore> =
            Arc::new(FileFlagStore::new(data_dir.join("flags.json"))?);

        let location_gate = PermissionGate::new(collaborators.location.clone());
        let camera_gate = PermissionGate::new(collaborators.camera.clone());

        let scans = ScanController::new(
            history.clone(),
            collaborators.feed.clone(),
            location_gate.clone(),
            camera_gate.clone(),
        );

        Ok(Self {
            history,
            location_gate,
            camera_gate,
            scans,
            flags,
        })
    }

    /// Builds the root coordinator over this state's flag store.
    pub fn coordinator(
        &self,
        host: Arc<dyn ScreenHost>,
        splash_auto_advance: Option<Duration>,
    ) -> (RootCoordinator, mpsc::UnboundedReceiver<FlowEvent>) {
        RootCoordinator::new(host, self.flags.clone(), splash_auto_advance)
    }
}

/// Launch sequence: open the stores, raise the gates, start the coordinator
/// tree at splash, then drain flow events for the life of the process.
pub async fn run(data_dir: &Path, collaborators: Collaborators) -> Result<()> {
    log::info!("bugsweep starting up");

    let state = AppState::new(data_dir, &collaborators)?;

    state.location_gate.request_authorization();
    state.camera_gate.request_authorization();

    let (mut root, events) = state.coordinator(
        collaborators.host.clone(),
        Some(Duration::from_millis(600)),
    );
    root.start();
    root.run(events).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::ActiveFlow;
    use crate::permissions::test_support::FakeBackend;
    use crate::permissions::AuthorizationState;
    use crate::session::{ScanStatus, SensorEvent};
    use crate::tools::{self, ToolKind};
    use std::sync::Mutex as StdMutex;
    use uuid::Uuid;

    struct NullHost;

    impl ScreenHost for NullHost {
        fn present(&self, _screen: &str) {}
    }

    struct ScriptedFeed {
        receivers: StdMutex<Vec<tokio::sync::mpsc::Receiver<SensorEvent>>>,
    }

    impl SensorFeed for ScriptedFeed {
        fn subscribe(&self, _tool: ToolKind) -> tokio::sync::mpsc::Receiver<SensorEvent> {
            self.receivers
                .lock()
                .unwrap()
                .pop()
                .expect("no scripted feed left")
        }
    }

    #[tokio::test]
    async fn launch_to_scan_to_history() -> Result<()> {
        let data_dir = std::env::temp_dir().join(format!("bugsweep-app-{}", Uuid::new_v4()));
        let (events_tx, events_rx) = tokio::sync::mpsc::channel(16);
        let collaborators = Collaborators {
            location: FakeBackend::new(AuthorizationState::AuthorizedWhenInUse),
            camera: FakeBackend::new(AuthorizationState::Denied),
            feed: Arc::new(ScriptedFeed {
                receivers: StdMutex::new(vec![events_rx]),
            }),
            host: Arc::new(NullHost),
        };

        let state = AppState::new(&data_dir, &collaborators)?;

        // First run: splash -> intro -> home.
        let (mut root, _flow_events) = state.coordinator(Arc::new(NullHost), None);
        root.start();
        let splash = root.active_child_id().unwrap();
        root.handle_event(FlowEvent::ChildDidStop(splash));
        let intro = root.active_child_id().unwrap();
        root.handle_event(FlowEvent::ChildDidStop(intro));
        assert_eq!(root.active_flow(), Some(ActiveFlow::Home));

        // Camera tools are gated off, location tools scan fine.
        assert!(state
            .scans
            .start(tools::item(ToolKind::Camera))
            .await
            .is_err());

        state.scans.start(tools::item(ToolKind::Wifi)).await?;
        events_tx
            .send(SensorEvent::Discovered {
                source: "mdns".into(),
                finding: db::Finding {
                    identifier: "cam-stream._rtsp".into(),
                    label: "RTSP service".into(),
                    signal_strength: None,
                    host: crate::net::numeric_host(&[
                        16, 2, 0x1f, 0x90, 10, 0, 0, 23, 0, 0, 0, 0, 0, 0, 0, 0,
                    ]),
                },
            })
            .await
            .unwrap();

        let mut progress = state.scans.observe_progress();
        while progress.borrow().findings.is_empty() {
            progress.changed().await.unwrap();
        }

        let record = state.scans.stop().await.unwrap();
        assert_eq!(record.findings[0].host.as_deref(), Some("10.0.0.23"));
        assert_eq!(state.scans.get_state().await.status, ScanStatus::Completed);

        let listed = state.history.list_all().await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].scan_type, ToolKind::Wifi);

        // Second launch over the same data dir skips the intro.
        let state2 = AppState::new(&data_dir, &collaborators)?;
        let (mut root2, _flow_events) = state2.coordinator(Arc::new(NullHost), None);
        root2.start();
        let splash2 = root2.active_child_id().unwrap();
        root2.handle_event(FlowEvent::ChildDidStop(splash2));
        assert_eq!(root2.active_flow(), Some(ActiveFlow::Home));

        let _ = std::fs::remove_dir_all(&data_dir);
        Ok(())
    }
}

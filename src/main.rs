use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::Result;
use log::info;
use tokio::sync::mpsc;

use bugsweep::{
    nav::ScreenHost,
    permissions::{AuthorizationBackend, AuthorizationState},
    session::{SensorEvent, SensorFeed},
    tools::ToolKind,
    Collaborators,
};

/// Stand-in for the platform authorization bridge: reports a fixed grant.
struct GrantedAuthority(AuthorizationState);

impl AuthorizationBackend for GrantedAuthority {
    fn current_status(&self) -> AuthorizationState {
        self.0
    }

    fn request_authorization(&self) {}
}

/// Stand-in for the hardware bridge: opens a feed that stays silent until
/// the session is stopped or cancelled.
#[derive(Default)]
struct SilentFeed {
    // Senders are parked here so the feeds stay open for the session's life.
    open: Mutex<Vec<mpsc::Sender<SensorEvent>>>,
}

impl SensorFeed for SilentFeed {
    fn subscribe(&self, tool: ToolKind) -> mpsc::Receiver<SensorEvent> {
        info!("Opening silent {} feed", tool.as_str());
        let (tx, rx) = mpsc::channel(16);
        self.open.lock().unwrap().push(tx);
        rx
    }
}

struct LogHost;

impl ScreenHost for LogHost {
    fn present(&self, screen: &str) {
        info!("Presenting screen: {screen}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let data_dir = std::env::var_os("BUGSWEEP_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("bugsweep-data"));

    let collaborators = Collaborators {
        location: Arc::new(GrantedAuthority(AuthorizationState::AuthorizedWhenInUse)),
        camera: Arc::new(GrantedAuthority(AuthorizationState::AuthorizedAlways)),
        feed: Arc::new(SilentFeed::default()),
        host: Arc::new(LogHost),
    };

    bugsweep::run(&data_dir, collaborators).await
}

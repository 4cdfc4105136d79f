pub mod collector;
pub mod controller;
pub mod state;

pub use collector::{SensorEvent, SensorFeed};
pub use controller::ScanController;
pub use state::{ScanState, ScanStatus};

use thiserror::Error;

/// Failures at the scan-session boundary. Everything behind it stays
/// `anyhow`; callers of `start`/`stop` need to distinguish these.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The tool's permission gate has not resolved to an authorized state.
    /// Recoverable: wait for the gate and start a new session.
    #[error("authorization has not been granted for this tool")]
    PermissionRequired,

    #[error("a scan session is already running")]
    AlreadyActive,

    #[error("no scan session is running")]
    NotRunning,

    /// The sensor collaborator reported an unrecoverable error. Terminal for
    /// this session instance; retry requires a new session.
    #[error("sensor became unavailable: {0}")]
    SensorUnavailable(String),

    /// The history write failed. The completed result set is still held in
    /// the session state; only the durable copy is missing.
    #[error("scan result could not be saved")]
    Persistence(#[source] anyhow::Error),
}

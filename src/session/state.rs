use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Finding;
use crate::tools::ToolKind;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScanStatus {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl Default for ScanStatus {
    fn default() -> Self {
        ScanStatus::Idle
    }
}

/// Observable state of the current (or most recent) scan session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanState {
    pub status: ScanStatus,
    pub session_id: Option<String>,
    pub tool: Option<ToolKind>,
    pub started_at: Option<DateTime<Utc>>,
    pub findings: Vec<Finding>,
    /// Sub-tool identifiers that contributed findings, insertion order.
    pub tools_used: Vec<String>,
    pub failure: Option<String>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_session(
        &mut self,
        session_id: String,
        tool: ToolKind,
        started_at: DateTime<Utc>,
    ) {
        *self = Self {
            status: ScanStatus::Running,
            session_id: Some(session_id),
            tool: Some(tool),
            started_at: Some(started_at),
            findings: Vec::new(),
            tools_used: Vec::new(),
            failure: None,
        };
    }

    pub fn record_finding(&mut self, source: String, finding: Finding) {
        if !self.tools_used.contains(&source) {
            self.tools_used.push(source);
        }
        self.findings.push(finding);
    }

    pub fn complete(&mut self) {
        self.status = ScanStatus::Completed;
    }

    /// Cancellation discards whatever was collected; nothing survives into
    /// history.
    pub fn cancel(&mut self) {
        self.status = ScanStatus::Cancelled;
        self.findings.clear();
        self.tools_used.clear();
    }

    pub fn fail(&mut self, message: String) {
        self.status = ScanStatus::Failed;
        self.failure = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(id: &str) -> Finding {
        Finding {
            identifier: id.into(),
            label: "device".into(),
            signal_strength: None,
            host: None,
        }
    }

    #[test]
    fn record_finding_dedups_sources() {
        let mut state = ScanState::new();
        state.begin_session("s1".into(), ToolKind::Bluetooth, Utc::now());

        state.record_finding("ble-advertise".into(), finding("a"));
        state.record_finding("ble-advertise".into(), finding("b"));
        state.record_finding("ble-gatt".into(), finding("c"));

        assert_eq!(state.findings.len(), 3);
        assert_eq!(state.tools_used, vec!["ble-advertise", "ble-gatt"]);
    }

    #[test]
    fn cancel_discards_collected_results() {
        let mut state = ScanState::new();
        state.begin_session("s1".into(), ToolKind::Wifi, Utc::now());
        state.record_finding("mdns".into(), finding("a"));

        state.cancel();

        assert_eq!(state.status, ScanStatus::Cancelled);
        assert!(state.findings.is_empty());
        assert!(state.tools_used.is_empty());
    }
}

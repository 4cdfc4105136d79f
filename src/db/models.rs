use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tools::ToolKind;

/// One entity a sensor collaborator discovered during a scan: a Bluetooth
/// transmitter, a network service, a suspicious camera frame, a field spike.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Stable identifier as reported by the sensor (MAC address, service
    /// name, frame index).
    pub identifier: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<f64>,
    /// Numeric host resolved from the service's address record, Wi-Fi scans
    /// only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Immutable summary of one completed sensor session. Written once on
/// completion, never updated; removed only by an explicit delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub scan_type: ToolKind,
    pub findings: Vec<Finding>,
    pub tools_used: Vec<String>,
}

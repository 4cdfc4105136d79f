use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use crate::tools::ToolKind;

/// Epoch seconds as stored in the `date` REAL column, microsecond precision.
pub fn to_epoch_seconds(date: DateTime<Utc>) -> f64 {
    date.timestamp_micros() as f64 / 1_000_000.0
}

pub fn from_epoch_seconds(seconds: f64, field: &str) -> Result<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(anyhow!("{field} is not a finite timestamp: {seconds}"));
    }
    let micros = (seconds * 1_000_000.0).round() as i64;
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| anyhow!("{field} is out of range: {seconds}"))
}

pub fn parse_scan_type(code: i64, field: &str) -> Result<ToolKind> {
    ToolKind::from_code(code).ok_or_else(|| anyhow!("{field} holds unknown scan type code {code}"))
}

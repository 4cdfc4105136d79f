use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    helpers::{from_epoch_seconds, parse_scan_type, to_epoch_seconds},
    models::{Finding, ScanRecord},
    ScanHistoryStore,
};

fn row_to_record(row: &Row) -> Result<ScanRecord> {
    let date: f64 = row.get("date")?;
    let scan_type: i64 = row.get("type")?;
    let results: String = row.get("results")?;
    let tools: String = row.get("tools")?;

    let findings: Vec<Finding> =
        serde_json::from_str(&results).context("failed to parse results payload")?;
    let tools_used: Vec<String> =
        serde_json::from_str(&tools).context("failed to parse tools payload")?;

    Ok(ScanRecord {
        id: row.get("id")?,
        date: from_epoch_seconds(date, "date")?,
        scan_type: parse_scan_type(scan_type, "type")?,
        findings,
        tools_used,
    })
}

impl ScanHistoryStore {
    pub async fn append(&self, record: &ScanRecord) -> Result<()> {
        let record = record.clone();
        self.execute(move |conn| {
            let results =
                serde_json::to_string(&record.findings).context("failed to serialize findings")?;
            let tools = serde_json::to_string(&record.tools_used)
                .context("failed to serialize tools list")?;

            conn.execute(
                "INSERT INTO scans (id, date, type, results, tools)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    to_epoch_seconds(record.date),
                    record.scan_type.code(),
                    results,
                    tools,
                ],
            )
            .context("failed to insert scan record")?;
            Ok(())
        })
        .await
    }

    /// All recorded scans, most recent first.
    pub async fn list_all(&self) -> Result<Vec<ScanRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, date, type, results, tools
                 FROM scans
                 ORDER BY date DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }

            Ok(records)
        })
        .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ScanRecord>> {
        let id = id.to_string();
        self.execute(move |conn| {
            conn.query_row(
                "SELECT id, date, type, results, tools
                 FROM scans
                 WHERE id = ?1",
                params![id],
                |row| Ok(row_to_record(row)),
            )
            .optional()?
            .transpose()
        })
        .await
    }

    /// Idempotent: deleting an id that was never recorded succeeds.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM scans WHERE id = ?1", params![id])
                .context("failed to delete scan record")?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolKind;
    use chrono::DateTime;
    use uuid::Uuid;

    fn temp_store() -> ScanHistoryStore {
        let path = std::env::temp_dir().join(format!("bugsweep-test-{}.sqlite3", Uuid::new_v4()));
        ScanHistoryStore::new(path).expect("open temp store")
    }

    fn record_at(epoch_secs: i64, scan_type: ToolKind) -> ScanRecord {
        ScanRecord {
            id: Uuid::new_v4().to_string(),
            date: DateTime::from_timestamp(epoch_secs, 0).unwrap(),
            scan_type,
            findings: vec![Finding {
                identifier: "AA:BB:CC:DD:EE:FF".into(),
                label: "Unknown tracker".into(),
                signal_strength: Some(-52.0),
                host: None,
            }],
            tools_used: vec!["ble-advertise".into()],
        }
    }

    #[tokio::test]
    async fn append_then_list_and_find_round_trip() -> Result<()> {
        let store = temp_store();
        let record = record_at(1_700_000_000, ToolKind::Bluetooth);

        store.append(&record).await?;

        let listed = store.list_all().await?;
        assert_eq!(listed, vec![record.clone()]);

        let found = store.find_by_id(&record.id).await?;
        assert_eq!(found, Some(record));
        Ok(())
    }

    #[tokio::test]
    async fn list_orders_by_date_descending() -> Result<()> {
        let store = temp_store();
        let first = record_at(100, ToolKind::Wifi);
        let second = record_at(300, ToolKind::Magnetic);
        let third = record_at(200, ToolKind::Camera);

        store.append(&first).await?;
        store.append(&second).await?;
        store.append(&third).await?;

        let dates: Vec<i64> = store
            .list_all()
            .await?
            .into_iter()
            .map(|record| record.date.timestamp())
            .collect();
        assert_eq!(dates, vec![300, 200, 100]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_id_is_a_no_op() -> Result<()> {
        let store = temp_store();
        let record = record_at(100, ToolKind::Infrared);
        store.append(&record).await?;

        store.delete("not-a-real-id").await?;
        assert_eq!(store.list_all().await?.len(), 1);

        store.delete(&record.id).await?;
        store.delete(&record.id).await?;
        assert!(store.list_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn find_missing_id_is_none() -> Result<()> {
        let store = temp_store();
        assert_eq!(store.find_by_id("missing").await?, None);
        Ok(())
    }
}

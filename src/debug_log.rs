//! Append-only diagnostic records, kept apart from `tracing` output so that
//! a run can be inspected after the fact.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::fs_utils::append_log_record;

#[async_trait]
pub trait DebugLog: Send + Sync {
    /// Records `record` in `file_name`. Never fails: a sink that cannot
    /// write reports through `tracing` and drops the record.
    async fn write(&self, file_name: &str, record: Value);
}

/// A record as written to disk: `timestamp` first, then the record's own
/// fields. Non-object records are nested under `data`.
#[derive(Debug, Serialize)]
pub struct TimestampedRecord {
    timestamp: String,
    #[serde(flatten)]
    data: Value,
}

impl TimestampedRecord {
    pub fn new(record: Value) -> Self {
        let data = if record.is_object() {
            record
        } else {
            json!({ "data": record })
        };

        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            data,
        }
    }

    pub fn into_value(self) -> Value {
        let mut data = self.data;
        if let Value::Object(map) = &mut data {
            map.insert("timestamp".to_string(), Value::String(self.timestamp));
        }
        data
    }
}

#[derive(Debug, Clone)]
pub struct FileDebugLog {
    dir: PathBuf,
}

impl FileDebugLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DebugLog for FileDebugLog {
    async fn write(&self, file_name: &str, record: Value) {
        let record = TimestampedRecord::new(record);
        let serialized = match serde_json::to_string_pretty(&record) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::warn!(error = %err, "unable to serialise debug record");
                return;
            }
        };

        match append_log_record(&self.dir, file_name, &serialized).await {
            Ok(path) => tracing::debug!(path = %path.display(), "debug log written"),
            Err(err) => tracing::warn!(
                dir = %self.dir.display(),
                file = file_name,
                error = %err,
                "unable to append debug record"
            ),
        }
    }
}

/// Keeps records in memory; used by tests and embedding hosts that collect
/// diagnostics themselves.
#[derive(Debug, Default)]
pub struct MemoryDebugLog {
    records: Mutex<Vec<(String, Value)>>,
}

impl MemoryDebugLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(String, Value)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn records_in(&self, file_name: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|(file, _)| file == file_name)
            .map(|(_, record)| record)
            .collect()
    }
}

#[async_trait]
impl DebugLog for MemoryDebugLog {
    async fn write(&self, file_name: &str, record: Value) {
        if let Ok(mut records) = self.records.lock() {
            records.push((file_name.to_string(), TimestampedRecord::new(record).into_value()));
        }
    }
}

//! File records as the backend reports them, plus the client-side list that
//! holds them.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Client-side projection of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub file_name: String,
    pub file_size: u64,
    /// ISO-8601, as sent by the backend
    pub upload_time: String,
    pub expiry_time: String,
    #[serde(default)]
    pub download_count: u64,
    /// Either a bare id or a full URL; see `share_link::build_share_link`
    #[serde(default)]
    pub share_url: String,
    #[serde(default)]
    pub description: String,
}

/// In-memory file list, most recent first. Rebuilt from the backend on load,
/// never persisted.
#[derive(Debug, Default, Clone)]
pub struct FileList {
    records: Vec<FileRecord>,
}

impl FileList {
    pub fn replace(&mut self, records: Vec<FileRecord>) {
        self.records = records;
    }

    pub fn prepend(&mut self, record: FileRecord) {
        self.records.insert(0, record);
    }

    pub fn remove(&mut self, id: &str) -> Option<FileRecord> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn as_slice(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size: base 1024, at most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    let mut number = format!("{rounded:.2}");
    while number.ends_with('0') {
        number.pop();
    }
    if number.ends_with('.') {
        number.pop();
    }
    format!("{number} {}", SIZE_UNITS[unit])
}

/// Display form of a backend timestamp. Accepts RFC 3339 and offset-less
/// ISO-8601 (with or without fractional seconds); anything else is returned
/// as-is.
pub fn format_time(value: &str) -> String {
    let display = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(dt) = OffsetDateTime::parse(value, &Rfc3339) {
        return dt.format(&display).unwrap_or_else(|_| value.to_string());
    }
    let local = format_description!(
        version = 2,
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    match PrimitiveDateTime::parse(value, &local) {
        Ok(dt) => dt.format(&display).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

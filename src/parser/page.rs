use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

const TS_FORMAT: &str = "%Y%m%d%H%M%S";

/// One captured HTTP response reconstructed from the log stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub url: String,
    pub ip: String,
    pub ts: String,
    pub content_type: String,
    pub size: String,
    pub protocol: String,
    pub status: String,
    /// Lower-cased name → trimmed value; a repeated name keeps the last value.
    pub headers: BTreeMap<String, String>,
    /// Raw body lines, terminators included.
    pub body: Vec<String>,
}

impl Page {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Capture time, if `ts` is a 14-digit `YYYYMMDDhhmmss` stamp.
    pub fn captured_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.ts, TS_FORMAT).ok()
    }
}

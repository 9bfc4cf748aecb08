//! The persisted shape of a saved prompt/response pair. Field order
//! here is the key order written to disk.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Formats a local time the way `timestamp` fields are stored.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Record {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub input_info: String,
    pub timestamp: String,
    pub prompt: String,
    pub result: String,
    // Older records were written before edits were tracked
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Snapshot of a record taken right before an edit was committed.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub prompt: String,
    pub result: String,
    #[serde(default)]
    pub input_info: String,
    #[serde(default)]
    pub old_service_name: String,
    #[serde(default)]
    pub new_service_name: String,
}

/// The values an edit replaces. Anything left empty by the operator
/// has already been resolved to the current value by the time this
/// is constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordUpdate {
    pub prompt: String,
    pub result: String,
    pub input_info: String,
    pub service_name: String,
}

impl Record {
    pub fn new(
        service_name: &str,
        input_info: &str,
        prompt: &str,
        result: &str,
        created_at: &NaiveDateTime,
    ) -> Self {
        Self {
            service_name: service_name.to_string(),
            input_info: input_info.to_string(),
            timestamp: format_timestamp(created_at),
            prompt: prompt.to_string(),
            result: result.to_string(),
            history: Vec::new(),
        }
    }

    /// Appends the current state to `history` and then overwrites the
    /// top level fields with `update`.
    pub fn apply_edit(&mut self, update: RecordUpdate, edited_at: &NaiveDateTime) {
        let entry = HistoryEntry {
            timestamp: format_timestamp(edited_at),
            prompt: self.prompt.clone(),
            result: self.result.clone(),
            input_info: self.input_info.clone(),
            old_service_name: self.service_name.clone(),
            new_service_name: update.service_name.clone(),
        };
        self.history.push(entry);

        self.prompt = update.prompt;
        self.result = update.result;
        self.input_info = update.input_info;
        self.service_name = update.service_name;
    }
}

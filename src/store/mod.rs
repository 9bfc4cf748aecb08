//! File backed persistence for records. Each record is one pretty
//! printed JSON document named after its creation time.
//!
//! There is no locking. Updates are a plain read-modify-rewrite so two
//! processes editing the same file will race and the last write wins.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

pub mod models;

pub use models::{HistoryEntry, Record, RecordUpdate, TIMESTAMP_FORMAT, format_timestamp};

const FILE_NAME_FORMAT: &str = "%Y%m%d_%H%M%S";
const EXTENSION: &str = "json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File is not a valid record: {file_name}: {source}")]
    MalformedRecord {
        file_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Invalid record timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Returns the file name a record created at `ts` is stored under.
pub fn file_name_for(ts: &NaiveDateTime) -> String {
    format!("{}.{}", ts.format(FILE_NAME_FORMAT), EXTENSION)
}

#[derive(Clone, Debug)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes a new record and returns its file name. A record created
    /// within the same second as an existing one replaces it.
    pub fn save(&self, record: &Record) -> Result<String, StoreError> {
        let created_at = NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT)
            .map_err(|_| StoreError::InvalidTimestamp(record.timestamp.clone()))?;
        let file_name = file_name_for(&created_at);
        fs::create_dir_all(&self.dir)?;
        self.write(&file_name, record)?;
        tracing::info!("Saved record {}", file_name);
        Ok(file_name)
    }

    /// Rewrites an existing record in place.
    pub fn update(&self, file_name: &str, record: &Record) -> Result<(), StoreError> {
        let file_name = normalize_file_name(file_name)?;
        fs::create_dir_all(&self.dir)?;
        self.write(&file_name, record)?;
        tracing::info!(
            "Updated record {} ({} history entries)",
            file_name,
            record.history.len()
        );
        Ok(())
    }

    pub fn load(&self, file_name: &str) -> Result<Record, StoreError> {
        let file_name = normalize_file_name(file_name)?;
        let path = self.dir.join(&file_name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(file_name));
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("Loaded {} bytes from {}", text.len(), path.display());

        serde_json::from_str(&text)
            .map_err(|source| StoreError::MalformedRecord { file_name, source })
    }

    /// File names of every stored record, oldest first. Since names
    /// are timestamps, lexical order is chronological order.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn write(&self, file_name: &str, record: &Record) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record).map_err(StoreError::Serialize)?;
        fs::write(self.dir.join(file_name), json)?;
        Ok(())
    }
}

/// Accepts `20240501_093000` or `20240501_093000.json` and refuses
/// anything that could escape the store directory.
fn normalize_file_name(file_name: &str) -> Result<String, StoreError> {
    let name = file_name.trim();
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
    {
        return Err(StoreError::InvalidFileName(file_name.to_string()));
    }

    let suffix = format!(".{}", EXTENSION);
    if name.ends_with(&suffix) {
        Ok(name.to_string())
    } else {
        Ok(format!("{}{}", name, suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn ts(s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, s)
            .unwrap()
    }

    fn test_store() -> (TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("prompts"));
        (dir, store)
    }

    #[test]
    fn test_file_name_for() {
        assert_eq!(file_name_for(&ts(5)), "20240501_093005.json");
    }

    #[test]
    fn test_normalize_file_name() {
        assert_eq!(normalize_file_name("20240501_093005").unwrap(), "20240501_093005.json");
        assert_eq!(
            normalize_file_name(" 20240501_093005.json ").unwrap(),
            "20240501_093005.json"
        );
        assert!(normalize_file_name("../secrets.json").is_err());
        assert!(normalize_file_name("a/b.json").is_err());
        assert!(normalize_file_name("").is_err());
    }

    #[test]
    fn it_creates_the_directory_on_save() {
        let (_dir, store) = test_store();
        assert!(!store.dir().exists());

        let record = Record::new("llama3", "", "Hello", "Hi there", &ts(0));
        let file_name = store.save(&record).unwrap();

        assert_eq!(file_name, "20240501_093000.json");
        assert!(store.dir().join(&file_name).is_file());
    }

    #[test]
    fn it_round_trips_a_record() {
        let (_dir, store) = test_store();
        let record = Record::new("llama3", "丁寧に", "こんにちは", "Hi there", &ts(0));
        let file_name = store.save(&record).unwrap();

        let loaded = store.load(&file_name).unwrap();
        assert_eq!(loaded, record);
        assert!(loaded.history.is_empty());
    }

    #[test]
    fn it_writes_pretty_json_without_escaping() {
        let (_dir, store) = test_store();
        let record = Record::new("llama3", "", "こんにちは", "やあ", &ts(0));
        let file_name = store.save(&record).unwrap();

        let text = fs::read_to_string(store.dir().join(file_name)).unwrap();
        assert!(text.contains("\n  \"prompt\": \"こんにちは\""));
        assert!(text.starts_with("{\n  \"service_name\""));
    }

    #[test]
    fn it_overwrites_on_collision() {
        let (_dir, store) = test_store();
        store
            .save(&Record::new("a", "", "first", "1", &ts(0)))
            .unwrap();
        let file_name = store
            .save(&Record::new("b", "", "second", "2", &ts(0)))
            .unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.load(&file_name).unwrap().prompt, "second");
    }

    #[test]
    fn it_rejects_unparseable_timestamps_on_save() {
        let (_dir, store) = test_store();
        let mut record = Record::new("a", "", "p", "r", &ts(0));
        record.timestamp = "yesterday".to_string();
        assert!(matches!(
            store.save(&record),
            Err(StoreError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn it_returns_not_found() {
        let (_dir, store) = test_store();
        let err = store.load("20000101_000000.json").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref name) if name == "20000101_000000.json"));
    }

    #[test]
    fn it_returns_malformed_record() {
        let (_dir, store) = test_store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join("broken.json"), "{not json").unwrap();

        let err = store.load("broken.json").unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord { .. }));
    }

    #[test]
    fn it_loads_legacy_records_without_history() {
        let (_dir, store) = test_store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(
            store.dir().join("20231027_123456.json"),
            r#"{"service_name": "gpt", "input_info": "", "timestamp": "2023-10-27T12:34:56.000001", "prompt": "p", "result": "r"}"#,
        )
        .unwrap();

        let record = store.load("20231027_123456").unwrap();
        assert!(record.history.is_empty());
    }

    #[test]
    fn it_updates_in_place() {
        let (_dir, store) = test_store();
        let mut record = Record::new("a", "", "Hello", "Hi", &ts(0));
        let file_name = store.save(&record).unwrap();

        record.apply_edit(
            RecordUpdate {
                prompt: "Hello again".to_string(),
                result: "Hi again".to_string(),
                input_info: String::new(),
                service_name: "a".to_string(),
            },
            &ts(30),
        );
        store.update(&file_name, &record).unwrap();

        let loaded = store.load(&file_name).unwrap();
        assert_eq!(loaded.prompt, "Hello again");
        assert_eq!(loaded.history.len(), 1);
        assert_eq!(store.list().unwrap(), vec![file_name]);
    }

    #[test]
    fn it_lists_records_in_order() {
        let (_dir, store) = test_store();
        assert!(store.list().unwrap().is_empty());

        store.save(&Record::new("a", "", "p", "r", &ts(9))).unwrap();
        store.save(&Record::new("a", "", "p", "r", &ts(3))).unwrap();
        fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        assert_eq!(
            store.list().unwrap(),
            vec!["20240501_093003.json", "20240501_093009.json"]
        );
    }
}

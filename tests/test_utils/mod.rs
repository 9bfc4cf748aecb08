//! Test utilities for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tempfile::TempDir;

use promptlog::openai::{CompletionClient, CompletionError, Message};
use promptlog::session::{Clock, Session};
use promptlog::store::RecordStore;

pub const TEST_MODEL: &str = "llama3-70b-8192";
pub const TEST_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

/// A completion client that answers from a queue of canned replies
/// and remembers every transcript it was sent. Clones share state so
/// a test can keep a handle after moving one into a `Session`.
#[derive(Clone, Default)]
pub struct FakeClient {
    replies: Arc<Mutex<VecDeque<Result<String, CompletionError>>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl FakeClient {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        assert_eq!(model, TEST_MODEL);
        assert_eq!(max_tokens, 1024);
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::EmptyResponse))
    }
}

pub fn api_error(message: &str) -> CompletionError {
    CompletionError::Api {
        status: 500,
        message: message.to_string(),
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

/// A clock that advances one second every time it is read so each
/// save gets its own file name.
pub fn ticking_clock() -> Clock {
    let tick = AtomicI64::new(0);
    Box::new(move || start_time() + TimeDelta::seconds(tick.fetch_add(1, Ordering::SeqCst)))
}

/// Creates a session backed by a temporary record directory. Keep the
/// returned `TempDir` alive for the duration of the test.
pub fn test_session(client: FakeClient) -> (TempDir, Session) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = RecordStore::new(dir.path().join("prompts"));
    let session = Session::new(store, Box::new(client), TEST_MODEL)
        .system_message(TEST_SYSTEM_MESSAGE)
        .clock(ticking_clock());
    (dir, session)
}

pub fn read_json(session: &Session, file_name: &str) -> serde_json::Value {
    let text = fs::read_to_string(session.store().dir().join(file_name))
        .expect("Failed to read record");
    serde_json::from_str(&text).expect("Record is not valid JSON")
}

pub fn read_bytes(session: &Session, file_name: &str) -> Vec<u8> {
    fs::read(session.store().dir().join(file_name)).expect("Failed to read record")
}

//! Mock Backend State
//!
//! In-memory records, field descriptors and saved preferences, plus an
//! optional log of every request the server has seen.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tokio::sync::RwLock;

use crate::client::{EntityKind, FieldDescriptor, Record};

/// A request as seen by the mock backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Decoded query pairs in wire order
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_keys(&self) -> Vec<&str> {
        self.query.iter().map(|(k, _)| k.as_str()).collect()
    }
}

/// Shared state for all mock handlers
#[derive(Debug, Default)]
pub struct MockState {
    pub(crate) records: BTreeMap<EntityKind, Vec<Record>>,
    pub(crate) fields: BTreeMap<EntityKind, Vec<FieldDescriptor>>,
    /// Keyed by (token, category)
    pub(crate) preferences: RwLock<HashMap<(String, String), Vec<String>>>,
    accepted_token: Option<String>,
    recording: bool,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    /// Empty backend accepting any bearer token
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend seeded with demo records for every entity type
    pub fn demo() -> Self {
        let mut state = Self::new();
        for kind in EntityKind::ALL {
            state = state
                .with_fields(kind, super::fixtures::fields(kind))
                .with_records(kind, super::fixtures::records(kind));
        }
        state
    }

    pub fn with_records(mut self, kind: EntityKind, records: Vec<Record>) -> Self {
        self.records.insert(kind, records);
        self
    }

    pub fn with_fields(mut self, kind: EntityKind, fields: Vec<FieldDescriptor>) -> Self {
        self.fields.insert(kind, fields);
        self
    }

    /// Only accept this bearer token
    pub fn with_accepted_token(mut self, token: impl Into<String>) -> Self {
        self.accepted_token = Some(token.into());
        self
    }

    /// Keep every incoming request for later inspection
    ///
    /// Off by default; the log is unbounded.
    pub fn with_recording(mut self) -> Self {
        self.recording = true;
        self
    }

    pub fn accepts(&self, token: &str) -> bool {
        !token.is_empty()
            && self
                .accepted_token
                .as_deref()
                .map_or(true, |accepted| accepted == token)
    }

    pub fn records(&self, kind: EntityKind) -> &[Record] {
        self.records.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self, kind: EntityKind) -> &[FieldDescriptor] {
        self.fields.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.recording
    }

    pub(crate) fn record_request(&self, request: RecordedRequest) {
        if !self.recording {
            return;
        }
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
    }

    /// Every request recorded so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn clear_requests(&self) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str) -> RecordedRequest {
        RecordedRequest {
            method: "GET".to_string(),
            path: path.to_string(),
            query: vec![("limit".to_string(), "10".to_string())],
            authorization: Some("Bearer abc".to_string()),
        }
    }

    #[test]
    fn test_requests_not_kept_by_default() {
        let state = MockState::demo();
        state.record_request(request("/contacts"));
        assert!(state.requests().is_empty());
    }

    #[test]
    fn test_recording_keeps_requests_in_order() {
        let state = MockState::demo().with_recording();
        state.record_request(request("/contacts"));
        state.record_request(request("/deals"));

        let paths: Vec<String> = state.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/contacts", "/deals"]);
        assert_eq!(state.last_request().unwrap().query_value("limit"), Some("10"));

        state.clear_requests();
        assert!(state.requests().is_empty());
    }
}

//! In-memory backend
//!
//! Holds metadata entries and blobs in process memory. Used by tests and
//! local runs that should not need a NATS server.

use async_trait::async_trait;
use conflux_core::namespace::normalize_blob_path;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{Backend, ClientError, Result};

/// Backend storing everything in hash maps
///
/// Every object lookup is recorded so callers can check which paths
/// were requested.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    lookups: Mutex<Vec<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record as JSON under a metadata key
    pub fn insert_metadata<T: Serialize>(&self, key: &str, record: &T) {
        let raw = serde_json::to_vec(record).expect("record serializes to JSON");
        self.insert_raw_metadata(key, raw);
    }

    /// Stores raw bytes under a metadata key
    pub fn insert_raw_metadata(&self, key: &str, raw: Vec<u8>) {
        self.entries.lock().unwrap().insert(key.to_string(), raw);
    }

    /// Stores a blob; the path is normalized the same way lookups are
    pub fn insert_object(&self, path: &str, content: Vec<u8>) {
        self.objects
            .lock()
            .unwrap()
            .insert(normalize_blob_path(path), content);
    }

    /// Paths passed to `get_object`, in call order
    pub fn object_lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get_entry(&self, key: &str) -> Result<Vec<u8>> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(key.to_string()))
    }

    async fn get_object(&self, path: &str) -> Result<Vec<u8>> {
        self.lookups.lock().unwrap().push(path.to_string());

        self.objects
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(path.to_string()))
    }
}

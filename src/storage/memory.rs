/// In-process backend for tests and offline development
///
/// Same contract as the S3 backend without the network: objects live in a
/// map keyed by the prefixed title. The call counter backs the tests that
/// assert validation failures never reach the store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{full_key, ObjectStore, ProgressFn, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of put/get/delete calls that reached this store
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Whether an object exists under the full prefixed key
    pub fn contains(&self, prefixed_key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(prefixed_key)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        source: &Path,
        on_progress: ProgressFn,
    ) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let data = tokio::fs::read(source).await?;
        on_progress(100);
        self.objects.lock().unwrap().insert(full_key(key), data);
        Ok(())
    }

    async fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let objects = self.objects.lock().unwrap();
        let data = objects
            .get(&full_key(key))
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        if data.len() > max_bytes {
            return Err(StoreError::TooLarge { limit: max_bytes });
        }
        Ok(data.clone())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.objects.lock().unwrap().remove(&full_key(key)) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }
}

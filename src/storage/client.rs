/// Object store contract
///
/// The screen only needs three remote capabilities: put, get, delete against
/// a keyed blob store. Backends implement this trait; keys are namespaced
/// under the fixed bucket prefix. No retries anywhere: every failure is
/// surfaced once to the caller.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Bucket path prefix all objects live under
pub const KEY_PREFIX: &str = "uploads/";

/// Ceiling on download payloads (5 MiB)
pub const MAX_DOWNLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Progress callback fed with 0-100 as bytes are transferred
pub type ProgressFn = Box<dyn Fn(u8) + Send + Sync>;

/// Failures surfaced by the store; shown to the user once, never retried
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object does not exist: {0}")]
    NotFound(String),

    #[error("object exceeds the {limit} byte download limit")]
    TooLarge { limit: usize },

    #[error("could not read local file: {0}")]
    LocalIo(#[from] std::io::Error),

    #[error("storage configuration error: {0}")]
    Config(String),

    #[error("storage request failed: {0}")]
    Backend(#[from] s3::error::S3Error),
}

/// The three remote operations the screen is built on
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream a local file to the store under `key`, reporting transfer
    /// progress through the callback as an integer percent, rounded down.
    async fn put(
        &self,
        key: &str,
        source: &Path,
        on_progress: ProgressFn,
    ) -> Result<(), StoreError>;

    /// Fetch the object under `key`. Fails when the object is missing or
    /// larger than `max_bytes`; on success returns the raw bytes for the
    /// caller to decode.
    async fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, StoreError>;

    /// Remove the object under `key`; fails when it does not exist.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Join a user-supplied title onto the bucket prefix
pub(crate) fn full_key(key: &str) -> String {
    format!("{}{}", KEY_PREFIX, key)
}

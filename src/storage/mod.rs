/// Object storage module
///
/// This module handles:
/// - The `ObjectStore` contract shared by every backend (client.rs)
/// - The S3-compatible production backend (s3.rs)
/// - Upload progress accounting (progress.rs)
/// - An in-process backend for tests and offline development (memory.rs)

pub mod client;
pub mod memory;
pub mod progress;
pub mod s3;

pub use client::{ObjectStore, ProgressFn, StoreError, MAX_DOWNLOAD_BYTES};
pub use memory::MemoryStore;
pub use s3::S3Store;

/// S3-compatible production backend
///
/// Works against AWS S3 or any S3-compatible service (MinIO, Cloudflare R2).
/// The bucket, region, and credentials come from the environment; custom
/// endpoints switch the bucket to path-style addressing.

use std::env;
use std::path::Path;

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

use super::client::{full_key, ObjectStore, ProgressFn, StoreError};
use super::progress::ProgressReader;

const ENV_BUCKET: &str = "UPPIC_S3_BUCKET";
const ENV_REGION: &str = "UPPIC_S3_REGION";
const ENV_ENDPOINT: &str = "UPPIC_S3_ENDPOINT";

const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug)]
pub struct S3Store {
    bucket: Box<Bucket>,
}

impl S3Store {
    /// Build the store from the environment.
    ///
    /// `UPPIC_S3_BUCKET` names the bucket. `UPPIC_S3_REGION` selects the AWS
    /// region (defaults to us-east-1). Setting `UPPIC_S3_ENDPOINT` targets an
    /// S3-compatible service instead. Credentials resolve through the
    /// standard chain (environment variables, shared profile).
    pub fn from_env() -> Result<Self, StoreError> {
        let name = env::var(ENV_BUCKET)
            .map_err(|_| StoreError::Config(format!("{} is not set", ENV_BUCKET)))?;

        let region = match env::var(ENV_ENDPOINT) {
            Ok(endpoint) => Region::Custom {
                region: env::var(ENV_REGION).unwrap_or_else(|_| DEFAULT_REGION.to_string()),
                endpoint,
            },
            Err(_) => env::var(ENV_REGION)
                .unwrap_or_else(|_| DEFAULT_REGION.to_string())
                .parse()
                .map_err(|e| StoreError::Config(format!("invalid region: {}", e)))?,
        };

        let credentials =
            Credentials::default().map_err(|e| StoreError::Config(e.to_string()))?;

        let path_style = matches!(region, Region::Custom { .. });
        let mut bucket = Bucket::new(&name, region, credentials)
            .map_err(|e| StoreError::Config(e.to_string()))?;
        if path_style {
            bucket = bucket.with_path_style();
        }

        println!("☁️  Object store ready: bucket '{}'", name);

        Ok(S3Store { bucket: Box::new(bucket) })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        key: &str,
        source: &Path,
        on_progress: ProgressFn,
    ) -> Result<(), StoreError> {
        let file = tokio::fs::File::open(source).await?;
        let total = file.metadata().await?.len();
        let content_type = mime_guess::from_path(source).first_or_octet_stream();

        let mut reader = ProgressReader::new(file, total, on_progress);
        self.bucket
            .put_object_stream_with_content_type(
                &mut reader,
                full_key(key),
                content_type.essence_str(),
            )
            .await
            .map_err(|e| map_backend(key, e))?;

        println!("⬆️  Uploaded {} bytes to {}", total, full_key(key));
        Ok(())
    }

    async fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, StoreError> {
        let response = self
            .bucket
            .get_object(full_key(key))
            .await
            .map_err(|e| map_backend(key, e))?;

        let data = response.to_vec();
        if data.len() > max_bytes {
            return Err(StoreError::TooLarge { limit: max_bytes });
        }

        println!("⬇️  Downloaded {} bytes from {}", data.len(), full_key(key));
        Ok(data)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        // S3 DELETE succeeds on missing keys; probe first so a bad title
        // surfaces as an error like every other store failure.
        let (_, code) = self
            .bucket
            .head_object(full_key(key))
            .await
            .map_err(|e| map_backend(key, e))?;
        if code == 404 {
            return Err(StoreError::NotFound(key.to_string()));
        }

        self.bucket
            .delete_object(full_key(key))
            .await
            .map_err(|e| map_backend(key, e))?;

        println!("🗑️  Deleted {}", full_key(key));
        Ok(())
    }
}

/// Fold HTTP 404 into the not-found case; everything else is a backend error
fn map_backend(key: &str, err: S3Error) -> StoreError {
    match err {
        S3Error::HttpFailWithBody(404, _) => StoreError::NotFound(key.to_string()),
        other => StoreError::Backend(other),
    }
}

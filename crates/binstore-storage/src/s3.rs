use crate::remote::ObjectStoreStorage;
use crate::traits::{StorageError, StorageResult};
use crate::StorageBackend;
use object_store::aws::AmazonS3Builder;
use std::sync::Arc;

/// Connect to an S3 (or S3-compatible) bucket.
///
/// Region, credentials and a custom endpoint for S3-compatible providers
/// (e.g. MinIO) are read from the standard `AWS_*` environment variables.
pub fn connect(bucket: &str) -> StorageResult<ObjectStoreStorage> {
    let store = AmazonS3Builder::from_env()
        .with_bucket_name(bucket)
        .build()
        .map_err(|e| StorageError::ConfigError(e.to_string()))?;
    let store = Arc::new(store);

    tracing::debug!(bucket = %bucket, "S3 storage configured");

    Ok(ObjectStoreStorage::new(
        StorageBackend::S3,
        bucket,
        store.clone(),
        store,
    ))
}

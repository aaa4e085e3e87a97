use crate::remote::ObjectStoreStorage;
use crate::traits::{StorageError, StorageResult};
use crate::StorageBackend;
use object_store::gcp::GoogleCloudStorageBuilder;
use std::sync::Arc;

/// Connect to a Google Cloud Storage bucket.
///
/// Credentials come from `GOOGLE_SERVICE_ACCOUNT` / application default
/// credentials.
pub fn connect(bucket: &str) -> StorageResult<ObjectStoreStorage> {
    let store = GoogleCloudStorageBuilder::from_env()
        .with_bucket_name(bucket)
        .build()
        .map_err(|e| StorageError::ConfigError(e.to_string()))?;
    let store = Arc::new(store);

    tracing::debug!(bucket = %bucket, "GCS storage configured");

    Ok(ObjectStoreStorage::new(
        StorageBackend::Gcs,
        bucket,
        store.clone(),
        store,
    ))
}

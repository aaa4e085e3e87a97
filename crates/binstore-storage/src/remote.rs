//! Object-store backed storage
//!
//! One implementation serves every remote medium. The vendor modules (`s3`,
//! `azure`, `gcs`) only build the `object_store` client; puts, gets, copies and
//! URL signing are identical across them.

use crate::keys::{derive_key, validate_key};
use crate::signing::PRESIGNED_URL_TTL;
use crate::traits::{BinarySource, BinaryStorage, BlobContent, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use binstore_core::BinaryRef;
use futures::StreamExt;
use http::Method;
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStoreExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Content type recorded when the caller does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Time-limited GET URLs for objects in a remote store.
///
/// Implemented for every `object_store` client with native signing.
#[async_trait]
pub trait RemoteSigner: Send + Sync {
    async fn signed_get_url(&self, location: &Path, expires_in: Duration) -> StorageResult<String>;
}

#[async_trait]
impl<T: Signer> RemoteSigner for T {
    async fn signed_get_url(&self, location: &Path, expires_in: Duration) -> StorageResult<String> {
        let url = self
            .signed_url(Method::GET, location, expires_in)
            .await
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        Ok(url.to_string())
    }
}

/// Remote object storage implementation
#[derive(Clone)]
pub struct ObjectStoreStorage {
    store: Arc<dyn object_store::ObjectStore>,
    signer: Arc<dyn RemoteSigner>,
    backend: StorageBackend,
    /// Bucket or container name, for logs.
    location: String,
}

impl ObjectStoreStorage {
    pub fn new(
        backend: StorageBackend,
        location: impl Into<String>,
        store: Arc<dyn object_store::ObjectStore>,
        signer: Arc<dyn RemoteSigner>,
    ) -> Self {
        ObjectStoreStorage {
            store,
            signer,
            backend,
            location: location.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn object_path(key: &str) -> StorageResult<Path> {
        validate_key(key)?;
        Path::parse(key).map_err(|e| StorageError::InvalidKey(e.to_string()))
    }
}

#[async_trait]
impl BinaryStorage for ObjectStoreStorage {
    async fn write_file(
        &self,
        key: &str,
        content_type: Option<&str>,
        mut source: BinarySource,
    ) -> StorageResult<()> {
        let location = Self::object_path(key)?;
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string()),
        );

        // Buffers up to one part in memory, then switches to a multipart upload.
        // Nothing becomes visible until shutdown completes the upload.
        let mut writer =
            BufWriter::new(Arc::clone(&self.store), location).with_attributes(attributes);

        let result = match tokio::io::copy(&mut source, &mut writer).await {
            Ok(size) => writer.shutdown().await.map(|_| size),
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(
                        error = %abort_err,
                        bucket = %self.location,
                        key = %key,
                        "Failed to abort remote upload"
                    );
                }
                Err(e)
            }
        };

        let size = result.map_err(|e| {
            tracing::error!(
                error = %e,
                backend = %self.backend,
                bucket = %self.location,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Remote storage write failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            backend = %self.backend,
            bucket = %self.location,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote storage write successful"
        );

        Ok(())
    }

    async fn read_file(&self, key: &str) -> StorageResult<BlobContent> {
        let location = Self::object_path(key)?;
        let start = std::time::Instant::now();

        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    backend = %self.backend,
                    bucket = %self.location,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Remote storage read failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());

        let bucket = self.location.clone();
        let key = key.to_string();
        let stream = result.into_stream().map(move |res| {
            res.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Remote storage stream read error"
                );
                StorageError::DownloadFailed(e.to_string())
            })
        });

        Ok(BlobContent::new(Box::pin(stream), content_type))
    }

    async fn copy_file(&self, source_key: &str, destination_key: &str) -> StorageResult<()> {
        let from = Self::object_path(source_key)?;
        let to = Self::object_path(destination_key)?;
        let start = std::time::Instant::now();

        self.store.copy(&from, &to).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(source_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    backend = %self.backend,
                    bucket = %self.location,
                    from_key = %source_key,
                    to_key = %destination_key,
                    "Remote storage copy failed"
                );
                StorageError::CopyFailed(other.to_string())
            }
        })?;

        tracing::info!(
            backend = %self.backend,
            bucket = %self.location,
            from_key = %source_key,
            to_key = %destination_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote storage copy successful"
        );

        Ok(())
    }

    async fn get_presigned_url(&self, binary: &BinaryRef) -> StorageResult<String> {
        let key = derive_key(binary);
        let location = Self::object_path(key.as_str())?;
        self.signer
            .signed_get_url(&location, PRESIGNED_URL_TTL)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    backend = %self.backend,
                    key = %key,
                    "Remote storage URL signing failed"
                );
            })
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}

//! Binary storage abstraction trait
//!
//! This module defines the `BinaryStorage` trait that every backend implements,
//! along with the error type and the stream handles that cross the boundary.

use crate::keys::{derive_key, StorageKey};
use crate::StorageBackend;
use async_trait::async_trait;
use binstore_core::{check_file_metadata, BinaryRef, MetadataError};
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Binary storage not initialized")]
    Uninitialized,

    #[error(transparent)]
    InvalidMetadata(#[from] MetadataError),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("URL signing failed: {0}")]
    SigningFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Failures of the underlying medium during write, read, copy or sign.
    ///
    /// These are surfaced as-is; retrying is the caller's decision.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_)
                | StorageError::DownloadFailed(_)
                | StorageError::CopyFailed(_)
                | StorageError::SigningFailed(_)
                | StorageError::IoError(_)
        )
    }

    /// Errors caused by the request rather than by storage.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StorageError::InvalidMetadata(_) | StorageError::InvalidKey(_) | StorageError::NotFound(_)
        )
    }

    /// HTTP status the server layer should answer with.
    pub fn http_status_code(&self) -> u16 {
        match self {
            StorageError::InvalidMetadata(_) | StorageError::InvalidKey(_) => 400,
            StorageError::NotFound(_) => 404,
            _ => 500,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Input bytes for a write. Owned and consumed exactly once by the backend.
pub type BinarySource = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Chunked output of a read.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Stored bytes as returned by a read, plus the content type when the medium
/// records one.
pub struct BlobContent {
    content_type: Option<String>,
    stream: ByteStream,
}

impl BlobContent {
    pub fn new(stream: ByteStream, content_type: Option<String>) -> Self {
        BlobContent {
            content_type,
            stream,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn into_stream(self) -> ByteStream {
        self.stream
    }

    /// Adapt the stream into an `AsyncRead` for callers that pipe bytes with `tokio::io::copy`.
    pub fn into_async_read(self) -> impl AsyncRead + Send + Unpin {
        tokio_util::io::StreamReader::new(self.stream.map_err(std::io::Error::other))
    }
}

impl std::fmt::Debug for BlobContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobContent")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Binary storage abstraction trait
///
/// All backends (local filesystem, S3, Azure Blob, GCS) implement the
/// key-addressed primitives. The `BinaryRef`-addressed operations are
/// provided on top of them so addressing and metadata validation behave
/// identically on every medium.
///
/// **Key format:** `binary/{id}/{versionId}`, see the `keys` module.
#[async_trait]
pub trait BinaryStorage: Send + Sync {
    /// Validate upload metadata, then store `source` under the binary's key.
    ///
    /// Nothing is written when validation fails.
    async fn write_binary(
        &self,
        binary: &BinaryRef,
        filename: Option<&str>,
        content_type: Option<&str>,
        source: BinarySource,
    ) -> StorageResult<()> {
        check_file_metadata(filename, content_type)?;
        let key = derive_key(binary);
        self.write_file(key.as_str(), content_type, source).await
    }

    /// Store `source` under `key` without metadata validation.
    ///
    /// The source is drained to EOF. On failure no object is left at `key`.
    async fn write_file(
        &self,
        key: &str,
        content_type: Option<&str>,
        source: BinarySource,
    ) -> StorageResult<()>;

    /// Open the stored bytes for a binary. Fails with `NotFound` when absent.
    async fn read_binary(&self, binary: &BinaryRef) -> StorageResult<BlobContent> {
        let key = derive_key(binary);
        self.read_file(key.as_str()).await
    }

    /// Open the stored bytes at `key`.
    async fn read_file(&self, key: &str) -> StorageResult<BlobContent>;

    /// Duplicate the bytes of one binary onto another without streaming them
    /// through the caller.
    async fn copy_binary(&self, source: &BinaryRef, destination: &BinaryRef) -> StorageResult<()> {
        let from: StorageKey = derive_key(source);
        let to: StorageKey = derive_key(destination);
        self.copy_file(from.as_str(), to.as_str()).await
    }

    /// Key-addressed copy.
    async fn copy_file(&self, source_key: &str, destination_key: &str) -> StorageResult<()>;

    /// URL granting time-limited read access to the binary.
    async fn get_presigned_url(&self, binary: &BinaryRef) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_not_client_errors() {
        let errors = [
            StorageError::UploadFailed("x".into()),
            StorageError::DownloadFailed("x".into()),
            StorageError::CopyFailed("x".into()),
            StorageError::SigningFailed("x".into()),
            StorageError::IoError(std::io::Error::other("x")),
        ];
        for err in errors {
            assert!(err.is_transport_failure(), "{err}");
            assert!(!err.is_client_error(), "{err}");
            assert_eq!(err.http_status_code(), 500);
        }
    }

    #[test]
    fn metadata_errors_map_to_bad_request() {
        let err: StorageError = MetadataError::BlockedContentType {
            content_type: "application/x-sh".into(),
        }
        .into();
        assert!(err.is_client_error());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.to_string(), "Invalid content type: application/x-sh");
    }

    #[test]
    fn not_found_and_uninitialized_codes() {
        assert_eq!(StorageError::NotFound("k".into()).http_status_code(), 404);
        let uninit = StorageError::Uninitialized;
        assert_eq!(uninit.http_status_code(), 500);
        assert!(!uninit.is_transport_failure());
    }

    #[tokio::test]
    async fn blob_content_reads_as_async_read() {
        use tokio::io::AsyncReadExt;

        let chunks: Vec<Result<Bytes, StorageError>> =
            vec![Ok(Bytes::from_static(b"hello ")), Ok(Bytes::from_static(b"world"))];
        let content = BlobContent::new(
            Box::pin(futures::stream::iter(chunks)),
            Some("text/plain".into()),
        );
        assert_eq!(content.content_type(), Some("text/plain"));

        let mut reader = content.into_async_read();
        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "hello world");
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use binstore_storage::{
    BinarySource, BinaryStorage, BlobContent, LocalStorage, ObjectStoreStorage, RemoteSigner,
    StorageBackend, StorageResult,
};
use futures::TryStreamExt;
use object_store::memory::InMemory;
use object_store::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const BASE_URL: &str = "https://storage.example.com/files";

/// Signer for in-memory stores, which have no native URL signing.
pub struct TestSigner;

#[async_trait]
impl RemoteSigner for TestSigner {
    async fn signed_get_url(&self, location: &Path, expires_in: Duration) -> StorageResult<String> {
        Ok(format!(
            "https://remote.example.com/{}?X-Amz-Expires={}",
            location,
            expires_in.as_secs()
        ))
    }
}

pub fn source(data: &[u8]) -> BinarySource {
    Box::pin(std::io::Cursor::new(data.to_vec()))
}

pub async fn read_all(content: BlobContent) -> Vec<u8> {
    let chunks: Vec<bytes::Bytes> = content.into_stream().try_collect().await.unwrap();
    chunks.concat()
}

pub async fn local_backend() -> (Arc<dyn BinaryStorage>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), BASE_URL.to_string())
        .await
        .unwrap();
    (Arc::new(storage), dir)
}

pub fn memory_backend(backend: StorageBackend) -> Arc<dyn BinaryStorage> {
    Arc::new(ObjectStoreStorage::new(
        backend,
        "test-bucket",
        Arc::new(InMemory::new()),
        Arc::new(TestSigner),
    ))
}

/// One instance of every backend variant, for contract tests.
pub async fn all_backends() -> (Vec<Arc<dyn BinaryStorage>>, TempDir) {
    let (local, dir) = local_backend().await;
    let backends = vec![
        local,
        memory_backend(StorageBackend::S3),
        memory_backend(StorageBackend::Azure),
        memory_backend(StorageBackend::Gcs),
    ];
    (backends, dir)
}

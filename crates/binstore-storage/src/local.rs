use crate::keys::validate_key;
use crate::signing::{build_presigned_url, LocalUrlSigner, PRESIGNED_URL_TTL};
use crate::traits::{BinarySource, BinaryStorage, BlobContent, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use binstore_core::{BinaryRef, StorageConfig};
use chrono::Utc;
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage implementation
///
/// Objects live at `{base_path}/binary/{id}/{versionId}`. Writes go to a
/// temporary sibling file that is renamed onto the target once complete, so
/// readers never observe a partially written object.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    signer: Option<LocalUrlSigner>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for blob storage (e.g., "/var/lib/binstore")
    /// * `base_url` - Base URL the root is served under (e.g., "https://storage.example.com/binary")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            signer: None,
        })
    }

    /// Create a LocalStorage using the base URL and signing key from `config`.
    pub async fn from_config(
        base_path: impl Into<PathBuf>,
        config: &StorageConfig,
    ) -> StorageResult<Self> {
        let storage = Self::new(base_path, config.storage_base_url().to_string()).await?;
        match config.signing_key() {
            Some(pem) => {
                let signer = LocalUrlSigner::from_pem(pem, config.signing_key_passphrase())?;
                Ok(storage.with_signer(signer))
            }
            None => Ok(storage),
        }
    }

    /// Sign presigned URLs with `signer`.
    pub fn with_signer(mut self, signer: LocalUrlSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;
        let mut path = self.base_path.clone();
        for segment in storage_key.split('/') {
            path.push(segment);
        }
        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

/// Whether an I/O error means nothing exists at the path.
fn is_missing(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

/// Temporary file next to a write target, removed unless committed.
///
/// Dropping the guard (error or cancelled future) deletes the temp file, so an
/// abandoned write leaves nothing behind at the target path.
struct PendingFile {
    temp_path: PathBuf,
    committed: bool,
}

impl PendingFile {
    fn beside(target: &Path) -> Self {
        let name = format!("_partial-{}", uuid::Uuid::new_v4());
        let temp_path = target.with_file_name(name);
        PendingFile {
            temp_path,
            committed: false,
        }
    }

    async fn commit(mut self, target: &Path) -> std::io::Result<()> {
        fs::rename(&self.temp_path, target).await?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = std::fs::remove_file(&self.temp_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %self.temp_path.display(),
                        error = %e,
                        "Failed to remove partial upload"
                    );
                }
            }
        }
    }
}

#[async_trait]
impl BinaryStorage for LocalStorage {
    async fn write_file(
        &self,
        key: &str,
        _content_type: Option<&str>,
        mut source: BinarySource,
    ) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let pending = PendingFile::beside(&path);
        let mut file = fs::File::create(&pending.temp_path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut source, &mut file).await.map_err(|e| {
            tracing::error!(
                path = %path.display(),
                key = %key,
                error = %e,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Local storage write failed"
            );
            StorageError::UploadFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;
        drop(file);

        pending.commit(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to commit file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(())
    }

    async fn read_file(&self, key: &str) -> StorageResult<BlobContent> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        let missing = || StorageError::NotFound(key.to_string());
        let open_failed = |e: std::io::Error| {
            tracing::error!(
                path = %path.display(),
                key = %key,
                error = %e,
                "Local storage read failed"
            );
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        };

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if is_missing(&e) => return Err(missing()),
            Err(e) => return Err(open_failed(e)),
        };
        // Opening a directory succeeds on unix; only regular files are objects.
        let metadata = file.metadata().await.map_err(open_failed)?;
        if !metadata.is_file() {
            return Err(missing());
        }

        let key = key.to_string();
        let path_display = path.display().to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(
                    path = %path_display,
                    key = %key,
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream read error"
                );
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        tracing::debug!(path = %path.display(), "Local storage read opened");

        Ok(BlobContent::new(Box::pin(stream), None))
    }

    async fn copy_file(&self, source_key: &str, destination_key: &str) -> StorageResult<()> {
        let from_path = self.key_to_path(source_key)?;
        let to_path = self.key_to_path(destination_key)?;
        let start = std::time::Instant::now();

        let copy_failed = |e: std::io::Error| {
            tracing::error!(
                from_key = %source_key,
                to_key = %destination_key,
                error = %e,
                "Local storage copy failed"
            );
            StorageError::CopyFailed(format!(
                "Failed to copy {} to {}: {}",
                from_path.display(),
                to_path.display(),
                e
            ))
        };

        match fs::metadata(&from_path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(StorageError::NotFound(source_key.to_string())),
            Err(e) if is_missing(&e) => {
                return Err(StorageError::NotFound(source_key.to_string()))
            }
            Err(e) => return Err(copy_failed(e)),
        }

        self.ensure_parent_dir(&to_path).await?;

        let pending = PendingFile::beside(&to_path);
        let copied = match fs::copy(&from_path, &pending.temp_path).await {
            Ok(size) => size,
            Err(e) => {
                // Source removed between the stat and the copy
                if is_missing(&e) && matches!(fs::try_exists(&from_path).await, Ok(false)) {
                    return Err(StorageError::NotFound(source_key.to_string()));
                }
                return Err(copy_failed(e));
            }
        };
        pending.commit(&to_path).await.map_err(copy_failed)?;

        tracing::info!(
            from_key = %source_key,
            to_key = %destination_key,
            size_bytes = copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage copy successful"
        );

        Ok(())
    }

    async fn get_presigned_url(&self, binary: &BinaryRef) -> StorageResult<String> {
        let expires_in = chrono::Duration::from_std(PRESIGNED_URL_TTL)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        let url = build_presigned_url(
            &self.base_url,
            binary,
            Utc::now() + expires_in,
            self.signer.as_ref(),
        )?;
        Ok(url.into())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

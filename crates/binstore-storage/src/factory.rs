#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{BinaryStorage, StorageBackend, StorageError, StorageResult};
use binstore_core::StorageConfig;
use std::path::PathBuf;
use std::sync::Arc;

/// Parsed `<scheme>:<location>` backend selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// `file:<dir>` or `local:<dir>`
    Local(PathBuf),
    /// `s3:<bucket>`
    S3(String),
    /// `azure:<container>`
    Azure(String),
    /// `gs:<bucket>`
    Gcs(String),
}

impl StorageLocation {
    /// Parse a configuration string. Unknown schemes and empty locations yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let (scheme, location) = value.trim().split_once(':')?;
        if location.is_empty() {
            return None;
        }
        match scheme {
            "file" | "local" => Some(StorageLocation::Local(PathBuf::from(location))),
            "s3" => Some(StorageLocation::S3(location.to_string())),
            "azure" => Some(StorageLocation::Azure(location.to_string())),
            "gs" => Some(StorageLocation::Gcs(location.to_string())),
            _ => None,
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self {
            StorageLocation::Local(_) => StorageBackend::Local,
            StorageLocation::S3(_) => StorageBackend::S3,
            StorageLocation::Azure(_) => StorageBackend::Azure,
            StorageLocation::Gcs(_) => StorageBackend::Gcs,
        }
    }
}

/// Create a storage backend for `location`
pub async fn create_storage(
    location: &StorageLocation,
    config: &StorageConfig,
) -> StorageResult<Arc<dyn BinaryStorage>> {
    match location {
        #[cfg(feature = "storage-local")]
        StorageLocation::Local(base_path) => {
            let storage = LocalStorage::from_config(base_path.clone(), config).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-s3")]
        StorageLocation::S3(bucket) => Ok(Arc::new(crate::s3::connect(bucket)?)),

        #[cfg(feature = "storage-azure")]
        StorageLocation::Azure(container) => Ok(Arc::new(crate::azure::connect(container)?)),

        #[cfg(feature = "storage-gcs")]
        StorageLocation::Gcs(bucket) => Ok(Arc::new(crate::gcs::connect(bucket)?)),

        #[allow(unreachable_patterns)]
        other => {
            let _ = config;
            Err(StorageError::ConfigError(format!(
                "{} storage backend not available (feature not enabled)",
                other.backend()
            )))
        }
    }
}

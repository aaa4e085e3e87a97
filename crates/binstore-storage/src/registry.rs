//! Storage registry
//!
//! Holds the single active backend. The application constructs one registry at
//! startup, initializes it from the configured selector string, and hands it
//! (or the `Arc<dyn BinaryStorage>` from [`StorageRegistry::current`]) to
//! whatever needs storage. Callers only ever see the trait object.

use crate::factory::{create_storage, StorageLocation};
use crate::{BinaryStorage, StorageBackend, StorageError, StorageResult};
use binstore_core::StorageConfig;
use std::sync::Arc;

#[derive(Default, Clone)]
pub struct StorageRegistry {
    active: Option<Arc<dyn BinaryStorage>>,
}

impl StorageRegistry {
    /// An uninitialized registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `config.binary_storage`.
    pub async fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        let mut registry = Self::new();
        if let Some(selector) = config.binary_storage() {
            registry.initialize(selector, config).await?;
        }
        Ok(registry)
    }

    /// Replace the active backend with the one `selector` names.
    ///
    /// The previous backend is dropped first. An unrecognized scheme or empty
    /// location leaves the registry uninitialized; a recognized one whose
    /// backend fails to build returns that error and also leaves it
    /// uninitialized.
    pub async fn initialize(&mut self, selector: &str, config: &StorageConfig) -> StorageResult<()> {
        self.active = None;

        let Some(location) = StorageLocation::parse(selector) else {
            tracing::warn!(
                selector = %selector,
                "Unrecognized binary storage configuration; storage is uninitialized"
            );
            return Ok(());
        };

        let storage = create_storage(&location, config).await.inspect_err(|e| {
            tracing::error!(
                backend = %location.backend(),
                error = %e,
                "Failed to initialize binary storage"
            );
        })?;

        let backend = storage.backend_type();
        let url_signing = if backend.has_native_signing() {
            "native"
        } else if config.signing_key().is_some() {
            "ed25519"
        } else {
            "unsigned"
        };
        tracing::info!(
            backend = %backend,
            url_signing = url_signing,
            "Binary storage initialized"
        );
        self.active = Some(storage);
        Ok(())
    }

    /// Install an already-built backend, replacing any prior one.
    pub fn install(&mut self, storage: Arc<dyn BinaryStorage>) {
        self.active = Some(storage);
    }

    /// The active backend.
    pub fn current(&self) -> StorageResult<Arc<dyn BinaryStorage>> {
        self.active.clone().ok_or(StorageError::Uninitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.active.is_some()
    }

    pub fn backend_type(&self) -> Option<StorageBackend> {
        self.active.as_ref().map(|storage| storage.backend_type())
    }
}

impl std::fmt::Debug for StorageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageRegistry")
            .field("backend", &self.backend_type())
            .finish()
    }
}

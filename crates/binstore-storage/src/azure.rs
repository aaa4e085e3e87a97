use crate::remote::ObjectStoreStorage;
use crate::traits::{StorageError, StorageResult};
use crate::StorageBackend;
use object_store::azure::MicrosoftAzureBuilder;
use std::sync::Arc;

/// Connect to an Azure Blob Storage container.
///
/// The account name and credentials come from the `AZURE_STORAGE_*`
/// environment variables.
pub fn connect(container: &str) -> StorageResult<ObjectStoreStorage> {
    let store = MicrosoftAzureBuilder::from_env()
        .with_container_name(container)
        .build()
        .map_err(|e| StorageError::ConfigError(e.to_string()))?;
    let store = Arc::new(store);

    tracing::debug!(container = %container, "Azure Blob storage configured");

    Ok(ObjectStoreStorage::new(
        StorageBackend::Azure,
        container,
        store.clone(),
        store,
    ))
}

//! Binstore Storage Library
//!
//! This crate provides the binary storage abstraction and its implementations.
//! It includes the `BinaryStorage` trait, a local filesystem backend, and an
//! object-store backend shared by S3, Azure Blob Storage and Google Cloud
//! Storage.
//!
//! # Storage key format
//!
//! All backends use the same key layout: `binary/{id}/{versionId}`, with
//! `binary/{id}/_current` for a binary without a version id. Keys must not
//! contain `..`, empty segments or a leading `/`. Key generation is
//! centralized in the `keys` module so all backends stay consistent.
//!
//! # Selecting a backend
//!
//! `StorageRegistry::initialize` takes a `<scheme>:<location>` string:
//! `file:<dir>`, `s3:<bucket>`, `azure:<container>` or `gs:<bucket>`.

#[cfg(feature = "storage-azure")]
pub mod azure;
pub mod factory;
#[cfg(feature = "storage-gcs")]
pub mod gcs;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod registry;
#[cfg(feature = "object-store")]
pub mod remote;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

// Re-export commonly used types
pub use binstore_core::{BinaryRef, StorageBackend};
pub use factory::{create_storage, StorageLocation};
pub use keys::{derive_key, StorageKey};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use registry::StorageRegistry;
#[cfg(feature = "object-store")]
pub use remote::{ObjectStoreStorage, RemoteSigner};
pub use signing::LocalUrlSigner;
pub use traits::{
    BinarySource, BinaryStorage, BlobContent, ByteStream, StorageError, StorageResult,
};

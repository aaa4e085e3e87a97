//! Binstore Core Library
//!
//! This crate provides the record projection, backend kinds, configuration and
//! upload metadata validation shared by the storage backends and their callers.

pub mod binary_ref;
pub mod config;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use binary_ref::{BinaryRef, RefError};
pub use config::StorageConfig;
pub use storage_types::StorageBackend;
pub use validation::{check_file_metadata, MetadataError};

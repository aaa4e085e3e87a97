//! Validation modules

pub mod file_metadata;

pub use file_metadata::{
    check_file_metadata, is_blocked_content_type, is_blocked_extension, MetadataError,
    BLOCKED_CONTENT_TYPES, BLOCKED_FILE_EXTENSIONS,
};

//! Upload metadata validation
//!
//! Rejects uploads whose filename or declared content type identifies an
//! executable, installer or script. Runs before any byte reaches a backend.
//!
//! - Filename: case-insensitive suffix match against [`BLOCKED_FILE_EXTENSIONS`]
//! - Content type: case-insensitive exact match against [`BLOCKED_CONTENT_TYPES`]
//!
//! A missing filename or content type is never itself a rejection.

/// Extensions of files that may execute on the machine that opens them.
pub const BLOCKED_FILE_EXTENSIONS: &[&str] = &[
    ".ade",
    ".adp",
    ".apk",
    ".appx",
    ".appxbundle",
    ".bat",
    ".cab",
    ".chm",
    ".cmd",
    ".com",
    ".cpl",
    ".dll",
    ".dmg",
    ".ex",
    ".ex_",
    ".exe",
    ".hta",
    ".ins",
    ".isp",
    ".iso",
    ".jar",
    ".jse",
    ".lib",
    ".lnk",
    ".mde",
    ".msc",
    ".msi",
    ".msix",
    ".msixbundle",
    ".msp",
    ".mst",
    ".nsh",
    ".php",
    ".pif",
    ".ps1",
    ".scr",
    ".sct",
    ".shb",
    ".sys",
    ".vb",
    ".vbe",
    ".vbs",
    ".vxd",
    ".wsc",
    ".wsf",
    ".wsh",
];

/// MIME types of executables and installers.
pub const BLOCKED_CONTENT_TYPES: &[&str] = &[
    "application/java-archive",
    "application/x-msdownload",
    "application/x-sh",
    "application/vnd.apple.installer+xml",
    "application/vnd.microsoft.portable-executable",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("Invalid file extension: {filename}")]
    BlockedExtension { filename: String },

    #[error("Invalid content type: {content_type}")]
    BlockedContentType { content_type: String },
}

/// Check a proposed filename / content type pair.
///
/// The extension check runs first; its failure is the one reported when both
/// values are blocked.
pub fn check_file_metadata(
    filename: Option<&str>,
    content_type: Option<&str>,
) -> Result<(), MetadataError> {
    if let Some(name) = filename.filter(|name| is_blocked_extension(name)) {
        return Err(MetadataError::BlockedExtension {
            filename: name.to_string(),
        });
    }
    if let Some(ct) = content_type.filter(|ct| is_blocked_content_type(ct)) {
        return Err(MetadataError::BlockedContentType {
            content_type: ct.to_string(),
        });
    }
    Ok(())
}

pub fn is_blocked_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    BLOCKED_FILE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
}

pub fn is_blocked_content_type(content_type: &str) -> bool {
    let lower = content_type.to_lowercase();
    BLOCKED_CONTENT_TYPES.contains(&lower.as_str())
}

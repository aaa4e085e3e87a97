//! Shared helpers for the binstore command-line tool.

use anyhow::Context;
use binstore_storage::BinaryRef;

/// Parse `<id>` or `<id>/<versionId>` into a binary reference.
pub fn parse_binary_ref(value: &str) -> anyhow::Result<BinaryRef> {
    let binary = match value.split_once('/') {
        Some((id, version)) => BinaryRef::versioned(id, version),
        None => BinaryRef::new(value, None),
    };
    binary.with_context(|| format!("Invalid binary reference '{}'", value))
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// One variant per supported medium. The set is closed: every backend in
/// `binstore-storage` reports exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    S3,
    Azure,
    Gcs,
}

impl StorageBackend {
    /// Whether the medium can mint its own time-limited URLs.
    pub fn has_native_signing(&self) -> bool {
        !matches!(self, StorageBackend::Local)
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "file" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            "azure" => Ok(StorageBackend::Azure),
            "gcs" | "gs" => Ok(StorageBackend::Gcs),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Azure => write!(f, "azure"),
            StorageBackend::Gcs => write!(f, "gcs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!("FILE".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert_eq!("gs".parse::<StorageBackend>().unwrap(), StorageBackend::Gcs);
        assert_eq!("Azure".parse::<StorageBackend>().unwrap(), StorageBackend::Azure);
        assert!("nfs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn only_local_lacks_native_signing() {
        assert!(!StorageBackend::Local.has_native_signing());
        assert!(StorageBackend::S3.has_native_signing());
        assert!(StorageBackend::Azure.has_native_signing());
        assert!(StorageBackend::Gcs.has_native_signing());
    }

    #[test]
    fn display_matches_serde_name() {
        for backend in [
            StorageBackend::Local,
            StorageBackend::S3,
            StorageBackend::Azure,
            StorageBackend::Gcs,
        ] {
            let json = serde_json::to_string(&backend).unwrap();
            assert_eq!(json, format!("\"{}\"", backend));
        }
    }
}

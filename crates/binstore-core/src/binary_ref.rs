//! Binary record projection
//!
//! Storage only needs two fields from a binary record: its logical id and,
//! optionally, the version id from `meta.versionId`. [`BinaryRef`] is that
//! projection. Both values are validated on construction so that they can be
//! used verbatim as path segments and object-store key segments.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;

/// Maximum length of an id or version id.
pub const MAX_ID_LENGTH: usize = 64;

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-\.]{1,64}$").expect("id pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefError {
    #[error("Invalid binary id '{0}'")]
    InvalidId(String),

    #[error("Invalid binary version id '{0}'")]
    InvalidVersionId(String),
}

/// Identifies a stored blob by `(id, version_id)`.
///
/// Two refs with equal pairs address the same stored bytes. A missing
/// `version_id` addresses the current, unversioned blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BinaryResource", into = "BinaryResource")]
pub struct BinaryRef {
    id: String,
    version_id: Option<String>,
}

impl BinaryRef {
    pub fn new(id: impl Into<String>, version_id: Option<String>) -> Result<Self, RefError> {
        let id = id.into();
        if !is_valid_segment(&id) {
            return Err(RefError::InvalidId(id));
        }
        if let Some(ref version) = version_id {
            if !is_valid_segment(version) {
                return Err(RefError::InvalidVersionId(version.clone()));
            }
        }
        Ok(BinaryRef { id, version_id })
    }

    /// Shorthand for a versioned ref.
    pub fn versioned(id: impl Into<String>, version_id: impl Into<String>) -> Result<Self, RefError> {
        Self::new(id, Some(version_id.into()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }
}

impl Display for BinaryRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.version_id {
            Some(ref version) => write!(f, "Binary/{}/_history/{}", self.id, version),
            None => write!(f, "Binary/{}", self.id),
        }
    }
}

fn is_valid_segment(value: &str) -> bool {
    // "." and ".." pass the pattern but are not usable as path segments
    ID_PATTERN.is_match(value) && !value.chars().all(|c| c == '.')
}

/// Wire shape of a binary record: `{ "id": ..., "meta": { "versionId": ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinaryResource {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<BinaryMeta>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinaryMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version_id: Option<String>,
}

impl TryFrom<BinaryResource> for BinaryRef {
    type Error = RefError;

    fn try_from(resource: BinaryResource) -> Result<Self, Self::Error> {
        let version_id = resource.meta.and_then(|meta| meta.version_id);
        BinaryRef::new(resource.id, version_id)
    }
}

impl From<BinaryRef> for BinaryResource {
    fn from(binary: BinaryRef) -> Self {
        BinaryResource {
            id: binary.id,
            meta: binary.version_id.map(|version_id| BinaryMeta {
                version_id: Some(version_id),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_fhir_ids() {
        let binary = BinaryRef::versioned("abc-123.X", "1").unwrap();
        assert_eq!(binary.id(), "abc-123.X");
        assert_eq!(binary.version_id(), Some("1"));
    }

    #[test]
    fn rejects_unsafe_segments() {
        assert!(matches!(BinaryRef::new("", None), Err(RefError::InvalidId(_))));
        assert!(matches!(BinaryRef::new("..", None), Err(RefError::InvalidId(_))));
        assert!(matches!(BinaryRef::new("a/b", None), Err(RefError::InvalidId(_))));
        assert!(matches!(
            BinaryRef::versioned("abc", "_current"),
            Err(RefError::InvalidVersionId(_))
        ));
        assert!(matches!(
            BinaryRef::versioned("abc", "v1/../../etc"),
            Err(RefError::InvalidVersionId(_))
        ));
        assert!(BinaryRef::new("a".repeat(MAX_ID_LENGTH + 1), None).is_err());
    }

    #[test]
    fn deserializes_record_projection() {
        let binary: BinaryRef =
            serde_json::from_str(r#"{"id":"abc","meta":{"versionId":"v1","lastUpdated":"x"}}"#)
                .unwrap();
        assert_eq!(binary, BinaryRef::versioned("abc", "v1").unwrap());

        let unversioned: BinaryRef = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(unversioned.version_id(), None);

        let invalid = serde_json::from_str::<BinaryRef>(r#"{"id":"../etc"}"#);
        assert!(invalid.is_err());
    }

    #[test]
    fn serializes_record_projection() {
        let binary = BinaryRef::versioned("abc", "v1").unwrap();
        let json = serde_json::to_value(&binary).unwrap();
        assert_eq!(json, serde_json::json!({"id": "abc", "meta": {"versionId": "v1"}}));
    }
}

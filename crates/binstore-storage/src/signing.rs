//! Presigned URLs for the local filesystem backend
//!
//! The filesystem has no native URL signing, so local blobs are served by
//! whatever component fronts `storage_base_url`, and access is granted by a URL
//! of the form
//!
//! ```text
//! {storage_base_url}/{id}/{versionId}?Expires={epochMillis}[&Signature={base64}]
//! ```
//!
//! When a signing key is configured, `Signature` is an Ed25519 signature over
//! the URL's serialized form up to but excluding the `Signature` parameter
//! (see [`canonical_form`]). Without a key the URL carries only `Expires`.
//! Verification belongs to the serving component; [`verify_presigned_url`]
//! is provided for it.

use crate::keys::version_segment;
use crate::traits::{StorageError, StorageResult};
use base64::{engine::general_purpose, Engine as _};
use binstore_core::BinaryRef;
use chrono::{DateTime, Utc};
use ed25519_dalek::pkcs8::DecodePrivateKey;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::time::Duration;
use url::Url;

/// Lifetime of every presigned URL, local or remote.
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(3600);

pub const EXPIRES_PARAM: &str = "Expires";
pub const SIGNATURE_PARAM: &str = "Signature";

/// Signs local presigned URLs.
#[derive(Clone)]
pub struct LocalUrlSigner {
    signing_key: SigningKey,
}

impl LocalUrlSigner {
    pub fn new(signing_key: SigningKey) -> Self {
        LocalUrlSigner { signing_key }
    }

    /// Load a PKCS#8 PEM Ed25519 private key, encrypted when a passphrase is given.
    pub fn from_pem(pem: &str, passphrase: Option<&str>) -> StorageResult<Self> {
        let signing_key = match passphrase {
            Some(passphrase) => SigningKey::from_pkcs8_encrypted_pem(pem, passphrase),
            None => SigningKey::from_pkcs8_pem(pem),
        }
        .map_err(|e| StorageError::ConfigError(format!("Invalid signing key: {}", e)))?;

        Ok(LocalUrlSigner { signing_key })
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Base64 signature over `message`.
    pub fn sign(&self, message: &str) -> String {
        let signature = self.signing_key.sign(message.as_bytes());
        general_purpose::STANDARD.encode(signature.to_bytes())
    }
}

impl std::fmt::Debug for LocalUrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalUrlSigner")
            .field("verifying_key", &self.verifying_key())
            .finish()
    }
}

/// Build the local presigned URL for `binary`, expiring at `expires_at`.
pub fn build_presigned_url(
    base_url: &str,
    binary: &BinaryRef,
    expires_at: DateTime<Utc>,
    signer: Option<&LocalUrlSigner>,
) -> StorageResult<Url> {
    let invalid = |reason: &str| {
        StorageError::ConfigError(format!("Invalid storage base URL {}: {}", base_url, reason))
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not carry a query or fragment"));
    }
    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base"))?
        .pop_if_empty()
        .push(binary.id())
        .push(version_segment(binary));

    url.query_pairs_mut()
        .append_pair(EXPIRES_PARAM, &expires_at.timestamp_millis().to_string());

    if let Some(signer) = signer {
        let signature = signer.sign(url.as_str());
        url.query_pairs_mut().append_pair(SIGNATURE_PARAM, &signature);
    }

    Ok(url)
}

/// The string a local presigned URL's signature covers: the URL with its
/// `Signature` parameter removed.
pub fn canonical_form(url: &Url) -> String {
    let retained: Vec<&str> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty() && !pair.starts_with("Signature="))
        .collect();

    let mut canonical = url.clone();
    canonical.set_fragment(None);
    if retained.is_empty() {
        canonical.set_query(None);
    } else {
        canonical.set_query(Some(&retained.join("&")));
    }
    canonical.into()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresignVerifyError {
    #[error("Missing or malformed Expires parameter")]
    MissingExpires,

    #[error("Presigned URL expired")]
    Expired,

    #[error("Missing Signature parameter")]
    MissingSignature,

    #[error("Signature does not match")]
    InvalidSignature,
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Check a local presigned URL's expiry and signature at `now`.
pub fn verify_presigned_url(
    url: &Url,
    verifying_key: &VerifyingKey,
    now: DateTime<Utc>,
) -> Result<(), PresignVerifyError> {
    let expires = query_param(url, EXPIRES_PARAM)
        .and_then(|value| value.parse::<i64>().ok())
        .ok_or(PresignVerifyError::MissingExpires)?;
    if expires <= now.timestamp_millis() {
        return Err(PresignVerifyError::Expired);
    }

    let encoded = query_param(url, SIGNATURE_PARAM).ok_or(PresignVerifyError::MissingSignature)?;
    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| PresignVerifyError::InvalidSignature)?;
    let signature =
        Signature::from_slice(&bytes).map_err(|_| PresignVerifyError::InvalidSignature)?;

    verifying_key
        .verify(canonical_form(url).as_bytes(), &signature)
        .map_err(|_| PresignVerifyError::InvalidSignature)
}

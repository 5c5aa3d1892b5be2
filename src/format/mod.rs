//! Keystore document format.
//!
//! Provides version-aware parsing and serialization of the keystore
//! document. The version is read and checked before any other field.

use serde::Deserialize;

use crate::crypto::{CipherKind, IV_LEN, Kdf, KdfParams};
use crate::error::{KeystoreError, Result};

pub mod codec;
pub mod v1;

/// Latest document version
pub const CURRENT_VERSION: u64 = v1::VERSION_V1;

/// A parsed, validated keystore document.
///
/// Holds the decoded binary fields; algorithm identifiers have already been
/// checked against the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystoreFile {
    version: u64,
    cipher: CipherKind,
    kdf: Kdf,
    kdf_params: KdfParams,
    salt: Vec<u8>,
    iv: [u8; IV_LEN],
    ciphertext: Vec<u8>,
    mac: Vec<u8>,
}

impl KeystoreFile {
    /// Creates a current-version document from its components.
    pub fn new(
        kdf_params: KdfParams,
        salt: Vec<u8>,
        iv: [u8; IV_LEN],
        ciphertext: Vec<u8>,
        mac: Vec<u8>,
    ) -> Self {
        Self {
            version: CURRENT_VERSION,
            cipher: CipherKind::Aes128Ctr,
            kdf: Kdf::Pbkdf2,
            kdf_params,
            salt,
            iv,
            ciphertext,
            mac,
        }
    }

    /// Returns the document version.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn cipher(&self) -> CipherKind {
        self.cipher
    }

    pub fn kdf(&self) -> Kdf {
        self.kdf
    }

    /// Returns the parameters used for key derivation.
    pub fn kdf_params(&self) -> &KdfParams {
        &self.kdf_params
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn mac(&self) -> &[u8] {
        &self.mac
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u64,
}

/// Parses document bytes into a [`KeystoreFile`].
///
/// Automatically dispatches to the parser for the declared version.
///
/// # Errors
///
/// - [`KeystoreError::Format`] if the bytes are not UTF-8 JSON or a field
///   is missing or mistyped
/// - [`KeystoreError::UnsupportedVersion`] for any version but 1
/// - [`KeystoreError::UnsupportedAlgorithm`] for an unknown kdf, prf or cipher
pub fn parse(data: &[u8]) -> Result<KeystoreFile> {
    let text = codec::decode_text(data)?;

    let probe: VersionProbe = serde_json::from_str(text)
        .map_err(|e| KeystoreError::format(format!("cannot read version: {e}")))?;

    match probe.version {
        v1::VERSION_V1 => v1::parse(text),
        other => Err(KeystoreError::UnsupportedVersion(other)),
    }
}

/// Serializes a [`KeystoreFile`] to document bytes.
///
/// # Errors
///
/// Returns an error if the version is unsupported.
pub fn serialize(file: &KeystoreFile) -> Result<Vec<u8>> {
    match file.version() {
        v1::VERSION_V1 => v1::serialize(file),
        other => Err(KeystoreError::UnsupportedVersion(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_version_fails() {
        let doc = br#"{"version":2,"crypto":{}}"#;
        assert!(matches!(parse(doc), Err(KeystoreError::UnsupportedVersion(2))));
    }

    #[test]
    fn version_is_checked_before_crypto_fields() {
        let doc = br#"{"version":3}"#;
        assert!(matches!(parse(doc), Err(KeystoreError::UnsupportedVersion(3))));
    }

    #[test]
    fn missing_or_mistyped_version_is_format_error() {
        let docs: [&[u8]; 4] = [
            br#"{"crypto":{}}"#,
            br#"{"version":"1"}"#,
            br#"{"version":-1}"#,
            b"[]",
        ];
        for doc in docs {
            assert!(matches!(parse(doc), Err(KeystoreError::Format(_))));
        }
    }

    #[test]
    fn garbage_is_format_error() {
        assert!(matches!(parse(b""), Err(KeystoreError::Format(_))));
        assert!(matches!(parse(b"not json"), Err(KeystoreError::Format(_))));
        assert!(matches!(parse(&[0xc3, 0x28]), Err(KeystoreError::Format(_))));
    }
}

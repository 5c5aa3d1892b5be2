//! Keystore error types.

use thiserror::Error;

/// Errors produced while creating or loading a keystore document.
///
/// A failed call never returns partial key material alongside the error.
#[derive(Debug, Error)]
pub enum KeystoreError {
    /// The document is not UTF-8 JSON, or a required field is missing or mistyped.
    #[error("malformed keystore: {0}")]
    Format(String),

    /// The document declares a version other than the supported one.
    #[error("unsupported keystore version: {0}")]
    UnsupportedVersion(u64),

    /// An algorithm identifier (kdf, prf, cipher) is not recognized.
    #[error("unsupported {field}: {name}")]
    UnsupportedAlgorithm { field: &'static str, name: String },

    /// Mac verification failed. A wrong passphrase and a tampered document
    /// are reported identically.
    #[error("invalid passphrase or corrupted keystore")]
    BadPassphrase,

    /// A required primitive (cipher, OS random source) is not available.
    #[error("required capability unavailable: {0}")]
    EnvironmentCapability(String),

    /// Private key material has a length the key type does not allow.
    #[error("invalid private key length: expected 32 or 64 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// A cryptographic primitive rejected its inputs.
    #[error("cryptographic primitive failure: {0}")]
    Primitive(String),
}

impl KeystoreError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        KeystoreError::Format(msg.into())
    }

    pub(crate) fn unsupported(field: &'static str, name: impl Into<String>) -> Self {
        KeystoreError::UnsupportedAlgorithm {
            field,
            name: name.into(),
        }
    }
}

/// Result type for keystore operations.
pub type Result<T, E = KeystoreError> = std::result::Result<T, E>;

//! Text and hex codecs for the document's binary fields.

use crate::error::{KeystoreError, Result};

/// Lowercase hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode one hex field; `field` names it in the error.
pub fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|e| KeystoreError::format(format!("invalid {field} hex: {e}")))
}

/// Decode a hex field that must have exactly `N` bytes.
pub fn decode_hex_array<const N: usize>(field: &str, value: &str) -> Result<[u8; N]> {
    let bytes = decode_hex(field, value)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| KeystoreError::format(format!("{field} must be {N} bytes, got {len}")))
}

/// Document bytes to UTF-8 text.
pub fn decode_text(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| KeystoreError::format(format!("document is not UTF-8: {e}")))
}

/// Document text to bytes.
pub fn encode_text(text: String) -> Vec<u8> {
    text.into_bytes()
}

//! Document format v1.
//!
//! V1 Document (UTF-8 JSON, binary fields lowercase hex):
//! ```text
//! {
//!   "version": 1,
//!   "crypto": {
//!     "ciphertext": "<hex>",
//!     "cipherparams": { "iv": "<hex>" },
//!     "cipher": "aes-128-ctr",
//!     "kdf": "pbkdf2",
//!     "kdfparams": { "dkLen": 32, "salt": "<hex>", "c": 262144, "prf": "hmac-sha256" },
//!     "mac": "<hex>"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::KeystoreFile;
use super::codec::{decode_hex, decode_hex_array, encode_hex, encode_text};
use crate::crypto::{CipherKind, IV_LEN, Kdf, KdfParams, Prf};
use crate::error::{KeystoreError, Result};

/// Version 1 of the document format.
pub const VERSION_V1: u64 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    version: u64,
    crypto: Crypto,
}

#[derive(Debug, Serialize, Deserialize)]
struct Crypto {
    ciphertext: String,
    #[serde(default)]
    cipherparams: Option<CipherParams>,
    cipher: String,
    kdf: String,
    #[serde(default)]
    kdfparams: Option<KdfParamsField>,
    mac: String,
}

// Parameter blocks are matched against the identifier after it has been
// validated, so a foreign shape under a foreign name reports the name.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum CipherParams {
    AesCtr { iv: String },
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum KdfParamsField {
    Pbkdf2(Pbkdf2Params),
    Other(serde_json::Value),
}

impl KdfParamsField {
    fn prf_name(&self) -> Option<&str> {
        match self {
            KdfParamsField::Pbkdf2(params) => Some(&params.prf),
            KdfParamsField::Other(raw) => raw.get("prf")?.as_str(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Pbkdf2Params {
    #[serde(rename = "dkLen")]
    dk_len: u32,
    salt: String,
    c: u32,
    prf: String,
}

/// Parses a v1 document.
///
/// Every algorithm name is validated before any parameter block is
/// decoded, in the order kdf, prf, cipher.
pub fn parse(text: &str) -> Result<KeystoreFile> {
    let doc: Document = serde_json::from_str(text)
        .map_err(|e| KeystoreError::format(format!("invalid v1 document: {e}")))?;

    if doc.version != VERSION_V1 {
        return Err(KeystoreError::UnsupportedVersion(doc.version));
    }
    let crypto = doc.crypto;

    let kdf: Kdf = crypto.kdf.parse()?;
    let prf: Prf = match crypto.kdfparams.as_ref().and_then(KdfParamsField::prf_name) {
        Some(name) => name.parse()?,
        None => return Err(KeystoreError::format("kdfparams.prf is missing")),
    };
    let cipher: CipherKind = crypto.cipher.parse()?;

    let pbkdf2 = match (kdf, crypto.kdfparams) {
        (Kdf::Pbkdf2, Some(KdfParamsField::Pbkdf2(params))) => params,
        (Kdf::Pbkdf2, _) => return Err(KeystoreError::format("invalid pbkdf2 kdfparams")),
    };
    let iv_hex = match (cipher, crypto.cipherparams) {
        (CipherKind::Aes128Ctr, Some(CipherParams::AesCtr { iv })) => iv,
        (CipherKind::Aes128Ctr, _) => {
            return Err(KeystoreError::format("invalid aes-128-ctr cipherparams"));
        }
    };

    let kdf_params = KdfParams::from_parts(prf, pbkdf2.c, pbkdf2.dk_len)?;

    let salt = decode_hex("salt", &pbkdf2.salt)?;
    if salt.is_empty() {
        return Err(KeystoreError::format("salt is empty"));
    }
    let iv: [u8; IV_LEN] = decode_hex_array("iv", &iv_hex)?;
    let ciphertext = decode_hex("ciphertext", &crypto.ciphertext)?;
    let mac = decode_hex("mac", &crypto.mac)?;

    let mut file = KeystoreFile::new(kdf_params, salt, iv, ciphertext, mac);
    file.cipher = cipher;
    file.kdf = kdf;
    Ok(file)
}

/// Serializes a KeystoreFile to v1 document bytes.
///
/// # Errors
///
/// Returns an error if the version is not v1.
pub fn serialize(file: &KeystoreFile) -> Result<Vec<u8>> {
    if file.version() != VERSION_V1 {
        return Err(KeystoreError::UnsupportedVersion(file.version()));
    }

    let kdf = file.kdf_params();
    let doc = Document {
        version: VERSION_V1,
        crypto: Crypto {
            ciphertext: encode_hex(file.ciphertext()),
            cipherparams: Some(CipherParams::AesCtr {
                iv: encode_hex(file.iv()),
            }),
            cipher: file.cipher().as_str().to_string(),
            kdf: file.kdf().as_str().to_string(),
            kdfparams: Some(KdfParamsField::Pbkdf2(Pbkdf2Params {
                dk_len: kdf.dk_len(),
                salt: encode_hex(file.salt()),
                c: kdf.iterations(),
                prf: kdf.prf().as_str().to_string(),
            })),
            mac: encode_hex(file.mac()),
        },
    };

    let text = serde_json::to_string(&doc)
        .map_err(|e| KeystoreError::Primitive(format!("document serialization failed: {e}")))?;
    Ok(encode_text(text))
}

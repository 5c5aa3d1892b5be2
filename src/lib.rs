//! Passphrase-encrypted keystore documents for Ed25519 signing keys.
//!
//! A document stores the private key encrypted with AES-128-CTR under a key
//! stretched from the passphrase with PBKDF2-HMAC-SHA256, plus an
//! HMAC-SHA-384 tag that is verified before anything is decrypted.
//!
//! ```no_run
//! let document = keyseal::create_keystore(&[0u8; 32], "correct horse battery staple")?;
//! let pair = keyseal::load_keystore(&document, "correct horse battery staple")?;
//! assert_eq!(pair.private_key(), &[0u8; 32][..]);
//! # Ok::<(), keyseal::KeystoreError>(())
//! ```

pub mod crypto;
mod error;
pub mod format;
mod keypair;
mod keystore;
mod storage;

pub use crate::crypto::{Aes128Ctr, CipherProvider, KdfParams};
pub use crate::error::{KeystoreError, Result};
pub use crate::format::KeystoreFile;
pub use crate::keypair::{KEYPAIR_LEN, KeyPair, PUBLIC_KEY_LEN, SEED_LEN};
pub use crate::keystore::KeystoreCodec;
pub use crate::storage::Storage;

use anyhow::Context;
use directories::ProjectDirs;

/// Encrypt `private_key` under `passphrase` with the default parameters.
pub fn create_keystore(private_key: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    KeystoreCodec::new().encode(private_key, passphrase)
}

/// Verify and decrypt a document produced by [`create_keystore`].
pub fn load_keystore(document: &[u8], passphrase: &str) -> Result<KeyPair> {
    KeystoreCodec::new().decode(document, passphrase)
}

/// `keystore.json` in the platform data directory.
pub fn default_storage() -> anyhow::Result<Storage> {
    let project_dirs =
        ProjectDirs::from("", "", "keyseal").context("could not determine platform directories")?;

    let path = project_dirs.data_dir().join("keystore.json");

    Ok(Storage::new(path))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn document_survives_storage_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("keystore.json"));
        let codec = KeystoreCodec::new().with_kdf(KdfParams::new(2048).unwrap());
        let pair = KeyPair::generate().unwrap();

        let document = codec.encode(pair.private_key(), "pw").unwrap();
        storage.save(&document).unwrap();

        let loaded = codec.decode(&storage.load().unwrap(), "pw").unwrap();
        assert_eq!(loaded.private_key(), pair.private_key());
        assert_eq!(loaded.public_key(), pair.public_key());
    }

    #[test]
    fn default_parameters_are_written() {
        let document = create_keystore(&[1u8; 32], "").unwrap();
        let file = format::parse(&document).unwrap();

        assert_eq!(file.kdf_params(), &KdfParams::default());
        assert_eq!(file.salt().len(), crypto::SALT_LEN);

        let pair = load_keystore(&document, "").unwrap();
        assert_eq!(pair.private_key(), &[1u8; 32][..]);
    }
}

//! Keystore creation and loading.

use tracing::debug;

use crate::crypto::{Aes128Ctr, CipherProvider, KdfParams, cipher, derive_key, mac, random};
use crate::error::Result;
use crate::format::{self, KeystoreFile};
use crate::keypair::{KeyPair, check_private_key_len};

/// Encodes private keys into keystore documents and decodes them back.
///
/// Every call draws its own salt and IV, so one codec can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct KeystoreCodec<C = Aes128Ctr> {
    cipher: C,
    kdf: KdfParams,
}

impl KeystoreCodec<Aes128Ctr> {
    pub fn new() -> Self {
        Self::with_cipher(Aes128Ctr)
    }
}

impl Default for KeystoreCodec<Aes128Ctr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CipherProvider> KeystoreCodec<C> {
    pub fn with_cipher(cipher: C) -> Self {
        Self {
            cipher,
            kdf: KdfParams::default(),
        }
    }

    /// Derivation parameters written into new documents.
    ///
    /// Decoding always uses the parameters stored in the document.
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn kdf(&self) -> &KdfParams {
        &self.kdf
    }

    /// Encrypt `private_key` under `passphrase` and return the document bytes.
    ///
    /// # Errors
    ///
    /// - [`InvalidKeyLength`](crate::KeystoreError::InvalidKeyLength) unless
    ///   the key is 32 or 64 bytes
    /// - [`EnvironmentCapability`](crate::KeystoreError::EnvironmentCapability)
    ///   if the cipher or the random source is unavailable
    pub fn encode(&self, private_key: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        check_private_key_len(private_key.len())?;
        self.cipher.ensure_available()?;

        let salt = random::generate_salt()?;
        let iv = random::generate_iv()?;

        debug!(iterations = self.kdf.iterations(), "deriving keystore key");
        let key = derive_key(passphrase, &salt, &self.kdf)?;

        let ciphertext = cipher::encrypt(&self.cipher, key.encryption_key(), &iv, private_key)?;
        let mac = mac::compute_mac(key.mac_key(), &ciphertext)?;
        drop(key);

        let file = KeystoreFile::new(self.kdf, salt.to_vec(), iv, ciphertext, mac);
        let document = format::serialize(&file)?;

        debug!(bytes = document.len(), "keystore encoded");
        Ok(document)
    }

    /// Verify and decrypt a keystore document.
    ///
    /// The mac is checked over the ciphertext before anything is decrypted.
    ///
    /// # Errors
    ///
    /// - [`Format`](crate::KeystoreError::Format),
    ///   [`UnsupportedVersion`](crate::KeystoreError::UnsupportedVersion),
    ///   [`UnsupportedAlgorithm`](crate::KeystoreError::UnsupportedAlgorithm)
    ///   from parsing, before any derivation
    /// - [`BadPassphrase`](crate::KeystoreError::BadPassphrase) on a wrong
    ///   passphrase or a modified document
    pub fn decode(&self, document: &[u8], passphrase: &str) -> Result<KeyPair> {
        let file = format::parse(document)?;

        debug!(
            iterations = file.kdf_params().iterations(),
            ciphertext_len = file.ciphertext().len(),
            "deriving keystore key"
        );
        let key = derive_key(passphrase, file.salt(), file.kdf_params())?;

        if let Err(e) = mac::verify_mac(key.mac_key(), file.ciphertext(), file.mac()) {
            debug!("keystore mac mismatch");
            return Err(e);
        }

        let plaintext = cipher::decrypt(
            &self.cipher,
            key.encryption_key(),
            file.iv(),
            file.ciphertext(),
        )?;
        drop(key);

        let pair = KeyPair::from_private_key(&plaintext)?;
        debug!("keystore decoded");
        Ok(pair)
    }
}

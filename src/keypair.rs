//! Ed25519 key pairs recovered from a keystore.

use std::fmt;

use ed25519_dalek::SigningKey;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::random::secure_random;
use crate::error::{KeystoreError, Result};

/// Length of an Ed25519 seed.
pub const SEED_LEN: usize = 32;
/// Length of the expanded `seed || public key` form.
pub const KEYPAIR_LEN: usize = 64;
/// Length of an Ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Private key material plus the public key derived from it.
pub struct KeyPair {
    private_key: Zeroizing<Vec<u8>>,
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl KeyPair {
    /// Build a key pair from raw private key bytes.
    ///
    /// Accepts a 32-byte seed or the 64-byte `seed || public` form. The public
    /// key is always recomputed from the seed; the private bytes are kept
    /// exactly as given.
    pub fn from_private_key(bytes: &[u8]) -> Result<Self> {
        check_private_key_len(bytes.len())?;

        let mut seed = [0u8; SEED_LEN];
        seed.copy_from_slice(&bytes[..SEED_LEN]);
        let signing = SigningKey::from_bytes(&seed);
        seed.zeroize();

        Ok(Self {
            private_key: Zeroizing::new(bytes.to_vec()),
            public_key: signing.verifying_key().to_bytes(),
        })
    }

    /// Generate a fresh key pair from the OS random source.
    pub fn generate() -> Result<Self> {
        let mut seed = Zeroizing::new([0u8; SEED_LEN]);
        secure_random(seed.as_mut_slice())?;
        Self::from_private_key(seed.as_slice())
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// Only 32- and 64-byte private keys are accepted.
pub(crate) fn check_private_key_len(len: usize) -> Result<()> {
    match len {
        SEED_LEN | KEYPAIR_LEN => Ok(()),
        other => Err(KeystoreError::InvalidKeyLength(other)),
    }
}

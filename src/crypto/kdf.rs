//! PBKDF2 key derivation and the encryption/authentication key split.

use std::fmt;
use std::str::FromStr;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use super::{DEFAULT_ITERATIONS, DK_LEN, ENC_KEY_LEN, MAC_KEY_LEN, MAX_ITERATIONS};
use crate::error::{KeystoreError, Result};

/// Key derivation functions a keystore document may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kdf {
    Pbkdf2,
}

impl Kdf {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kdf::Pbkdf2 => "pbkdf2",
        }
    }
}

impl FromStr for Kdf {
    type Err = KeystoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pbkdf2" => Ok(Kdf::Pbkdf2),
            other => Err(KeystoreError::unsupported("kdf", other)),
        }
    }
}

/// Pseudorandom functions PBKDF2 may run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prf {
    HmacSha256,
}

impl Prf {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prf::HmacSha256 => "hmac-sha256",
        }
    }
}

impl FromStr for Prf {
    type Err = KeystoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hmac-sha256" => Ok(Prf::HmacSha256),
            other => Err(KeystoreError::unsupported("prf", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    prf: Prf,
    iterations: u32,
    dk_len: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            prf: Prf::HmacSha256,
            // 2^18 rounds
            iterations: DEFAULT_ITERATIONS,
            dk_len: DK_LEN as u32,
        }
    }
}

impl KdfParams {
    /// PBKDF2-HMAC-SHA256 with a custom iteration count.
    pub fn new(iterations: u32) -> Result<Self> {
        Self::from_parts(Prf::HmacSha256, iterations, DK_LEN as u32)
    }

    pub(crate) fn from_parts(prf: Prf, iterations: u32, dk_len: u32) -> Result<Self> {
        let params = Self {
            prf,
            iterations,
            dk_len,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn prf(&self) -> Prf {
        self.prf
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn dk_len(&self) -> u32 {
        self.dk_len
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 {
            return Err(KeystoreError::format("pbkdf2 iteration count must be >= 1"));
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(KeystoreError::format(format!(
                "pbkdf2 iteration count must be <= {MAX_ITERATIONS}, got {}",
                self.iterations
            )));
        }
        // the encryption/authentication split is defined for exactly DK_LEN bytes
        if self.dk_len as usize != DK_LEN {
            return Err(KeystoreError::format(format!(
                "pbkdf2 dkLen must be {DK_LEN}, got {}",
                self.dk_len
            )));
        }
        Ok(())
    }
}

/// Raw PBKDF2: stretch `passphrase` and `salt` into `dk_len` bytes.
pub fn pbkdf2(
    prf: Prf,
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
    dk_len: usize,
) -> Zeroizing<Vec<u8>> {
    let mut output = Zeroizing::new(vec![0u8; dk_len]);
    match prf {
        Prf::HmacSha256 => pbkdf2_hmac::<Sha256>(passphrase, salt, iterations, output.as_mut_slice()),
    }
    output
}

/// The PBKDF2 output split into its two sub-keys.
///
/// Bytes `[0, 16)` key the cipher, bytes `[16, 32)` key the mac. Both halves
/// are wiped on drop.
pub struct DerivedKey {
    encryption: [u8; ENC_KEY_LEN],
    authentication: [u8; MAC_KEY_LEN],
}

impl DerivedKey {
    fn split(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != DK_LEN {
            return Err(KeystoreError::Primitive(format!(
                "derived key must be {DK_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let (enc, auth) = bytes.split_at(ENC_KEY_LEN);
        let mut key = Self {
            encryption: [0u8; ENC_KEY_LEN],
            authentication: [0u8; MAC_KEY_LEN],
        };
        key.encryption.copy_from_slice(enc);
        key.authentication.copy_from_slice(auth);
        Ok(key)
    }

    pub fn encryption_key(&self) -> &[u8; ENC_KEY_LEN] {
        &self.encryption
    }

    pub fn mac_key(&self) -> &[u8; MAC_KEY_LEN] {
        &self.authentication
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.encryption.zeroize();
        self.authentication.zeroize();
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derive the keystore key pair of sub-keys from a passphrase.
pub fn derive_key(passphrase: &str, salt: &[u8], kdf: &KdfParams) -> Result<DerivedKey> {
    kdf.validate()?;

    let output = pbkdf2(
        kdf.prf,
        passphrase.as_bytes(),
        salt,
        kdf.iterations,
        kdf.dk_len as usize,
    );
    DerivedKey::split(&output)
}

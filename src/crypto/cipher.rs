//! AES-128-CTR behind a capability trait.
//!
//! Encryption and decryption are the same keystream transform. The codec is
//! written against [`CipherProvider`] so the cipher facility can be swapped
//! per target, or faked in tests.

use std::str::FromStr;

use ctr::cipher::{KeyIvInit, StreamCipher};
use zeroize::Zeroizing;

use super::{ENC_KEY_LEN, IV_LEN};
use crate::error::{KeystoreError, Result};

type Aes128CtrBe = ctr::Ctr128BE<aes::Aes128>;

/// Symmetric ciphers a keystore document may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    Aes128Ctr,
}

impl CipherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherKind::Aes128Ctr => "aes-128-ctr",
        }
    }
}

impl FromStr for CipherKind {
    type Err = KeystoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "aes-128-ctr" => Ok(CipherKind::Aes128Ctr),
            other => Err(KeystoreError::unsupported("cipher", other)),
        }
    }
}

/// A source of the AES-128-CTR keystream.
pub trait CipherProvider: Send + Sync {
    /// Fails with [`KeystoreError::EnvironmentCapability`] when the facility
    /// cannot be used in the current runtime.
    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    /// XOR the keystream for `(key, iv)` into `buf` in place.
    fn apply_keystream(
        &self,
        key: &[u8; ENC_KEY_LEN],
        iv: &[u8; IV_LEN],
        buf: &mut [u8],
    ) -> Result<()>;
}

/// Software AES-128-CTR with a 128-bit big-endian counter.
///
/// The `aes` crate picks AES-NI / ARMv8 instructions at runtime when the CPU
/// has them, so this is the provider on every supported target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes128Ctr;

impl CipherProvider for Aes128Ctr {
    fn apply_keystream(
        &self,
        key: &[u8; ENC_KEY_LEN],
        iv: &[u8; IV_LEN],
        buf: &mut [u8],
    ) -> Result<()> {
        let mut cipher = Aes128CtrBe::new_from_slices(key, iv)
            .map_err(|e| KeystoreError::Primitive(format!("aes-128-ctr init failed: {e}")))?;
        cipher
            .try_apply_keystream(buf)
            .map_err(|e| KeystoreError::Primitive(format!("aes-128-ctr keystream: {e}")))
    }
}

/// Encrypt `plaintext`; the ciphertext has the same length.
pub fn encrypt<C: CipherProvider + ?Sized>(
    cipher: &C,
    key: &[u8; ENC_KEY_LEN],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    cipher.ensure_available()?;
    let mut buf = plaintext.to_vec();
    cipher.apply_keystream(key, iv, &mut buf)?;
    Ok(buf)
}

/// Decrypt `ciphertext` into a buffer that is wiped on drop.
pub fn decrypt<C: CipherProvider + ?Sized>(
    cipher: &C,
    key: &[u8; ENC_KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    cipher.ensure_available()?;
    let mut buf = Zeroizing::new(ciphertext.to_vec());
    cipher.apply_keystream(key, iv, buf.as_mut_slice())?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_hex<const N: usize>(s: &str) -> [u8; N] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    // NIST SP 800-38A, F.5.1 CTR-AES128.Encrypt
    #[test]
    fn aes_128_ctr_known_answer() {
        let key: [u8; 16] = from_hex("2b7e151628aed2a6abf7158809cf4f3c");
        let iv: [u8; 16] = from_hex("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
        let plaintext = hex::decode(
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51",
        )
        .unwrap();

        let ciphertext = encrypt(&Aes128Ctr, &key, &iv, &plaintext).unwrap();
        assert_eq!(
            hex::encode(&ciphertext),
            "874d6191b620e3261bef6864990db6ce9806f66b7970fdff8617187bb9fffdff"
        );

        let recovered = decrypt(&Aes128Ctr, &key, &iv, &ciphertext).unwrap();
        assert_eq!(recovered.as_slice(), plaintext.as_slice());
    }

    #[test]
    fn ctr_mode_preserves_length() {
        let key = [0xAA; 16];
        let iv = [0xBB; 16];
        for len in [0, 1, 15, 16, 17, 32, 63, 64] {
            let secret = vec![0x42; len];
            let ciphertext = encrypt(&Aes128Ctr, &key, &iv, &secret).unwrap();
            assert_eq!(ciphertext.len(), len);

            let plaintext = decrypt(&Aes128Ctr, &key, &iv, &ciphertext).unwrap();
            assert_eq!(plaintext.as_slice(), secret.as_slice());
        }
    }

    #[test]
    fn different_iv_different_ciphertext() {
        let key = [0xAA; 16];
        let a = encrypt(&Aes128Ctr, &key, &[0x11; 16], b"same plaintext").unwrap();
        let b = encrypt(&Aes128Ctr, &key, &[0x22; 16], b"same plaintext").unwrap();
        assert_ne!(a, b);
    }

    struct Unavailable;

    impl CipherProvider for Unavailable {
        fn ensure_available(&self) -> Result<()> {
            Err(KeystoreError::EnvironmentCapability("no cipher".into()))
        }

        fn apply_keystream(&self, _: &[u8; 16], _: &[u8; 16], _: &mut [u8]) -> Result<()> {
            unreachable!("keystream requested from unavailable provider")
        }
    }

    #[test]
    fn unavailable_provider_fails_explicitly() {
        let result = encrypt(&Unavailable, &[0; 16], &[0; 16], b"secret");
        assert!(matches!(result, Err(KeystoreError::EnvironmentCapability(_))));
    }

    #[test]
    fn cipher_kind_parses_closed_set() {
        assert_eq!("aes-128-ctr".parse::<CipherKind>().unwrap(), CipherKind::Aes128Ctr);
        assert!(matches!(
            "aes-256-gcm".parse::<CipherKind>(),
            Err(KeystoreError::UnsupportedAlgorithm { field: "cipher", .. })
        ));
    }
}

//! HMAC over SHA-2, used for the keystore mac.
//!
//! The stored tag is HMAC-SHA-384 over the ciphertext keyed with the second
//! half of the derived key. Verification goes through [`Mac::verify_slice`],
//! which compares the full tag in constant time.

use hmac::{Hmac, Mac, digest::KeyInit};
use sha2::{Sha256, Sha384};

use crate::error::{KeystoreError, Result};

/// Hash functions the keyed-hash primitive runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
        }
    }

    /// Tag length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
        }
    }
}

/// Compute `HMAC-<alg>(key, message)`.
pub fn hmac(alg: HashAlgorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    match alg {
        HashAlgorithm::Sha256 => keyed::<Hmac<Sha256>>(key, message),
        HashAlgorithm::Sha384 => keyed::<Hmac<Sha384>>(key, message),
    }
}

fn keyed<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|e| KeystoreError::Primitive(format!("hmac key rejected: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Keystore mac over `ciphertext`.
pub fn compute_mac(mac_key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    hmac(HashAlgorithm::Sha384, mac_key, ciphertext)
}

/// Check a stored keystore mac.
///
/// Any mismatch, including a tag of the wrong length, is reported as
/// [`KeystoreError::BadPassphrase`].
pub fn verify_mac(mac_key: &[u8], ciphertext: &[u8], expected: &[u8]) -> Result<()> {
    let mut mac = <Hmac<Sha384> as Mac>::new_from_slice(mac_key)
        .map_err(|e| KeystoreError::Primitive(format!("hmac key rejected: {e}")))?;
    mac.update(ciphertext);
    mac.verify_slice(expected)
        .map_err(|_| KeystoreError::BadPassphrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4231 test cases 1 and 2
    #[test]
    fn hmac_sha256_known_answers() {
        let tag = hmac(HashAlgorithm::Sha256, &[0x0b; 20], b"Hi There").unwrap();
        assert_eq!(
            hex::encode(tag),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );

        let tag = hmac(HashAlgorithm::Sha256, b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hmac_sha384_known_answers() {
        let tag = hmac(HashAlgorithm::Sha384, &[0x0b; 20], b"Hi There").unwrap();
        assert_eq!(
            hex::encode(tag),
            "afd03944d84895626b0825f4ab46907f15f9dadbe4101ec682aa034c7cebc59c\
             faea9ea9076ede7f4af152e8b2fa9cb6"
        );

        let tag = hmac(HashAlgorithm::Sha384, b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex::encode(tag),
            "af45d2e376484031617f78d2b58a6b1b9c7ef464f5a01b47e42ec3736322445e\
             8e2240ca5e69e2c78b3239ecfab21649"
        );
    }

    #[test]
    fn output_len_matches_tags() {
        for alg in [HashAlgorithm::Sha256, HashAlgorithm::Sha384] {
            let tag = hmac(alg, b"k", b"m").unwrap();
            assert_eq!(tag.len(), alg.output_len());
        }
    }

    #[test]
    fn verify_accepts_matching_mac() {
        let key = [0x11; 16];
        let ciphertext = [0x22; 64];
        let mac = compute_mac(&key, &ciphertext).unwrap();

        assert_eq!(mac.len(), crate::crypto::MAC_LEN);
        assert!(verify_mac(&key, &ciphertext, &mac).is_ok());
    }

    #[test]
    fn verify_rejects_flipped_bit() {
        let key = [0x11; 16];
        let ciphertext = [0x22; 64];
        let mut mac = compute_mac(&key, &ciphertext).unwrap();
        mac[47] ^= 0x80;

        assert!(matches!(
            verify_mac(&key, &ciphertext, &mac),
            Err(KeystoreError::BadPassphrase)
        ));
    }

    #[test]
    fn verify_rejects_truncated_mac() {
        let key = [0x11; 16];
        let ciphertext = [0x22; 64];
        let mac = compute_mac(&key, &ciphertext).unwrap();

        assert!(matches!(
            verify_mac(&key, &ciphertext, &mac[..32]),
            Err(KeystoreError::BadPassphrase)
        ));
        assert!(matches!(
            verify_mac(&key, &ciphertext, &[]),
            Err(KeystoreError::BadPassphrase)
        ));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let ciphertext = [0x22; 64];
        let mac = compute_mac(&[0x11; 16], &ciphertext).unwrap();

        assert!(verify_mac(&[0x33; 16], &ciphertext, &mac).is_err());
    }
}

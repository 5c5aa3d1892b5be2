//! Salts and IVs from the operating system's random source.

use super::{IV_LEN, SALT_LEN};
use crate::error::{KeystoreError, Result};
use getrandom::fill;

/// Fill buffer with cryptographically secure random bytes
pub(crate) fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|e| {
        KeystoreError::EnvironmentCapability(format!("OS random generator unavailable: {e}"))
    })
}

/// Generate a fresh salt
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(salt)
}

/// Generate a fresh IV
pub fn generate_iv() -> Result<[u8; IV_LEN]> {
    let mut iv = [0u8; IV_LEN];
    secure_random(&mut iv)?;
    Ok(iv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salts_are_fresh() {
        let a = generate_salt().unwrap();
        let b = generate_salt().unwrap();
        assert_eq!(a.len(), SALT_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn ivs_are_fresh() {
        let a = generate_iv().unwrap();
        let b = generate_iv().unwrap();
        assert_eq!(a.len(), IV_LEN);
        assert_ne!(a, b);
    }
}

//! Cryptographic primitives for the keystore.
//!
//! Key derivation (PBKDF2), keyed hashing (HMAC), the AES-128-CTR stream
//! cipher behind a provider trait, and the OS random source.

pub mod cipher;
pub mod kdf;
pub mod mac;
pub mod random;

pub use cipher::{Aes128Ctr, CipherKind, CipherProvider};
pub use kdf::{DerivedKey, Kdf, KdfParams, Prf, derive_key};
pub use mac::HashAlgorithm;

/// Length of the PBKDF2 salt (32 bytes).
pub const SALT_LEN: usize = 32;
/// Length of the AES-CTR initialization vector (16 bytes).
pub const IV_LEN: usize = 16;
/// Length of the derived key (32 bytes), split into two sub-keys.
pub const DK_LEN: usize = 32;
/// Length of the encryption sub-key, taken from the front of the derived key.
pub const ENC_KEY_LEN: usize = 16;
/// Length of the authentication sub-key, taken from the back of the derived key.
pub const MAC_KEY_LEN: usize = DK_LEN - ENC_KEY_LEN;
/// Length of an HMAC-SHA-384 tag.
pub const MAC_LEN: usize = 48;
/// Default PBKDF2 iteration count (2^18).
pub const DEFAULT_ITERATIONS: u32 = 262_144;
/// Upper bound on the PBKDF2 iteration count accepted from a document.
pub const MAX_ITERATIONS: u32 = 10_000_000;

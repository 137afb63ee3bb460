//! Cryptographic primitives for NonAuth.
//!
//! This module provides:
//! - ChaCha20-Poly1305 AEAD with detached tags
//! - Secure random number generation
//!
//! The shared key is zeroized on drop and never printed.

mod aead;
mod random;

pub use aead::{Aead, SharedKey};
pub use random::SecureRandom;

/// Size of the shared AEAD key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of AEAD nonce in bytes (96 bits for ChaCha20-Poly1305)
pub const NONCE_SIZE: usize = 12;

/// Size of the full AEAD authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_nonce_and_seal() {
        let key = SharedKey::from_bytes([0x42u8; KEY_SIZE]);
        let aead = Aead::new(&key);
        let nonce: [u8; NONCE_SIZE] = SecureRandom::bytes().unwrap();

        let mut buffer = *b"covert data!";
        let tag = aead.seal_detached(&nonce, b"sni", &mut buffer).unwrap();
        assert_ne!(&buffer, b"covert data!");

        assert!(aead.open_detached(&nonce, b"sni", &mut buffer, &tag));
        assert_eq!(&buffer, b"covert data!");
    }
}

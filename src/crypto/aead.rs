//! Authenticated Encryption with Associated Data (AEAD).
//!
//! Uses ChaCha20-Poly1305 with detached tags. The random field only has room
//! for a prefix of the tag, so the ciphertext and the tag are handled
//! separately instead of as one `ciphertext || tag` buffer.

use std::fmt;

use chacha20poly1305::{
    aead::{AeadInPlace, KeyInit},
    ChaCha20Poly1305, Nonce, Tag,
};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};

/// The pre-shared 32-byte NonAuth key.
///
/// Automatically zeroized when dropped. `Debug` never prints the key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey([u8; KEY_SIZE]);

impl SharedKey {
    /// Create a shared key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a shared key from a slice, rejecting any length other than 32.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            Error::key_setup(format!(
                "shared key must be {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }

    /// Get the raw key bytes.
    ///
    /// # Security
    ///
    /// Handle with care - this is secret key material.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Whether every byte of the key is zero.
    pub fn is_zero(&self) -> bool {
        self.0[..].ct_eq(&[0u8; KEY_SIZE][..]).into()
    }
}

impl PartialEq for SharedKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for SharedKey {}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedKey(<redacted>)")
    }
}

impl Default for SharedKey {
    fn default() -> Self {
        Self([0u8; KEY_SIZE])
    }
}

/// ChaCha20-Poly1305 AEAD cipher.
pub struct Aead {
    cipher: ChaCha20Poly1305,
}

impl Aead {
    /// Create a new AEAD instance with the given key.
    pub fn new(key: &SharedKey) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(key.as_bytes().into()),
        }
    }

    /// Create a new AEAD instance from untyped key material.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeySetup`] if the key is not 32 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        let cipher = ChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| Error::key_setup(format!("invalid AEAD key length {}", key.len())))?;
        Ok(Self { cipher })
    }

    /// Encrypt `buffer` in place and return the full 16-byte tag.
    ///
    /// # Arguments
    ///
    /// * `nonce` - Must be unique for this key
    /// * `aad` - Additional data to authenticate (but not encrypt)
    /// * `buffer` - Plaintext in, ciphertext out (same length)
    pub fn seal_detached(
        &self,
        nonce: &[u8; NONCE_SIZE],
        aad: &[u8],
        buffer: &mut [u8],
    ) -> Result<[u8; TAG_SIZE]> {
        let tag = self
            .cipher
            .encrypt_in_place_detached(Nonce::from_slice(nonce), aad, buffer)
            .map_err(|_| Error::crypto("in-place encryption failed"))?;

        let mut out = [0u8; TAG_SIZE];
        out.copy_from_slice(tag.as_slice());
        Ok(out)
    }

    /// Verify `tag` and decrypt `buffer` in place.
    ///
    /// Returns `false` on authentication failure. The buffer is left
    /// unmodified in that case.
    pub fn open_detached(
        &self,
        nonce: &[u8; NONCE_SIZE],
        aad: &[u8],
        buffer: &mut [u8],
        tag: &[u8; TAG_SIZE],
    ) -> bool {
        self.cipher
            .decrypt_in_place_detached(Nonce::from_slice(nonce), aad, buffer, Tag::from_slice(tag))
            .is_ok()
    }

    /// Produce the first `N` keystream bytes that would cover a message
    /// sealed under `nonce`.
    ///
    /// Ciphertext does not depend on the associated data, so sealing `N` zero
    /// bytes yields the keystream itself.
    pub fn keystream<const N: usize>(&self, nonce: &[u8; NONCE_SIZE]) -> Result<[u8; N]> {
        let mut stream = [0u8; N];
        self.seal_detached(nonce, &[], &mut stream)?;
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SharedKey {
        SharedKey::from_bytes([
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
            0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
            0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17,
            0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f,
        ])
    }

    const NONCE: [u8; NONCE_SIZE] = [7u8; NONCE_SIZE];

    #[test]
    fn test_seal_open() {
        let aead = Aead::new(&test_key());

        let mut buffer = *b"Hello, World";
        let tag = aead.seal_detached(&NONCE, b"context", &mut buffer).unwrap();
        assert_ne!(&buffer, b"Hello, World");

        assert!(aead.open_detached(&NONCE, b"context", &mut buffer, &tag));
        assert_eq!(&buffer, b"Hello, World");
    }

    #[test]
    fn test_wrong_key_fails() {
        let aead1 = Aead::new(&test_key());
        let aead2 = Aead::new(&SharedKey::from_bytes([0x42u8; KEY_SIZE]));

        let mut buffer = *b"secret data!";
        let tag = aead1.seal_detached(&NONCE, b"", &mut buffer).unwrap();
        let sealed = buffer;

        assert!(!aead2.open_detached(&NONCE, b"", &mut buffer, &tag));
        // Untouched on failure
        assert_eq!(buffer, sealed);
    }

    #[test]
    fn test_wrong_aad_fails() {
        let aead = Aead::new(&test_key());

        let mut buffer = *b"secret data!";
        let tag = aead.seal_detached(&NONCE, b"context1", &mut buffer).unwrap();

        assert!(!aead.open_detached(&NONCE, b"context2", &mut buffer, &tag));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let aead = Aead::new(&test_key());

        let mut buffer = *b"secret data!";
        let mut tag = aead.seal_detached(&NONCE, b"", &mut buffer).unwrap();
        tag[15] ^= 0x01;

        assert!(!aead.open_detached(&NONCE, b"", &mut buffer, &tag));
    }

    #[test]
    fn test_keystream_recovers_plaintext() {
        let aead = Aead::new(&test_key());

        let mut buffer = *b"HELLOWORLD!!";
        aead.seal_detached(&NONCE, b"example.com", &mut buffer).unwrap();

        let stream: [u8; 12] = aead.keystream(&NONCE).unwrap();
        let recovered: Vec<u8> = buffer.iter().zip(stream.iter()).map(|(c, k)| c ^ k).collect();
        assert_eq!(recovered, b"HELLOWORLD!!");
    }

    #[test]
    fn test_from_slice_rejects_bad_length() {
        assert!(Aead::from_slice(&[0u8; KEY_SIZE]).is_ok());

        let err = Aead::from_slice(&[0u8; 16]).err().unwrap();
        assert!(matches!(err, Error::KeySetup(_)));

        let err = SharedKey::from_slice(&[0u8; 31]).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_shared_key_debug_redacted() {
        let key = SharedKey::from_bytes([0xabu8; KEY_SIZE]);
        let printed = format!("{:?}", key);
        assert_eq!(printed, "SharedKey(<redacted>)");
        assert!(!printed.contains("ab"));
    }

    #[test]
    fn test_shared_key_is_zero() {
        assert!(SharedKey::default().is_zero());
        assert!(!test_key().is_zero());
        assert_eq!(test_key(), test_key());
        assert_ne!(test_key(), SharedKey::default());
    }
}

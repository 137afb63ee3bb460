//! Wire types carried in a hello random field.

use std::fmt;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::covert::{
    CAM_LEN, CIPHERTEXT_OFFSET, NONCE_OFFSET, RANDOM_LEN, TAG_OFFSET, TIMESTAMP_LEN,
    TRUNCATED_TAG_LEN,
};
use crate::crypto::NONCE_SIZE;
use crate::error::{Error, Result};

/// Covert Authentication Message: 12 opaque bytes chosen by the caller.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Zeroize)]
pub struct Cam([u8; CAM_LEN]);

impl Cam {
    /// Create a CAM from raw bytes.
    pub const fn from_bytes(bytes: [u8; CAM_LEN]) -> Self {
        Self(bytes)
    }

    /// Create a CAM from a slice of exactly 12 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let cam: [u8; CAM_LEN] = bytes.try_into().map_err(|_| Error::Length {
            expected: CAM_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(cam))
    }

    /// Get the raw CAM bytes.
    pub fn as_bytes(&self) -> &[u8; CAM_LEN] {
        &self.0
    }

    /// Constant-time equality.
    pub fn ct_eq(&self, other: &Cam) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl From<[u8; CAM_LEN]> for Cam {
    fn from(bytes: [u8; CAM_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Cam {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Cam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cam({})", hex::encode(self.0))
    }
}

/// A 32-byte ClientHello.Random / ServerHello.Random value.
///
/// ```text
/// offset  size  field
/// 0       4     timestamp (big-endian u32, Unix seconds)
/// 4       12    nonce (also the AEAD nonce)
/// 16      12    ciphertext of the CAM
/// 28      4     first 4 bytes of the Poly1305 tag
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RandomField([u8; RANDOM_LEN]);

impl RandomField {
    /// Wrap raw random-field bytes.
    pub const fn from_bytes(bytes: [u8; RANDOM_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes, ready to be written into a hello message.
    pub fn as_bytes(&self) -> &[u8; RANDOM_LEN] {
        &self.0
    }

    /// Consume into the raw bytes.
    pub fn into_bytes(self) -> [u8; RANDOM_LEN] {
        self.0
    }

    /// Embedded timestamp (seconds since the Unix epoch, wrapping at 2^32).
    pub fn timestamp(&self) -> u32 {
        let mut ts = [0u8; TIMESTAMP_LEN];
        ts.copy_from_slice(&self.0[..TIMESTAMP_LEN]);
        u32::from_be_bytes(ts)
    }

    /// AEAD nonce.
    pub fn nonce(&self) -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&self.0[NONCE_OFFSET..CIPHERTEXT_OFFSET]);
        nonce
    }

    /// Encrypted CAM.
    pub fn ciphertext(&self) -> [u8; CAM_LEN] {
        let mut ciphertext = [0u8; CAM_LEN];
        ciphertext.copy_from_slice(&self.0[CIPHERTEXT_OFFSET..TAG_OFFSET]);
        ciphertext
    }

    /// Truncated authentication tag.
    pub fn truncated_tag(&self) -> [u8; TRUNCATED_TAG_LEN] {
        let mut tag = [0u8; TRUNCATED_TAG_LEN];
        tag.copy_from_slice(&self.0[TAG_OFFSET..]);
        tag
    }
}

impl TryFrom<&[u8]> for RandomField {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let field: [u8; RANDOM_LEN] = bytes.try_into().map_err(|_| Error::Length {
            expected: RANDOM_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(field))
    }
}

impl From<RandomField> for [u8; RANDOM_LEN] {
    fn from(field: RandomField) -> Self {
        field.0
    }
}

impl AsRef<[u8]> for RandomField {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RandomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RandomField({})", hex::encode(self.0))
    }
}

/// Outcome of inspecting a random field.
///
/// A forged field and an ordinary random hello both decode to
/// [`Verdict::NotAuthenticated`]; callers cannot tell them apart.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The field carries a valid, fresh CAM.
    Authenticated(Cam),
    /// Not a NonAuth field for this key and context.
    NotAuthenticated,
}

impl Verdict {
    /// Whether the field authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Verdict::Authenticated(_))
    }

    /// The recovered CAM, if any.
    pub fn cam(&self) -> Option<&Cam> {
        match self {
            Verdict::Authenticated(cam) => Some(cam),
            Verdict::NotAuthenticated => None,
        }
    }

    /// Flatten into `(authenticated, cam)`; the CAM is all zero when not
    /// authenticated.
    pub fn into_parts(self) -> (bool, Cam) {
        match self {
            Verdict::Authenticated(cam) => (true, cam),
            Verdict::NotAuthenticated => (false, Cam::default()),
        }
    }
}

/// How the 4-byte truncated tag is checked on decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCheck {
    /// Recompute the full Poly1305 tag from the recovered CAM and compare the
    /// first 4 bytes in constant time. Honest fields round-trip.
    #[default]
    Truncated,
    /// Pad the received 4 tag bytes with 12 zero bytes and run a full AEAD
    /// open, as the draft-nonauth-00 reference decoder does. An honest field
    /// only passes with probability 2^-96, so this exists for interop testing
    /// against that decoder, not for production use.
    ZeroPaddedLegacy,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field() -> RandomField {
        let mut bytes = [0u8; RANDOM_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        RandomField::from_bytes(bytes)
    }

    #[test]
    fn test_field_layout() {
        let field = sample_field();

        assert_eq!(field.timestamp(), 0x0001_0203);
        assert_eq!(field.nonce(), [4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(
            field.ciphertext(),
            [16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27]
        );
        assert_eq!(field.truncated_tag(), [28, 29, 30, 31]);
    }

    #[test]
    fn test_field_try_from_length() {
        for len in [0usize, 1, 31, 33, 64] {
            let bytes = vec![0u8; len];
            let err = RandomField::try_from(bytes.as_slice()).unwrap_err();
            assert_eq!(
                err,
                Error::Length {
                    expected: RANDOM_LEN,
                    actual: len
                }
            );
        }

        let bytes = [9u8; RANDOM_LEN];
        let field = RandomField::try_from(&bytes[..]).unwrap();
        assert_eq!(field.as_bytes(), &bytes);
    }

    #[test]
    fn test_cam_from_slice() {
        let cam = Cam::from_slice(b"HELLOWORLD!!").unwrap();
        assert_eq!(cam.as_bytes(), b"HELLOWORLD!!");
        assert!(cam.ct_eq(&Cam::from_bytes(*b"HELLOWORLD!!")));
        assert!(!cam.ct_eq(&Cam::default()));

        assert!(Cam::from_slice(b"short").is_err());
    }

    #[test]
    fn test_verdict_parts() {
        let cam = Cam::from_bytes(*b"HELLOWORLD!!");

        let verdict = Verdict::Authenticated(cam);
        assert!(verdict.is_authenticated());
        assert_eq!(verdict.cam(), Some(&cam));
        assert_eq!(verdict.into_parts(), (true, cam));

        let verdict = Verdict::NotAuthenticated;
        assert!(!verdict.is_authenticated());
        assert_eq!(verdict.cam(), None);
        assert_eq!(verdict.into_parts(), (false, Cam::default()));
    }

    #[test]
    fn test_debug_is_hex() {
        let cam = Cam::from_bytes([0xab; CAM_LEN]);
        assert_eq!(format!("{:?}", cam), format!("Cam({})", "ab".repeat(CAM_LEN)));
    }
}

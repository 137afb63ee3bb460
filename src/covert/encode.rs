//! Embedding a CAM into a random field.

use crate::covert::{
    unix_now, Cam, RandomField, CAM_LEN, CIPHERTEXT_OFFSET, NONCE_OFFSET, RANDOM_LEN, TAG_OFFSET,
    TRUNCATED_TAG_LEN,
};
use crate::crypto::{Aead, SecureRandom, SharedKey, NONCE_SIZE};
use crate::error::Result;

/// Build a 32-byte random field carrying `cam`, stamped with the current time.
///
/// `context` (normally the SNI) is bound as associated data but not embedded.
///
/// # Errors
///
/// Returns [`Error::RandomGeneration`](crate::Error::RandomGeneration) if the
/// OS entropy source fails.
pub fn encode_random(key: &SharedKey, cam: &Cam, context: &[u8]) -> Result<RandomField> {
    encode_random_at(key, cam, context, unix_now())
}

/// Like [`encode_random`] with an explicit timestamp.
pub fn encode_random_at(
    key: &SharedKey,
    cam: &Cam,
    context: &[u8],
    now: u32,
) -> Result<RandomField> {
    // A repeated nonce under one key leaks the CAM and the Poly1305 key.
    let nonce: [u8; NONCE_SIZE] = SecureRandom::bytes()?;
    seal_field(key, cam, context, now, &nonce)
}

pub(crate) fn seal_field(
    key: &SharedKey,
    cam: &Cam,
    context: &[u8],
    now: u32,
    nonce: &[u8; NONCE_SIZE],
) -> Result<RandomField> {
    let aead = Aead::new(key);

    let mut ciphertext: [u8; CAM_LEN] = *cam.as_bytes();
    let tag = aead.seal_detached(nonce, context, &mut ciphertext)?;

    let mut random = [0u8; RANDOM_LEN];
    random[..NONCE_OFFSET].copy_from_slice(&now.to_be_bytes());
    random[NONCE_OFFSET..CIPHERTEXT_OFFSET].copy_from_slice(nonce);
    random[CIPHERTEXT_OFFSET..TAG_OFFSET].copy_from_slice(&ciphertext);
    random[TAG_OFFSET..].copy_from_slice(&tag[..TRUNCATED_TAG_LEN]);

    tracing::trace!(timestamp = now, "sealed CAM into random field");

    Ok(RandomField::from_bytes(random))
}

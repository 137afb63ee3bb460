//! Extracting and verifying a CAM from a received random field.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::covert::{
    unix_now, Cam, RandomField, TagCheck, Verdict, CAM_LEN, DEFAULT_WINDOW_SECS,
    TRUNCATED_TAG_LEN,
};
use crate::crypto::{Aead, SharedKey, TAG_SIZE};
use crate::error::{Error, Result};

/// Inspect a received random field against the current time.
///
/// `window_secs <= 0` selects [`DEFAULT_WINDOW_SECS`]. The tag is checked with
/// [`TagCheck::Truncated`].
///
/// # Errors
///
/// - [`Error::Length`] if `random` is not 32 bytes
/// - [`Error::ReplayWindow`] if the timestamp is outside the window
///
/// A wrong key, wrong context or tampered field is *not* an error; it yields
/// [`Verdict::NotAuthenticated`].
pub fn decode_random(
    random: &[u8],
    key: &SharedKey,
    context: &[u8],
    window_secs: i64,
) -> Result<Verdict> {
    decode_random_at(
        random,
        key,
        context,
        window_secs,
        unix_now(),
        TagCheck::default(),
    )
}

/// Like [`decode_random`] with an explicit clock reading and tag policy.
pub fn decode_random_at(
    random: &[u8],
    key: &SharedKey,
    context: &[u8],
    window_secs: i64,
    now: u32,
    tag_check: TagCheck,
) -> Result<Verdict> {
    let field = RandomField::try_from(random).map_err(|e| {
        tracing::debug!(len = random.len(), "rejecting random field: {}", e);
        e
    })?;

    let window = normalize_window(window_secs);
    let timestamp = field.timestamp();
    if !within_window(timestamp, now, window) {
        tracing::debug!(timestamp, now, window, "random field outside replay window");
        return Err(Error::ReplayWindow {
            timestamp,
            now,
            window,
        });
    }

    let aead = Aead::new(key);
    let verdict = match tag_check {
        TagCheck::Truncated => verify_truncated(&aead, &field, context)?,
        TagCheck::ZeroPaddedLegacy => verify_zero_padded(&aead, &field, context),
    };

    tracing::trace!(
        authenticated = verdict.is_authenticated(),
        ?tag_check,
        "inspected random field"
    );

    Ok(verdict)
}

/// Map a configured window to seconds: non-positive means the default,
/// anything beyond `u32::MAX` saturates.
pub fn normalize_window(window_secs: i64) -> u32 {
    if window_secs <= 0 {
        DEFAULT_WINDOW_SECS
    } else {
        u32::try_from(window_secs).unwrap_or(u32::MAX)
    }
}

/// Whether `timestamp` is within `window` seconds of `now` on the 32-bit
/// wrapping clock. Both boundaries are inclusive.
pub fn within_window(timestamp: u32, now: u32, window: u32) -> bool {
    let distance = now
        .wrapping_sub(timestamp)
        .min(timestamp.wrapping_sub(now));
    distance <= window
}

fn verify_truncated(aead: &Aead, field: &RandomField, context: &[u8]) -> Result<Verdict> {
    let nonce = field.nonce();

    // ChaCha20 ciphertext is plaintext XOR keystream.
    let keystream: [u8; CAM_LEN] = aead.keystream(&nonce)?;
    let mut cam = field.ciphertext();
    for (c, k) in cam.iter_mut().zip(keystream.iter()) {
        *c ^= k;
    }

    // Re-seal the candidate; its ciphertext equals the received one by
    // construction, so only the tag prefix needs comparing.
    let mut resealed = cam;
    let mut tag = aead.seal_detached(&nonce, context, &mut resealed)?;
    let matches: bool = tag[..TRUNCATED_TAG_LEN]
        .ct_eq(&field.truncated_tag()[..])
        .into();
    tag.zeroize();

    if matches {
        Ok(Verdict::Authenticated(Cam::from_bytes(cam)))
    } else {
        cam.zeroize();
        Ok(Verdict::NotAuthenticated)
    }
}

fn verify_zero_padded(aead: &Aead, field: &RandomField, context: &[u8]) -> Verdict {
    let mut tag = [0u8; TAG_SIZE];
    tag[..TRUNCATED_TAG_LEN].copy_from_slice(&field.truncated_tag());

    let mut buffer = field.ciphertext();
    if aead.open_detached(&field.nonce(), context, &mut buffer, &tag) {
        Verdict::Authenticated(Cam::from_bytes(buffer))
    } else {
        Verdict::NotAuthenticated
    }
}

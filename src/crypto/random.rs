//! Secure random number generation.
//!
//! Provides cryptographically secure random bytes using the operating
//! system's entropy source. Every call goes through the fallible path so an
//! unavailable entropy source surfaces as [`Error::RandomGeneration`]
//! instead of a panic.

use rand::RngCore;
use rand_core::OsRng;

use crate::error::{Error, Result};

/// Cryptographically secure random number generator.
///
/// Wraps the OS-provided entropy source (e.g., getrandom(2) on Linux,
/// BCryptGenRandom on Windows). Safe to call from any thread.
pub struct SecureRandom;

impl SecureRandom {
    /// Fill a buffer with cryptographically secure random bytes.
    pub fn fill(dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| Error::RandomGeneration(e.to_string()))
    }

    /// Generate a fixed-size array of random bytes.
    pub fn bytes<const N: usize>() -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        Self::fill(&mut buf)?;
        Ok(buf)
    }
}

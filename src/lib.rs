//! # NonAuth
//!
//! Covert mutual authentication carried in the 32-byte random field of a TLS
//! ClientHello or ServerHello.
//!
//! ## Field Layout
//!
//! ```text
//! 0        4                    16                   28     32
//! ┌────────┬────────────────────┬────────────────────┬──────┐
//! │ time   │ nonce              │ ChaCha20(CAM)      │ tag  │
//! │ BE u32 │ 12 bytes           │ 12 bytes           │ 4 B  │
//! └────────┴────────────────────┴────────────────────┴──────┘
//! ```
//!
//! To anyone without the shared key the field is 32 random-looking bytes.
//! A key holder recovers the 12-byte Covert Authentication Message (CAM) and
//! rejects stale timestamps.
//!
//! ## Design Goals
//!
//! 1. **Unobservability**: the hello keeps its normal shape and size
//! 2. **Indistinguishable failure**: a forged field and an ordinary random
//!    field produce the same [`Verdict`]
//! 3. **Freshness**: timestamps outside the skew window are rejected
//!
//! ## Example
//!
//! ```
//! use nonauth::{decode_random, encode_random, Cam, SharedKey, Verdict};
//!
//! let key = SharedKey::from_bytes([0u8; 32]);
//! let cam = Cam::from_bytes(*b"HELLOWORLD!!");
//!
//! let field = encode_random(&key, &cam, b"example.com")?;
//! let verdict = decode_random(field.as_bytes(), &key, b"example.com", 300)?;
//! assert_eq!(verdict, Verdict::Authenticated(cam));
//! # Ok::<(), nonauth::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod covert;
pub mod crypto;
pub mod error;

pub use covert::{
    decode_random, decode_random_at, encode_random, encode_random_at, Cam, NonAuthConfig,
    NonAuthConfigFile, RandomField, Role, TagCheck, Verdict,
};
pub use crypto::SharedKey;
pub use error::{Error, Result};

/// Protocol draft implemented by this crate
pub const PROTOCOL_DRAFT: &str = "draft-nonauth-00";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_round_trip() {
        let config = NonAuthConfig::new(
            SharedKey::from_bytes([7u8; 32]),
            Cam::from_bytes(*b"client-00001"),
            Cam::from_bytes(*b"server-00001"),
        );
        assert!(config.validate().is_ok());

        let field = config.embed(Role::Client, "cdn.example.net").unwrap();
        assert!(config
            .verify_peer(Role::Server, field.as_bytes(), "cdn.example.net")
            .unwrap());
        assert_eq!(PROTOCOL_DRAFT, "draft-nonauth-00");
    }
}

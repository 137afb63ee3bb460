//! NonAuth: a covert authentication message hidden in a hello random field.
//!
//! Both peers hold a pre-shared key. Each side seals its 12-byte CAM into the
//! 32 bytes that would otherwise be an ordinary `Random` value. Without the
//! key the field is indistinguishable from random; with it the receiver
//! recovers the CAM and checks that the embedded timestamp is fresh.
//!
//! ## Protocol Flow
//!
//! ```text
//! Client                                        Server
//!   |                                             |
//!   |  ClientHello.Random = seal(key, CAM_c, SNI) |
//!   |-------------------------------------------->|
//!   |                     [open, check window]    |
//!   |                                             |
//!   |  ServerHello.Random = seal(key, CAM_s, SNI) |
//!   |<--------------------------------------------|
//!   |  [open, check window]                       |
//! ```
//!
//! The rest of the handshake is untouched.

mod config;
mod decode;
mod encode;
mod field;

use std::time::{SystemTime, UNIX_EPOCH};

pub use config::{NonAuthConfig, NonAuthConfigFile};
pub use decode::{decode_random, decode_random_at, normalize_window, within_window};
pub use encode::{encode_random, encode_random_at};
pub use field::{Cam, RandomField, TagCheck, Verdict};

/// Length of a hello random field
pub const RANDOM_LEN: usize = 32;

/// Length of the big-endian timestamp prefix
pub const TIMESTAMP_LEN: usize = 4;

/// Offset of the AEAD nonce
pub const NONCE_OFFSET: usize = TIMESTAMP_LEN;

/// Offset of the encrypted CAM
pub const CIPHERTEXT_OFFSET: usize = NONCE_OFFSET + crate::crypto::NONCE_SIZE;

/// Length of the Covert Authentication Message
pub const CAM_LEN: usize = 12;

/// Offset of the truncated tag
pub const TAG_OFFSET: usize = CIPHERTEXT_OFFSET + CAM_LEN;

/// Number of tag bytes that fit in the field
pub const TRUNCATED_TAG_LEN: usize = 4;

/// Clock-skew window used when none (or a non-positive one) is configured.
pub const DEFAULT_WINDOW_SECS: u32 = 300;

/// Which side of the handshake we are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Sends ClientHello, embeds the client CAM
    Client,
    /// Sends ServerHello, embeds the server CAM
    Server,
}

impl Role {
    /// The other side of the handshake.
    pub fn peer(self) -> Role {
        match self {
            Role::Client => Role::Server,
            Role::Server => Role::Client,
        }
    }
}

/// Current Unix time truncated to 32 bits.
///
/// Wraps in 2106. A clock set before 1970 reads as 0.
pub fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(NONCE_OFFSET, 4);
        assert_eq!(CIPHERTEXT_OFFSET, 16);
        assert_eq!(TAG_OFFSET, 28);
        assert_eq!(TAG_OFFSET + TRUNCATED_TAG_LEN, RANDOM_LEN);
    }

    #[test]
    fn test_role_peer() {
        assert_eq!(Role::Client.peer(), Role::Server);
        assert_eq!(Role::Server.peer(), Role::Client);
    }

    #[test]
    fn test_unix_now_is_recent() {
        // 2024-01-01T00:00:00Z
        assert!(unix_now() > 1_704_067_200);
    }
}

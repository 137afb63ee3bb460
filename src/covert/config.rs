//! NonAuth configuration.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::covert::{
    decode_random_at, encode_random, normalize_window, unix_now, Cam, RandomField, Role, TagCheck,
    Verdict, DEFAULT_WINDOW_SECS, RANDOM_LEN,
};
use crate::crypto::{SecureRandom, SharedKey};
use crate::error::{Error, Result};

/// Runtime NonAuth settings for one endpoint.
///
/// Meant to sit inside a larger TLS configuration. Nothing here is read from
/// the environment; the embedding application supplies every value.
#[derive(Clone, Debug, Default)]
pub struct NonAuthConfig {
    /// Enable NonAuth on this connection
    pub enabled: bool,
    /// Pre-shared 32-byte key
    pub shared_key: SharedKey,
    /// CAM embedded in ClientHello.Random
    pub client_cam: Cam,
    /// CAM embedded in ServerHello.Random
    pub server_cam: Cam,
    /// Allowed clock skew in seconds (non-positive means 300)
    pub window_secs: i64,
    /// Truncated-tag verification policy
    pub tag_check: TagCheck,
}

impl NonAuthConfig {
    /// Create an enabled configuration.
    pub fn new(shared_key: SharedKey, client_cam: Cam, server_cam: Cam) -> Self {
        Self {
            enabled: true,
            shared_key,
            client_cam,
            server_cam,
            window_secs: i64::from(DEFAULT_WINDOW_SECS),
            tag_check: TagCheck::default(),
        }
    }

    /// Create an enabled configuration with a random key and random CAMs.
    pub fn generate() -> Result<Self> {
        let shared_key = SharedKey::from_bytes(SecureRandom::bytes()?);
        let client_cam = Cam::from_bytes(SecureRandom::bytes()?);
        let server_cam = Cam::from_bytes(SecureRandom::bytes()?);
        Ok(Self::new(shared_key, client_cam, server_cam))
    }

    /// Effective window in seconds.
    pub fn window(&self) -> u32 {
        normalize_window(self.window_secs)
    }

    /// CAM we embed when acting as `role`.
    pub fn own_cam(&self, role: Role) -> &Cam {
        match role {
            Role::Client => &self.client_cam,
            Role::Server => &self.server_cam,
        }
    }

    /// CAM we expect from the peer when acting as `role`.
    pub fn peer_cam(&self, role: Role) -> &Cam {
        self.own_cam(role.peer())
    }

    /// Validate the configuration.
    ///
    /// A disabled configuration is always valid.
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.shared_key.is_zero() {
            return Err(Error::config("shared_key cannot be all zeros"));
        }
        // Equal CAMs would let a reflected hello pass as the peer's.
        if self.client_cam.ct_eq(&self.server_cam) {
            return Err(Error::config("client_cam and server_cam must differ"));
        }
        Ok(())
    }

    /// Produce the random field for our own hello.
    ///
    /// When disabled the field is plain OS randomness, so the hello looks the
    /// same either way.
    pub fn embed(&self, role: Role, sni: &str) -> Result<RandomField> {
        if !self.enabled {
            let random: [u8; RANDOM_LEN] = SecureRandom::bytes()?;
            return Ok(RandomField::from_bytes(random));
        }
        encode_random(&self.shared_key, self.own_cam(role), sni.as_bytes())
    }

    /// Check the peer's random field against the CAM we expect from it.
    ///
    /// Returns `Ok(false)` when disabled, when the field does not
    /// authenticate, or when it carries some other CAM.
    pub fn verify_peer(&self, role: Role, random: &[u8], sni: &str) -> Result<bool> {
        self.verify_peer_at(role, random, sni, unix_now())
    }

    /// Like [`verify_peer`](Self::verify_peer) with an explicit clock reading.
    pub fn verify_peer_at(&self, role: Role, random: &[u8], sni: &str, now: u32) -> Result<bool> {
        if !self.enabled {
            return Ok(false);
        }
        let verdict = self.inspect_at(random, sni, now)?;
        Ok(match verdict.cam() {
            Some(cam) => cam.ct_eq(self.peer_cam(role)),
            None => false,
        })
    }

    /// Decode a random field with this configuration's key, window and tag
    /// policy, ignoring `enabled`.
    pub fn inspect_at(&self, random: &[u8], sni: &str, now: u32) -> Result<Verdict> {
        decode_random_at(
            random,
            &self.shared_key,
            sni.as_bytes(),
            self.window_secs,
            now,
            self.tag_check,
        )
    }
}

fn default_window_secs() -> i64 {
    i64::from(DEFAULT_WINDOW_SECS)
}

/// On-disk form of [`NonAuthConfig`] (TOML).
///
/// The key is base64, the CAMs are hex.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct NonAuthConfigFile {
    /// Enable NonAuth
    #[serde(default)]
    pub enabled: bool,
    /// Pre-shared key (base64, 32 bytes)
    pub shared_key: String,
    /// Client CAM (hex, 12 bytes)
    pub client_cam: String,
    /// Server CAM (hex, 12 bytes)
    pub server_cam: String,
    /// Allowed clock skew in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
    /// Truncated-tag verification policy
    #[serde(default)]
    #[zeroize(skip)]
    pub tag_check: TagCheck,
}

impl NonAuthConfigFile {
    /// Convert to runtime configuration.
    pub fn to_config(&self) -> Result<NonAuthConfig> {
        use base64::{engine::general_purpose::STANDARD, Engine};

        let mut key_bytes = STANDARD
            .decode(&self.shared_key)
            .map_err(|e| Error::config(format!("invalid base64 shared_key: {}", e)))?;
        let shared_key = SharedKey::from_slice(&key_bytes)
            .map_err(|_| Error::config("shared_key must be 32 bytes"));
        key_bytes.zeroize();

        Ok(NonAuthConfig {
            enabled: self.enabled,
            shared_key: shared_key?,
            client_cam: parse_cam("client_cam", &self.client_cam)?,
            server_cam: parse_cam("server_cam", &self.server_cam)?,
            window_secs: self.window_secs,
            tag_check: self.tag_check,
        })
    }

    /// Create from runtime configuration.
    pub fn from_config(config: &NonAuthConfig) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};

        Self {
            enabled: config.enabled,
            shared_key: STANDARD.encode(config.shared_key.as_bytes()),
            client_cam: hex::encode(config.client_cam.as_bytes()),
            server_cam: hex::encode(config.server_cam.as_bytes()),
            window_secs: config.window_secs,
            tag_check: config.tag_check,
        }
    }

    /// Parse from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(format!("invalid config file: {}", e)))
    }

    /// Render as TOML text.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("cannot serialize config: {}", e)))
    }
}

fn parse_cam(field: &str, text: &str) -> Result<Cam> {
    let bytes =
        hex::decode(text).map_err(|e| Error::config(format!("invalid hex {}: {}", field, e)))?;
    Cam::from_slice(&bytes).map_err(|_| Error::config(format!("{} must be 12 bytes", field)))
}

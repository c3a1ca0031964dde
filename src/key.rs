//! The AES-256 key used to open dictionary containers.
//!
//! # Security
//!
//! The key ships inside the host binary. That keeps the dictionary file from
//! being read casually, but anyone able to inspect the running program can
//! recover it. This is an accepted limitation of the format, not a defect.

use base64::prelude::*;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ContainerError, Result};

pub const KEY_LEN: usize = 32;

/// Development key (32 zero bytes). Replace it before distributing a build.
pub const DEFAULT_KEY_B64: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

/// 32 bytes of key material, zeroized on drop. `Debug` never prints the bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ContainerKey([u8; KEY_LEN]);

impl std::fmt::Debug for ContainerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ContainerKey")
            .field(&self.fingerprint())
            .finish()
    }
}

impl Default for ContainerKey {
    fn default() -> Self {
        Self([0u8; KEY_LEN])
    }
}

impl ContainerKey {
    #[must_use]
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decodes a standard or URL-safe base64 key of exactly 32 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let mut decoded = BASE64_STANDARD
            .decode(encoded.trim())
            .or_else(|_| BASE64_URL_SAFE.decode(encoded.trim()))
            .map_err(|_| ContainerError::invalid_key("invalid base64 encoding"))?;

        if decoded.len() != KEY_LEN {
            decoded.zeroize();
            return Err(ContainerError::invalid_key(
                "key must be exactly 32 bytes when decoded",
            ));
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self(bytes))
    }

    /// Short SHA-256 prefix, safe to log, for telling keys apart.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.0);
        hex::encode(&digest[..4])
    }

    pub(crate) fn expose_secret(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

//! Encrypted dictionary container.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────┬──────────┬──────────────────────────────┐
//! │  Magic   │    IV    │  AES-256-CBC ciphertext      │
//! │ "TCSV1"  │ 16 bytes │  N bytes, N > 0, N % 16 == 0 │
//! └──────────┴──────────┴──────────────────────────────┘
//! ```
//!
//! The plaintext is PKCS#7 padded before encryption. There is no separate
//! authentication tag: a bad key or damaged ciphertext is detected only through
//! the padding check.

use std::path::Path;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use tracing::{debug, warn};

use crate::error::{ContainerError, Result};
use crate::key::ContainerKey;
use crate::storage::Storage;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub const MAGIC: &[u8; 5] = b"TCSV1";
pub const IV_LEN: usize = 16;
pub const BLOCK_LEN: usize = 16;
pub const HEADER_LEN: usize = MAGIC.len() + IV_LEN; // 21
/// Header plus at least one ciphertext byte.
pub const MIN_CONTAINER_LEN: usize = HEADER_LEN + 1; // 22

#[derive(Debug, Clone, Copy)]
pub struct ParsedContainer<'a> {
    pub iv: [u8; IV_LEN],
    pub ciphertext: &'a [u8],
}

/// Validates the layout and splits out IV and ciphertext. No decryption happens here.
pub fn parse(container: &[u8]) -> Result<ParsedContainer<'_>> {
    if container.len() < MIN_CONTAINER_LEN {
        return Err(ContainerError::invalid_format("container too short"));
    }
    let (magic, rest) = container.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(ContainerError::invalid_format("magic mismatch"));
    }
    let (iv, ciphertext) = rest.split_at(IV_LEN);
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(ContainerError::invalid_format(
            "ciphertext is not a whole number of blocks",
        ));
    }
    let iv: [u8; IV_LEN] = iv
        .try_into()
        .map_err(|_| ContainerError::invalid_format("truncated IV"))?;
    Ok(ParsedContainer { iv, ciphertext })
}

/// Decrypts a container and strips the padding.
pub fn open(container: &[u8], key: &ContainerKey) -> Result<Vec<u8>> {
    let parsed = parse(container)?;
    Aes256CbcDec::new_from_slices(key.expose_secret(), &parsed.iv)
        .map_err(|_| ContainerError::invalid_key("key or IV has the wrong length"))?
        .decrypt_padded_vec_mut::<Pkcs7>(parsed.ciphertext)
        .map_err(|_| ContainerError::decrypt_failed("bad padding (wrong key or corrupted data)"))
}

/// Encrypts `plaintext` into a container with the given IV.
pub fn seal(plaintext: &[u8], key: &ContainerKey, iv: &[u8; IV_LEN]) -> Result<Vec<u8>> {
    let ciphertext = Aes256CbcEnc::new_from_slices(key.expose_secret(), iv)
        .map_err(|_| ContainerError::invalid_key("key or IV has the wrong length"))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// [`seal`] with a fresh random IV. Returns the container and the IV used.
pub fn seal_random(plaintext: &[u8], key: &ContainerKey) -> Result<(Vec<u8>, [u8; IV_LEN])> {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);
    let container = seal(plaintext, key, &iv)?;
    Ok((container, iv))
}

/// Decrypts `enc_path` and writes the plaintext to `plain_path`.
///
/// Nothing is written unless decryption succeeds. The plaintext bytes are
/// written unchanged. Returns the number of plaintext bytes written.
pub fn try_decrypt_to_plaintext(
    storage: &dyn Storage,
    enc_path: &Path,
    plain_path: &Path,
    key: &ContainerKey,
) -> Result<usize> {
    let container = storage
        .read_all_bytes(enc_path)
        .map_err(|e| ContainerError::io("read container", enc_path, e))?;
    let plaintext = open(&container, key)?;

    if let Some(dir) = plain_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        storage
            .ensure_directory(dir)
            .map_err(|e| ContainerError::io("create directory", dir, e))?;
    }
    storage
        .write_all_bytes(plain_path, &plaintext)
        .map_err(|e| ContainerError::io("write plaintext", plain_path, e))?;

    debug!(
        enc = %enc_path.display(),
        plain = %plain_path.display(),
        bytes = plaintext.len(),
        key = %key.fingerprint(),
        "materialized plaintext dictionary"
    );
    Ok(plaintext.len())
}

/// Fail-closed wrapper around [`try_decrypt_to_plaintext`]: `true` on success,
/// `false` (logged, nothing written) on any failure.
pub fn decrypt_to_plaintext(
    storage: &dyn Storage,
    enc_path: &Path,
    plain_path: &Path,
    key: &ContainerKey,
) -> bool {
    match try_decrypt_to_plaintext(storage, enc_path, plain_path, key) {
        Ok(_) => true,
        Err(err) => {
            warn!(enc = %enc_path.display(), error = %err, "could not decrypt dictionary container");
            false
        }
    }
}

/// Reads a plaintext dictionary and writes it as a container. Returns the IV.
pub fn encrypt_file(
    storage: &dyn Storage,
    plain_path: &Path,
    enc_path: &Path,
    key: &ContainerKey,
) -> Result<[u8; IV_LEN]> {
    let plaintext = storage
        .read_all_bytes(plain_path)
        .map_err(|e| ContainerError::io("read plaintext", plain_path, e))?;
    let (container, iv) = seal_random(&plaintext, key)?;
    if let Some(dir) = enc_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        storage
            .ensure_directory(dir)
            .map_err(|e| ContainerError::io("create directory", dir, e))?;
    }
    storage
        .write_all_bytes(enc_path, &container)
        .map_err(|e| ContainerError::io("write container", enc_path, e))?;
    Ok(iv)
}

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::errors::CoreError;

/// Argon2id cost parameters, recorded in every snapshot header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Minimal costs, for tests and throwaway stores.
    pub fn insecure_fast() -> Self {
        Self {
            memory_cost: 8,
            time_cost: 1,
            parallelism: 1,
        }
    }
}

/// Derive a 256-bit key from `password` with Argon2id.
pub fn derive_key(
    password: &str,
    salt: &[u8; 16],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; 32]>, CoreError> {
    let argon2_params = Params::new(params.memory_cost, params.time_cost, params.parallelism, Some(32))
        .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

    let mut key = Zeroizing::new([0u8; 32]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;
    Ok(key)
}

/// AES-256-GCM encrypt; the 16-byte tag is appended to the output.
pub fn encrypt(plaintext: &[u8], key: &[u8; 32], nonce: &[u8; 12]) -> Result<Vec<u8>, CoreError> {
    Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CoreError::Encryption(e.to_string()))
}

/// AES-256-GCM decrypt. A wrong key or tampered data yields
/// [`CoreError::Decryption`].
pub fn decrypt(ciphertext: &[u8], key: &[u8; 32], nonce: &[u8; 12]) -> Result<Vec<u8>, CoreError> {
    Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CoreError::Decryption)
}

fn random_bytes<const N: usize>(what: &str) -> Result<[u8; N], CoreError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate random {what}: {e}")))?;
    Ok(buf)
}

pub fn generate_salt() -> Result<[u8; 16], CoreError> {
    random_bytes("salt")
}

pub fn generate_nonce() -> Result<[u8; 12], CoreError> {
    random_bytes("nonce")
}

/// A password-derived key kept for the lifetime of an open store.
///
/// Deriving once means each snapshot write costs one AES pass instead of a
/// full Argon2 run. Every write still draws a fresh nonce.
pub struct SnapshotKey {
    key: Zeroizing<[u8; 32]>,
    salt: [u8; 16],
    params: KdfParams,
}

impl SnapshotKey {
    /// Derive a key for a new store under a fresh random salt.
    pub fn generate(password: &str, params: KdfParams) -> Result<Self, CoreError> {
        let salt = generate_salt()?;
        Self::derive(password, salt, params)
    }

    /// Re-derive the key of an existing snapshot from its header values.
    pub fn derive(password: &str, salt: [u8; 16], params: KdfParams) -> Result<Self, CoreError> {
        Ok(Self {
            key: derive_key(password, &salt, &params)?,
            salt,
            params,
        })
    }

    pub fn salt(&self) -> &[u8; 16] {
        &self.salt
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Encrypt under a fresh nonce. Returns `(nonce, ciphertext)`.
    pub fn seal(&self, plaintext: &[u8]) -> Result<([u8; 12], Vec<u8>), CoreError> {
        let nonce = generate_nonce()?;
        let ciphertext = encrypt(plaintext, &self.key, &nonce)?;
        Ok((nonce, ciphertext))
    }

    pub fn open(&self, nonce: &[u8; 12], ciphertext: &[u8]) -> Result<Vec<u8>, CoreError> {
        decrypt(ciphertext, &self.key, nonce)
    }
}

impl std::fmt::Debug for SnapshotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotKey")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

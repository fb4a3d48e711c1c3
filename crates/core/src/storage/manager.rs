use std::path::Path;

use crate::errors::CoreError;

use super::datastore::Database;
use super::encryption::{KdfParams, SnapshotKey};
use super::format::{self, SnapshotHeader};

/// Encrypted snapshot persistence for a [`Database`].
///
/// Flow: Database → bincode → AES-256-GCM(Argon2id(password)) → WWDB bytes
pub struct StorageManager;

impl StorageManager {
    /// Seal a database under an already-derived key.
    pub fn save_to_bytes(db: &Database, key: &SnapshotKey) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(db)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize database: {e}")))?;
        let (nonce, ciphertext) = key.seal(&plaintext)?;

        let header = SnapshotHeader {
            version: format::CURRENT_VERSION,
            kdf_params: *key.params(),
            salt: *key.salt(),
            nonce,
            ciphertext_len: ciphertext.len() as u64,
        };
        Ok(format::encode(&header, &ciphertext))
    }

    /// Seal a database under a freshly derived key.
    pub fn save_with_password(
        db: &Database,
        password: &str,
        params: KdfParams,
    ) -> Result<Vec<u8>, CoreError> {
        let key = SnapshotKey::generate(password, params)?;
        Self::save_to_bytes(db, &key)
    }

    /// Open a snapshot. Returns the database together with the derived key,
    /// so later saves can reuse it.
    pub fn load_from_bytes(data: &[u8], password: &str) -> Result<(Database, SnapshotKey), CoreError> {
        let (header, ciphertext) = format::decode(data)?;
        let key = SnapshotKey::derive(password, header.salt, header.kdf_params)?;
        let plaintext = key.open(&header.nonce, ciphertext)?;

        let db = bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize database: {e}")))?;
        Ok((db, key))
    }

    /// Write bytes via a sibling temp file and rename, so a crash mid-write
    /// never leaves a half-written snapshot behind.
    pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    pub async fn load_from_file(path: &Path, password: &str) -> Result<(Database, SnapshotKey), CoreError> {
        let bytes = tokio::fs::read(path).await?;
        Self::load_from_bytes(&bytes, password)
    }
}

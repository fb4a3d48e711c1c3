use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::errors::CoreError;
use crate::models::wallet::KeypairJson;

use super::address::{address_to_bytes, bytes_to_address};

/// An Ed25519 wallet holding at most one keypair or one bare public key.
///
/// Holding only a public key allows verification but not signing. Importing
/// a public key drops any previously loaded secret.
#[derive(Default)]
pub struct SolanaWallet {
    signing_key: Option<SigningKey>,
    public_key: Option<VerifyingKey>,
}

impl std::fmt::Debug for SolanaWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaWallet")
            .field("public_key", &self.get_public_key().ok())
            .field("can_sign", &self.signing_key.is_some())
            .finish()
    }
}

impl SolanaWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh keypair from the OS RNG. Returns the base58 public key.
    pub fn generate_keypair(&mut self) -> String {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public_key = signing_key.verifying_key();
        self.signing_key = Some(signing_key);
        self.public_key = Some(public_key);
        bytes_to_address(public_key.as_bytes())
    }

    /// Load a keypair from a base58 secret key. Returns the base58 public key.
    ///
    /// Accepts either the 32-byte seed or the 64-byte `seed ‖ public key`
    /// form; in the latter the embedded public key must match the seed.
    pub fn import_keypair(&mut self, secret_key_bs58: &str) -> Result<String, CoreError> {
        let bytes = Zeroizing::new(
            bs58::decode(secret_key_bs58.trim())
                .into_vec()
                .map_err(|e| CoreError::InvalidSecretKey(format!("base58 decode failed: {e}")))?,
        );

        let signing_key = match bytes.len() {
            32 => {
                let mut seed = Zeroizing::new([0u8; 32]);
                seed.copy_from_slice(&bytes);
                SigningKey::from_bytes(&seed)
            }
            64 => {
                let mut pair = Zeroizing::new([0u8; 64]);
                pair.copy_from_slice(&bytes);
                SigningKey::from_keypair_bytes(&pair).map_err(|_| {
                    CoreError::InvalidSecretKey("public half does not match the seed".into())
                })?
            }
            n => {
                return Err(CoreError::InvalidSecretKey(format!(
                    "expected 32 or 64 bytes, got {n}"
                )))
            }
        };

        let public_key = signing_key.verifying_key();
        self.signing_key = Some(signing_key);
        self.public_key = Some(public_key);
        Ok(bytes_to_address(public_key.as_bytes()))
    }

    /// Load a bare public key for verification.
    pub fn import_public_key(&mut self, public_key_bs58: &str) -> Result<(), CoreError> {
        let bytes = address_to_bytes(public_key_bs58)?;
        let public_key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| CoreError::InvalidPublicKey(format!("not a valid Ed25519 point: {e}")))?;
        self.signing_key = None;
        self.public_key = Some(public_key);
        Ok(())
    }

    pub fn get_public_key(&self) -> Result<String, CoreError> {
        self.public_key
            .map(|pk| bytes_to_address(pk.as_bytes()))
            .ok_or_else(|| CoreError::Wallet("No public key available".into()))
    }

    /// Raw public key bytes of the loaded key.
    pub fn public_key_bytes(&self) -> Result<[u8; 32], CoreError> {
        self.public_key
            .map(|pk| pk.to_bytes())
            .ok_or_else(|| CoreError::Wallet("No public key available".into()))
    }

    /// Sign `message` with the loaded keypair. Returns the base58 signature.
    pub fn sign_message(&self, message: &[u8]) -> Result<String, CoreError> {
        let signature = self.signing_key()?.sign(message);
        Ok(bs58::encode(signature.to_bytes()).into_string())
    }

    /// Verify a base58 signature of `message` against the loaded public key.
    ///
    /// A well-formed signature that does not match yields `Ok(false)`;
    /// a malformed one is an error.
    pub fn verify_signature(&self, message: &[u8], signature_bs58: &str) -> Result<bool, CoreError> {
        let public_key = self.public_key.as_ref().ok_or_else(|| {
            CoreError::Wallet("No public key available for verification".into())
        })?;

        let bytes = bs58::decode(signature_bs58.trim())
            .into_vec()
            .map_err(|e| CoreError::InvalidSignature(format!("base58 decode failed: {e}")))?;
        let signature = Signature::from_slice(&bytes)
            .map_err(|_| CoreError::InvalidSignature(format!("expected 64 bytes, got {}", bytes.len())))?;

        Ok(public_key.verify(message, &signature).is_ok())
    }

    /// Export both halves of the loaded keypair as base58.
    pub fn export_keypair(&self) -> Result<KeypairJson, CoreError> {
        let signing_key = self
            .signing_key
            .as_ref()
            .ok_or_else(|| CoreError::Wallet("No keypair available for export".into()))?;
        let seed = Zeroizing::new(signing_key.to_bytes());
        Ok(KeypairJson {
            public_key: bytes_to_address(signing_key.verifying_key().as_bytes()),
            secret_key: bs58::encode(seed.as_ref()).into_string(),
        })
    }

    pub(crate) fn signing_key(&self) -> Result<&SigningKey, CoreError> {
        self.signing_key
            .as_ref()
            .ok_or_else(|| CoreError::Wallet("No keypair available for signing".into()))
    }
}

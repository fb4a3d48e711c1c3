//! Solana addresses are the base58 encoding of a raw 32-byte Ed25519
//! public key. No hashing is involved.

use crate::errors::CoreError;

/// Decode a base58 address into its 32 key bytes.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], CoreError> {
    let bytes = bs58::decode(address.trim())
        .into_vec()
        .map_err(|e| CoreError::InvalidPublicKey(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        CoreError::InvalidPublicKey(format!("expected 32 bytes, got {}", v.len()))
    })
}

pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Check that `address` decodes to exactly 32 bytes.
pub fn validate_address(address: &str) -> Result<(), CoreError> {
    address_to_bytes(address).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_program_is_all_zeroes() {
        assert_eq!(bytes_to_address(&[0u8; 32]), "11111111111111111111111111111111");
        assert_eq!(address_to_bytes("11111111111111111111111111111111").unwrap(), [0u8; 32]);
    }

    #[test]
    fn token_program_round_trips() {
        let addr = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let bytes = address_to_bytes(addr).unwrap();
        assert_eq!(bytes_to_address(&bytes), addr);
    }

    #[test]
    fn rejects_wrong_length_and_garbage() {
        assert!(matches!(validate_address("1"), Err(CoreError::InvalidPublicKey(_))));
        assert!(validate_address("not-base58-0OIl").is_err());
    }
}

//! Solana wallet layer.
//!
//! Keypairs, message signing and verification run in-process on
//! `ed25519-dalek`; balances, token accounts and transfer submission go
//! through the JSON-RPC interface in [`rpc`]. Transactions are assembled in
//! the compact wire format by hand (see [`transaction`]) so no Solana SDK
//! is pulled in.

pub mod address;
pub mod keypair;
pub mod rpc;
pub mod tokens;
pub mod transaction;

pub use keypair::SolanaWallet;
pub use rpc::{HttpSolanaRpc, SolanaRpc, TokenAccount};

use crate::errors::CoreError;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Convert a SOL amount to lamports.
///
/// Rejects non-finite, non-positive and sub-lamport amounts, and amounts
/// that would overflow `u64`.
pub fn sol_to_lamports(amount: f64) -> Result<u64, CoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::ValidationError(format!(
            "Transfer amount must be a positive number of SOL, got {amount}"
        )));
    }
    let lamports = (amount * LAMPORTS_PER_SOL as f64).round();
    if lamports < 1.0 {
        return Err(CoreError::ValidationError(format!(
            "Transfer amount {amount} SOL is below one lamport"
        )));
    }
    if lamports >= u64::MAX as f64 {
        return Err(CoreError::ValidationError(format!(
            "Transfer amount {amount} SOL is too large"
        )));
    }
    Ok(lamports as u64)
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

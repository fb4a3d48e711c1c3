use log::{error, info};
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::wallet::{GeneratedWallet, TokenBalance};
use crate::solana::address::address_to_bytes;
use crate::solana::tokens::{symbol_for_mint, TOKEN_PROGRAM_ID};
use crate::solana::transaction::{self, build_sol_transfer};
use crate::solana::{lamports_to_sol, sol_to_lamports, SolanaRpc, SolanaWallet};

/// Solana wallet operations exposed to the HTTP layer.
///
/// Each call loads its key material into a fresh [`SolanaWallet`]; nothing
/// is retained between calls. Failures are logged and propagated, never
/// retried here.
pub struct SolanaService {
    rpc: Arc<dyn SolanaRpc>,
}

impl SolanaService {
    pub fn new(rpc: Arc<dyn SolanaRpc>) -> Self {
        Self { rpc }
    }

    /// Generate a new keypair. The exported keypair is returned as a JSON
    /// string alongside the public key.
    pub fn generate_wallet(&self) -> Result<GeneratedWallet, CoreError> {
        let mut wallet = SolanaWallet::new();
        let public_key = wallet.generate_keypair();
        let keypair = wallet.export_keypair()?;
        Ok(GeneratedWallet {
            public_key,
            keypair_json: serde_json::to_string(&keypair)?,
        })
    }

    /// Public key belonging to a base58 secret key.
    pub fn import_wallet(&self, secret_key: &str) -> Result<String, CoreError> {
        let mut wallet = SolanaWallet::new();
        wallet.import_keypair(secret_key)
    }

    /// SOL balance of `public_key`.
    pub async fn get_sol_balance(&self, public_key: &str) -> Result<f64, CoreError> {
        address_to_bytes(public_key)?;
        let lamports = self.rpc.get_balance(public_key).await.map_err(|e| {
            error!("Error fetching SOL balance for {public_key}: {e}");
            e
        })?;
        Ok(lamports_to_sol(lamports))
    }

    /// SPL token balances of `public_key`, labelled from the known-mint map.
    pub async fn get_token_balances(&self, public_key: &str) -> Result<Vec<TokenBalance>, CoreError> {
        address_to_bytes(public_key)?;
        let accounts = self
            .rpc
            .get_token_accounts(public_key, TOKEN_PROGRAM_ID)
            .await
            .map_err(|e| {
                error!("Error fetching token balances for {public_key}: {e}");
                e
            })?;

        Ok(accounts
            .into_iter()
            .map(|acct| TokenBalance {
                symbol: symbol_for_mint(&acct.mint).to_string(),
                mint: acct.mint,
                amount: acct.amount,
                decimals: acct.decimals,
                ui_amount: acct.ui_amount,
            })
            .collect())
    }

    /// Transfer `amount` SOL from the wallet of `secret_key` to `recipient`.
    /// Returns the transaction signature.
    pub async fn transfer_sol(
        &self,
        secret_key: &str,
        recipient: &str,
        amount: f64,
    ) -> Result<String, CoreError> {
        let mut wallet = SolanaWallet::new();
        let sender = wallet.import_keypair(secret_key)?;
        let to = address_to_bytes(recipient)?;
        let lamports = sol_to_lamports(amount)?;

        let blockhash = self.rpc.get_latest_blockhash().await.map_err(|e| {
            error!("Error fetching blockhash for transfer from {sender}: {e}");
            e
        })?;
        let message = build_sol_transfer(&wallet.public_key_bytes()?, &to, lamports, &blockhash)?;
        let (wire, _) = transaction::sign_message(&message, wallet.signing_key()?)?;

        let signature = self.rpc.send_transaction(&wire).await.map_err(|e| {
            error!("Error transferring {amount} SOL from {sender} to {recipient}: {e}");
            e
        })?;
        info!("Submitted transfer of {lamports} lamports from {sender} to {recipient}: {signature}");
        Ok(signature)
    }

    /// Sign a UTF-8 message with `secret_key`. Returns the base58 signature.
    pub fn sign_message(&self, secret_key: &str, message: &str) -> Result<String, CoreError> {
        let mut wallet = SolanaWallet::new();
        wallet.import_keypair(secret_key)?;
        wallet.sign_message(message.as_bytes())
    }

    /// Check a base58 signature of `message` against `public_key`.
    pub fn verify_signature(
        &self,
        public_key: &str,
        message: &str,
        signature: &str,
    ) -> Result<bool, CoreError> {
        let mut wallet = SolanaWallet::new();
        wallet.import_public_key(public_key)?;
        wallet.verify_signature(message.as_bytes(), signature)
    }
}

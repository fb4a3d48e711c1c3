use chrono::Utc;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::transaction::{
    AccountKind, NewTransaction, Transaction, TransactionStatus, TransactionUpdate,
};
use crate::storage::Datastore;

/// Transfer records on the `transactions` collection.
///
/// Status changes are driven by the caller; any status string is
/// accepted.
pub struct TransactionService {
    store: Arc<dyn Datastore>,
    list_limit: usize,
}

fn missing() -> CoreError {
    CoreError::ValidationError("Missing required fields".into())
}

fn account(value: Option<String>) -> Result<AccountKind, CoreError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(AccountKind::from)
        .ok_or_else(missing)
}

impl TransactionService {
    pub fn new(store: Arc<dyn Datastore>, list_limit: usize) -> Self {
        Self { store, list_limit }
    }

    /// Record a new pending transfer.
    pub async fn create(&self, input: NewTransaction) -> Result<Transaction, CoreError> {
        let user_id = input
            .user_id
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(missing)?;
        let from = account(input.from)?;
        let to = account(input.to)?;
        let amount_usd = input.amount_usd.ok_or_else(missing)?;
        if !amount_usd.is_finite() || amount_usd <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "amountUSD must be a positive number, got {amount_usd}"
            )));
        }

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id,
            from,
            to,
            amount_usd,
            status: TransactionStatus::Pending,
            tx_hash: None,
            initiated_at: Utc::now(),
            completed_at: None,
        };
        self.store.put_transaction(transaction.clone()).await?;
        info!(
            "Created transaction {} ({} → {}, ${:.2}) for {}",
            transaction.id, transaction.from, transaction.to, transaction.amount_usd, transaction.user_id
        );
        Ok(transaction)
    }

    /// Set the status of a transaction.
    ///
    /// `completed` stamps `completed_at`; `tx_hash` is only replaced when
    /// the update supplies one.
    pub async fn update_status(&self, id: &str, update: TransactionUpdate) -> Result<Transaction, CoreError> {
        let status: TransactionStatus = update
            .status
            .filter(|s| !s.trim().is_empty())
            .map(TransactionStatus::from)
            .ok_or_else(|| CoreError::ValidationError("Status is required".into()))?;

        let mut transaction = self.get(id).await?;
        if status == TransactionStatus::Completed {
            transaction.completed_at = Some(Utc::now());
        }
        transaction.status = status;
        if let Some(hash) = update.tx_hash.filter(|h| !h.is_empty()) {
            transaction.tx_hash = Some(hash);
        }

        self.store.put_transaction(transaction.clone()).await?;
        Ok(transaction)
    }

    /// Most recent transactions of a user, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Transaction>, CoreError> {
        self.store.transactions_for_user(user_id, self.list_limit).await
    }

    pub async fn get(&self, id: &str) -> Result<Transaction, CoreError> {
        self.store
            .get_transaction(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Transaction", id))
    }
}

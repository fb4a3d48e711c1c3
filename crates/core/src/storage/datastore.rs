use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;
use crate::models::transaction::Transaction;
use crate::models::user::User;

/// Document store over the `users`, `portfolios` and `transactions`
/// collections.
///
/// Every write replaces the whole document (last write wins). There are no
/// multi-document transactions; read-modify-write sequences in the services
/// are not atomic with respect to each other.
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn get_user(&self, uid: &str) -> Result<Option<User>, CoreError>;

    async fn put_user(&self, user: User) -> Result<(), CoreError>;

    /// Portfolio documents are keyed by user id.
    async fn get_portfolio(&self, user_id: &str) -> Result<Option<Portfolio>, CoreError>;

    async fn put_portfolio(&self, portfolio: Portfolio) -> Result<(), CoreError>;

    async fn get_transaction(&self, id: &str) -> Result<Option<Transaction>, CoreError>;

    async fn put_transaction(&self, transaction: Transaction) -> Result<(), CoreError>;

    /// A user's transactions, newest `initiated_at` first, at most `limit`.
    async fn transactions_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>, CoreError>;
}

/// The full contents of a store, as persisted in a snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub users: HashMap<String, User>,
    pub portfolios: HashMap<String, Portfolio>,
    pub transactions: HashMap<String, Transaction>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transactions_for_user(&self, user_id: &str, limit: usize) -> Vec<Transaction> {
        let mut found: Vec<Transaction> = self
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.initiated_at.cmp(&a.initiated_at).then_with(|| a.id.cmp(&b.id)));
        found.truncate(limit);
        found
    }
}

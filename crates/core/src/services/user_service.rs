use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::user::{LinkWalletRequest, LinkedWallet, NewUser, User, UserUpdate, WalletType};
use crate::solana::address::validate_address;
use crate::storage::Datastore;

/// Profile operations on the `users` collection.
pub struct UserService {
    store: Arc<dyn Datastore>,
}

fn required(value: Option<String>) -> Result<String, CoreError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::ValidationError("Missing required fields".into()))
}

impl UserService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    pub async fn get_user(&self, uid: &str) -> Result<User, CoreError> {
        self.store
            .get_user(uid)
            .await?
            .ok_or_else(|| CoreError::not_found("User", uid))
    }

    /// Create a profile on signup. An existing uid is rejected.
    pub async fn create_user(&self, input: NewUser) -> Result<User, CoreError> {
        let uid = required(input.uid)?;
        let email = required(input.email)?;
        if self.store.get_user(&uid).await?.is_some() {
            return Err(CoreError::ValidationError(format!("User {uid} already exists")));
        }

        let user = User::new(uid, email);
        self.store.put_user(user.clone()).await?;
        info!("Created user {}", user.uid);
        Ok(user)
    }

    /// Apply a partial profile update. At least one field is required.
    pub async fn update_user(&self, uid: &str, update: UserUpdate) -> Result<User, CoreError> {
        if update.is_empty() {
            return Err(CoreError::ValidationError("Missing required fields".into()));
        }
        let mut user = self.get_user(uid).await?;

        if let Some(email) = update.email {
            user.email = required(Some(email))?;
        }
        if let Some(linked) = update.alpaca_linked {
            user.alpaca_linked = linked;
        }
        if let Some(linked) = update.plaid_linked {
            user.plaid_linked = linked;
        }

        self.store.put_user(user.clone()).await?;
        Ok(user)
    }

    /// Attach a wallet to the profile. Linking an address that is already
    /// present is a no-op. Solana addresses must decode to 32 bytes.
    pub async fn link_wallet(&self, uid: &str, request: LinkWalletRequest) -> Result<User, CoreError> {
        let wallet_type: WalletType = required(request.wallet_type)?
            .parse()
            .map_err(CoreError::ValidationError)?;
        let address = required(request.address)?;
        if wallet_type == WalletType::Solana {
            validate_address(&address)?;
        }

        let mut user = self.get_user(uid).await?;
        if user.wallets.iter().any(|w| w.address == address) {
            return Ok(user);
        }
        user.wallets.push(LinkedWallet {
            wallet_type,
            address,
        });
        self.store.put_user(user.clone()).await?;
        Ok(user)
    }

    /// Stamp `last_login` with the current time.
    pub async fn record_login(&self, uid: &str) -> Result<User, CoreError> {
        let mut user = self.get_user(uid).await?;
        user.last_login = Utc::now();
        self.store.put_user(user.clone()).await?;
        Ok(user)
    }
}

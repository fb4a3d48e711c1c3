use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;
use crate::models::transaction::Transaction;
use crate::models::user::User;

use super::datastore::{Database, Datastore};
use super::encryption::{KdfParams, SnapshotKey};
use super::manager::StorageManager;

struct Persistence {
    path: PathBuf,
    key: SnapshotKey,
}

/// In-memory [`Datastore`], optionally mirrored to an encrypted snapshot
/// file that is rewritten after every successful write.
pub struct MemoryStore {
    db: RwLock<Database>,
    persistence: Option<Persistence>,
}

impl MemoryStore {
    /// Volatile store; contents are lost on drop.
    pub fn new() -> Self {
        Self::from_database(Database::new())
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            db: RwLock::new(db),
            persistence: None,
        }
    }

    /// Open (or create) an encrypted store at `path`.
    pub async fn open_encrypted(path: impl AsRef<Path>, password: &str) -> Result<Self, CoreError> {
        Self::open_encrypted_with(path, password, KdfParams::default()).await
    }

    /// Like [`open_encrypted`](Self::open_encrypted) with explicit KDF costs
    /// for a newly created file. An existing file keeps the costs in its header.
    pub async fn open_encrypted_with(
        path: impl AsRef<Path>,
        password: &str,
        params: KdfParams,
    ) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let (db, key) = if tokio::fs::try_exists(&path).await? {
            let (db, key) = StorageManager::load_from_file(&path, password).await?;
            info!(
                "Loaded {} users, {} portfolios, {} transactions from {}",
                db.users.len(),
                db.portfolios.len(),
                db.transactions.len(),
                path.display()
            );
            (db, key)
        } else {
            info!("Creating new encrypted store at {}", path.display());
            (Database::new(), SnapshotKey::generate(password, params)?)
        };

        let store = Self {
            db: RwLock::new(db),
            persistence: Some(Persistence { path, key }),
        };
        store.persist(&*store.db.read().await).await?;
        Ok(store)
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> Database {
        self.db.read().await.clone()
    }

    async fn persist(&self, db: &Database) -> Result<(), CoreError> {
        if let Some(p) = &self.persistence {
            let bytes = StorageManager::save_to_bytes(db, &p.key)?;
            StorageManager::write_atomic(&p.path, &bytes).await?;
            debug!("Persisted snapshot ({} bytes) to {}", bytes.len(), p.path.display());
        }
        Ok(())
    }

    /// Apply `f` to a copy, persist the copy, then swap it in. A failed
    /// persist leaves the in-memory contents untouched.
    async fn write<F>(&self, f: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut Database) + Send,
    {
        let mut db = self.db.write().await;
        let mut next = db.clone();
        f(&mut next);
        self.persist(&next).await?;
        *db = next;
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("path", &self.persistence.as_ref().map(|p| &p.path))
            .finish_non_exhaustive()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn get_user(&self, uid: &str) -> Result<Option<User>, CoreError> {
        Ok(self.db.read().await.users.get(uid).cloned())
    }

    async fn put_user(&self, user: User) -> Result<(), CoreError> {
        self.write(|db| {
            db.users.insert(user.uid.clone(), user);
        })
        .await
    }

    async fn get_portfolio(&self, user_id: &str) -> Result<Option<Portfolio>, CoreError> {
        Ok(self.db.read().await.portfolios.get(user_id).cloned())
    }

    async fn put_portfolio(&self, portfolio: Portfolio) -> Result<(), CoreError> {
        self.write(|db| {
            db.portfolios.insert(portfolio.user_id.clone(), portfolio);
        })
        .await
    }

    async fn get_transaction(&self, id: &str) -> Result<Option<Transaction>, CoreError> {
        Ok(self.db.read().await.transactions.get(id).cloned())
    }

    async fn put_transaction(&self, transaction: Transaction) -> Result<(), CoreError> {
        self.write(|db| {
            db.transactions.insert(transaction.id.clone(), transaction);
        })
        .await
    }

    async fn transactions_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>, CoreError> {
        Ok(self.db.read().await.transactions_for_user(user_id, limit))
    }
}

// ═══════════════════════════════════════════════════════════════════
// Storage Tests: snapshot format, encryption, encrypted MemoryStore
// ═══════════════════════════════════════════════════════════════════

use chrono::{Duration, Utc};
use std::collections::HashMap;

use whale_watch_core::errors::CoreError;
use whale_watch_core::models::portfolio::Portfolio;
use whale_watch_core::models::transaction::{AccountKind, Transaction, TransactionStatus};
use whale_watch_core::models::user::{LinkedWallet, User, WalletType};
use whale_watch_core::storage::encryption::{self, KdfParams, SnapshotKey};
use whale_watch_core::storage::format::{self, SnapshotHeader, HEADER_SIZE, MAGIC};
use whale_watch_core::storage::manager::StorageManager;
use whale_watch_core::storage::{Database, Datastore, MemoryStore};

const PASSWORD: &str = "correct horse battery staple";

fn fast() -> KdfParams {
    KdfParams::insecure_fast()
}

fn transaction(id: &str, user: &str, minutes_ago: i64) -> Transaction {
    Transaction {
        id: id.into(),
        user_id: user.into(),
        from: AccountKind::Alpaca,
        to: AccountKind::PhantomWallet,
        amount_usd: 100.0,
        status: TransactionStatus::Pending,
        tx_hash: None,
        initiated_at: Utc::now() - Duration::minutes(minutes_ago),
        completed_at: None,
    }
}

fn sample_database() -> Database {
    let mut user = User::new("u1", "u1@example.com");
    user.alpaca_linked = true;
    user.wallets.push(LinkedWallet {
        wallet_type: WalletType::Solana,
        address: "11111111111111111111111111111111".into(),
    });

    let mut portfolio = Portfolio::empty("u1");
    portfolio.defi_holdings = HashMap::from([("SOL".to_string(), 1.25)]);
    portfolio.defi_equity_usd = 165.7;
    portfolio.total_equity_usd = 165.7;

    let mut done = transaction("t2", "u1", 5);
    done.status = TransactionStatus::Completed;
    done.tx_hash = Some("5abc".into());
    done.completed_at = Some(Utc::now());

    let mut db = Database::new();
    db.users.insert(user.uid.clone(), user);
    db.portfolios.insert("u1".into(), portfolio);
    db.transactions.insert("t1".into(), transaction("t1", "u1", 10));
    db.transactions.insert("t2".into(), done);
    db
}

// ═══════════════════════════════════════════════════════════════════
// Encryption primitives
// ═══════════════════════════════════════════════════════════════════

#[test]
fn derive_key_is_deterministic_per_salt() {
    let salt = [1u8; 16];
    let a = encryption::derive_key(PASSWORD, &salt, &fast()).unwrap();
    let b = encryption::derive_key(PASSWORD, &salt, &fast()).unwrap();
    let c = encryption::derive_key(PASSWORD, &[2u8; 16], &fast()).unwrap();
    assert_eq!(*a, *b);
    assert_ne!(*a, *c);
}

#[test]
fn encrypt_decrypt_and_tamper_detection() {
    let key = [9u8; 32];
    let nonce = encryption::generate_nonce().unwrap();
    let mut ct = encryption::encrypt(b"whale", &key, &nonce).unwrap();
    assert_eq!(ct.len(), 5 + 16);
    assert_eq!(encryption::decrypt(&ct, &key, &nonce).unwrap(), b"whale");

    ct[0] ^= 0xff;
    assert!(matches!(encryption::decrypt(&ct, &key, &nonce), Err(CoreError::Decryption)));
}

#[test]
fn snapshot_key_seals_with_fresh_nonces() {
    let key = SnapshotKey::generate(PASSWORD, fast()).unwrap();
    let (n1, c1) = key.seal(b"same").unwrap();
    let (n2, c2) = key.seal(b"same").unwrap();
    assert_ne!(n1, n2);
    assert_ne!(c1, c2);
    assert_eq!(key.open(&n1, &c1).unwrap(), b"same");

    let rederived = SnapshotKey::derive(PASSWORD, *key.salt(), *key.params()).unwrap();
    assert_eq!(rederived.open(&n2, &c2).unwrap(), b"same");
}

#[test]
fn snapshot_key_debug_hides_key_material() {
    let key = SnapshotKey::generate(PASSWORD, fast()).unwrap();
    let debug = format!("{key:?}");
    assert!(debug.contains("SnapshotKey"));
    assert!(!debug.contains("key: ["));
}

// ═══════════════════════════════════════════════════════════════════
// File format
// ═══════════════════════════════════════════════════════════════════

fn header(len: u64) -> SnapshotHeader {
    SnapshotHeader {
        version: format::CURRENT_VERSION,
        kdf_params: fast(),
        salt: [3u8; 16],
        nonce: [4u8; 12],
        ciphertext_len: len,
    }
}

#[test]
fn header_layout() {
    let bytes = format::encode(&header(3), b"xyz");
    assert_eq!(bytes.len(), HEADER_SIZE + 3);
    assert_eq!(&bytes[..4], MAGIC);
    assert_eq!(&bytes[4..6], &1u16.to_le_bytes());
    assert_eq!(&bytes[6..10], &8u32.to_le_bytes());

    let (decoded, body) = format::decode(&bytes).unwrap();
    assert_eq!(decoded, header(3));
    assert_eq!(body, b"xyz");
}

#[test]
fn decode_rejects_bad_magic_and_short_input() {
    let mut bytes = format::encode(&header(1), b"x");
    bytes[0] = b'X';
    assert!(matches!(format::decode(&bytes), Err(CoreError::InvalidFileFormat(_))));
    assert!(matches!(format::decode(b"WWDB"), Err(CoreError::InvalidFileFormat(_))));
}

#[test]
fn decode_rejects_future_version() {
    let mut h = header(1);
    h.version = format::CURRENT_VERSION + 1;
    let bytes = format::encode(&h, b"x");
    assert!(matches!(format::decode(&bytes), Err(CoreError::UnsupportedVersion(2))));
}

#[test]
fn decode_rejects_hostile_kdf_costs() {
    let mut h = header(1);
    h.kdf_params.memory_cost = u32::MAX;
    let bytes = format::encode(&h, b"x");
    assert!(matches!(format::decode(&bytes), Err(CoreError::InvalidFileFormat(_))));
}

#[test]
fn decode_rejects_truncated_ciphertext() {
    let mut bytes = format::encode(&header(10), b"0123456789");
    bytes.truncate(bytes.len() - 4);
    assert!(matches!(format::decode(&bytes), Err(CoreError::InvalidFileFormat(_))));
}

// ═══════════════════════════════════════════════════════════════════
// StorageManager
// ═══════════════════════════════════════════════════════════════════

#[test]
fn database_survives_save_and_load() {
    let db = sample_database();
    let bytes = StorageManager::save_with_password(&db, PASSWORD, fast()).unwrap();
    let (loaded, key) = StorageManager::load_from_bytes(&bytes, PASSWORD).unwrap();
    assert_eq!(loaded, db);
    assert_eq!(*key.params(), fast());
}

#[test]
fn wrong_password_fails_to_decrypt() {
    let bytes = StorageManager::save_with_password(&sample_database(), PASSWORD, fast()).unwrap();
    let err = StorageManager::load_from_bytes(&bytes, "hunter2").unwrap_err();
    assert!(matches!(err, CoreError::Decryption));
}

#[test]
fn snapshot_does_not_leak_plaintext() {
    let bytes = StorageManager::save_with_password(&sample_database(), PASSWORD, fast()).unwrap();
    let needle = b"u1@example.com";
    assert!(!bytes.windows(needle.len()).any(|w| w == needle));
}

#[test]
fn database_orders_user_transactions_newest_first() {
    let db = sample_database();
    let list = db.transactions_for_user("u1", 10);
    let ids: Vec<&str> = list.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t2", "t1"]);
    assert_eq!(db.transactions_for_user("u1", 1).len(), 1);
    assert!(db.transactions_for_user("u2", 10).is_empty());
}

// ═══════════════════════════════════════════════════════════════════
// MemoryStore
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn volatile_store_round_trips_documents() {
    let store = MemoryStore::new();
    assert!(!store.is_persistent());
    assert!(store.get_user("u1").await.unwrap().is_none());

    let user = User::new("u1", "u1@example.com");
    store.put_user(user.clone()).await.unwrap();
    assert_eq!(store.get_user("u1").await.unwrap(), Some(user));

    let mut replaced = User::new("u1", "new@example.com");
    replaced.plaid_linked = true;
    store.put_user(replaced.clone()).await.unwrap();
    assert_eq!(store.get_user("u1").await.unwrap(), Some(replaced));
    assert_eq!(store.snapshot().await.users.len(), 1);
}

#[tokio::test]
async fn encrypted_store_persists_every_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whale.wwdb");

    {
        let store = MemoryStore::open_encrypted_with(&path, PASSWORD, fast()).await.unwrap();
        assert!(store.is_persistent());
        assert!(path.exists());
        store.put_user(User::new("u1", "u1@example.com")).await.unwrap();
        store.put_transaction(transaction("t1", "u1", 0)).await.unwrap();
        store.put_portfolio(Portfolio::empty("u1")).await.unwrap();
    }

    let reopened = MemoryStore::open_encrypted(&path, PASSWORD).await.unwrap();
    assert_eq!(reopened.get_user("u1").await.unwrap().unwrap().email, "u1@example.com");
    assert!(reopened.get_transaction("t1").await.unwrap().is_some());
    assert!(reopened.get_portfolio("u1").await.unwrap().is_some());
    assert_eq!(reopened.transactions_for_user("u1", 10).await.unwrap().len(), 1);
    assert!(!dir.path().join("whale.tmp").exists());
}

#[tokio::test]
async fn encrypted_store_rejects_wrong_password() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whale.wwdb");
    MemoryStore::open_encrypted_with(&path, PASSWORD, fast()).await.unwrap();

    let err = MemoryStore::open_encrypted(&path, "wrong").await.unwrap_err();
    assert!(matches!(err, CoreError::Decryption));
}

#[tokio::test]
async fn encrypted_store_rejects_foreign_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    tokio::fs::write(&path, vec![b'a'; 100]).await.unwrap();

    let err = MemoryStore::open_encrypted(&path, PASSWORD).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidFileFormat(_)));
}

#[tokio::test]
async fn failed_persist_leaves_memory_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    tokio::fs::create_dir(&data_dir).await.unwrap();
    let store = MemoryStore::open_encrypted_with(data_dir.join("whale.wwdb"), PASSWORD, fast())
        .await
        .unwrap();
    store.put_user(User::new("u0", "u0@example.com")).await.unwrap();

    tokio::fs::remove_dir_all(&data_dir).await.unwrap();

    let err = store.put_user(User::new("u1", "u1@example.com")).await.unwrap_err();
    assert!(matches!(err, CoreError::FileIO(_)), "{err:?}");
    assert_eq!(store.get_user("u1").await.unwrap(), None);
    assert!(store.get_user("u0").await.unwrap().is_some());
    assert_eq!(store.snapshot().await.users.len(), 1);
}

#[tokio::test]
async fn debug_output_hides_key_material() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whale.wwdb");
    let store = MemoryStore::open_encrypted_with(&path, PASSWORD, fast()).await.unwrap();

    let rendered = format!("{store:?}");
    assert!(rendered.contains("whale.wwdb"), "{rendered}");
    assert!(!rendered.contains("SnapshotKey"), "{rendered}");
    assert_eq!(format!("{:?}", MemoryStore::new()), "MemoryStore { path: None, .. }");
}

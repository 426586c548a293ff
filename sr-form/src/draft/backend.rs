//! Durable key/value backends for drafts
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`RedbDraftBackend`] | redb file (or redb in-memory) store |
//! | [`MemoryDraftBackend`] | plain map with write counting and fault injection |

use parking_lot::Mutex;
use redb::{Database, ReadableDatabase, TableDefinition};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;

/// Table for drafts: key = draft key, value = JSON-serialized draft
const DRAFTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("drafts");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Byte-level keyed storage the draft store writes through
pub trait DraftBackend: Send + Sync {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Draft storage backed by redb
#[derive(Clone)]
pub struct RedbDraftBackend {
    db: Arc<Database>,
}

impl RedbDraftBackend {
    /// Open or create the database at the given path
    ///
    /// Commits are durable once `commit()` returns, so a draft written
    /// before a crash is there on the next start.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::init(Database::create(path)?)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DRAFTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl DraftBackend for RedbDraftBackend {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DRAFTS_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DRAFTS_TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DRAFTS_TABLE)?;
            table.remove(key)?;
        }
        txn.commit()?;
        Ok(())
    }
}

/// In-memory draft storage
///
/// Counts writes and can be switched to fail every operation, which is how
/// tests simulate a full or disabled store.
#[derive(Debug, Default)]
pub struct MemoryDraftBackend {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryDraftBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent operation fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Store raw bytes under `key`, bypassing the write counter
    pub fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.entries.lock().insert(key.to_string(), value.into());
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("storage disabled".into()));
        }
        Ok(())
    }
}

impl DraftBackend for MemoryDraftBackend {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.check()?;
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.check()?;
        self.entries.lock().insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.entries.lock().remove(key);
        Ok(())
    }
}

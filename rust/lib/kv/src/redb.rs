use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use redb::{Database, ReadableTable, TableDefinition};

use crate::entry;
use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust embedded
/// key-value database. Expired entries are invisible to `get` and are removed
/// by `purge_expired`.
pub struct RedbStore {
    db: Arc<Database>,
}

fn storage<E: std::fmt::Display>(e: E) -> KVError {
    KVError::Storage(e.to_string())
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(|e| match e {
            redb::DatabaseError::DatabaseAlreadyOpen => KVError::Busy(path.display().to_string()),
            other => storage(other),
        })?;

        // Ensure the table exists by doing a write transaction.
        let write_txn = db.begin_write().map_err(storage)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Remove every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> Result<usize, KVError> {
        let now = entry::now_ms();
        let write_txn = self.db.begin_write().map_err(storage)?;
        let removed = {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            let mut expired = Vec::new();
            for item in table.iter().map_err(storage)? {
                let (key, value) = item.map_err(storage)?;
                let live = entry::decode(value.value())
                    .map(|(at, _)| entry::is_live(at, now))
                    .unwrap_or(false);
                if !live {
                    expired.push(key.value().to_string());
                }
            }
            for key in &expired {
                table.remove(key.as_str()).map_err(storage)?;
            }
            expired.len()
        };
        write_txn.commit().map_err(storage)?;
        if removed > 0 {
            tracing::debug!(removed, "purged expired cache entries");
        }
        Ok(removed)
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;

        let Some(raw) = table.get(key).map_err(storage)? else {
            return Ok(None);
        };
        let (expires_at, value) =
            entry::decode(raw.value()).ok_or_else(|| KVError::Corrupt(key.to_string()))?;
        if entry::is_live(expires_at, entry::now_ms()) {
            Ok(Some(value.to_vec()))
        } else {
            Ok(None)
        }
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), KVError> {
        let raw = entry::encode(value, entry::expires_at(entry::now_ms(), ttl));
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            table.insert(key, raw.as_slice()).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, KVError> {
        let now = entry::now_ms();
        let write_txn = self.db.begin_write().map_err(storage)?;
        let removed = {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            let old = table.remove(key).map_err(storage)?;
            old.and_then(|v| entry::decode(v.value()).map(|(at, _)| entry::is_live(at, now)))
                .unwrap_or(false)
        };
        write_txn.commit().map_err(storage)?;
        Ok(removed)
    }
}

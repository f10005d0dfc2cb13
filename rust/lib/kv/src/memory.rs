use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::entry;
use crate::error::KVError;
use crate::traits::KVStore;

/// In-process KVStore for tests and single-process setups.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (Vec<u8>, i64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not expired.
    pub fn len(&self) -> usize {
        let now = entry::now_ms();
        self.lock()
            .map(|m| m.values().filter(|(_, at)| entry::is_live(*at, now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, (Vec<u8>, i64)>>, KVError> {
        self.entries
            .lock()
            .map_err(|_| KVError::Storage("memory store lock poisoned".into()))
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let mut map = self.lock()?;
        match map.get(key) {
            Some((value, at)) if entry::is_live(*at, entry::now_ms()) => Ok(Some(value.clone())),
            Some(_) => {
                map.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), KVError> {
        let at = entry::expires_at(entry::now_ms(), ttl);
        self.lock()?.insert(key.to_string(), (value.to_vec(), at));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, KVError> {
        let now = entry::now_ms();
        Ok(self
            .lock()?
            .remove(key)
            .map(|(_, at)| entry::is_live(at, now))
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_ops() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("a", b"1", Duration::ZERO).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.len(), 1);
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn ttl_expiry() {
        let store = MemoryStore::new();
        store.set("gone", b"x", Duration::from_millis(10)).unwrap();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(store.get("gone").unwrap(), None);
        assert!(store.is_empty());
    }
}

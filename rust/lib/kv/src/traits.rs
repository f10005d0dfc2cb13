use std::time::Duration;

use crate::error::KVError;

/// KVStore is a key-value cache with optional per-key expiry.
///
/// A `ttl` of `Duration::ZERO` stores the value with no expiry. Any other
/// ttl is applied as given; the store never substitutes its own policy.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist or
    /// has expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any previous value and expiry.
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), KVError>;

    /// Delete a key. Returns true if a live value was removed.
    fn delete(&self, key: &str) -> Result<bool, KVError>;
}

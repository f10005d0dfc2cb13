//! Background purge of expired session cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use ecomm_kv::RedbStore;

/// Periodically drop expired sessions until `cancel` fires.
///
/// Reads already hide expired entries, so this only reclaims space.
pub fn start(cache: Arc<RedbStore>, interval: Duration, cancel: CancellationToken) {
    tokio::spawn(async move {
        info!("session sweeper started (interval={interval:?})");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("session sweeper stopped");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    debug!("session sweeper scan");
                    let cache = Arc::clone(&cache);
                    match tokio::task::spawn_blocking(move || cache.purge_expired()).await {
                        Ok(Ok(0)) => {}
                        Ok(Ok(n)) => info!("session sweeper: purged {n} expired sessions"),
                        Ok(Err(e)) => error!("session sweeper error: {e}"),
                        Err(e) => error!("session sweeper task failed: {e}"),
                    }
                }
            }
        }
    });
}

/// Sweep roughly ten times per ttl, between one second and one hour.
pub fn interval_for(ttl: Duration) -> Duration {
    (ttl / 10).clamp(Duration::from_secs(1), Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecomm_kv::KVStore;

    #[test]
    fn interval_bounds() {
        assert_eq!(interval_for(Duration::from_secs(5)), Duration::from_secs(1));
        assert_eq!(interval_for(Duration::from_secs(600)), Duration::from_secs(60));
        assert_eq!(interval_for(Duration::from_secs(86400 * 7)), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn sweeps_until_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(RedbStore::open(&dir.path().join("cache.redb")).unwrap());
        cache.set("old", b"x", Duration::from_millis(5)).unwrap();
        cache.set("keep", b"y", Duration::ZERO).unwrap();

        let cancel = CancellationToken::new();
        start(Arc::clone(&cache), Duration::from_millis(20), cancel.clone());
        tokio::time::sleep(Duration::from_millis(120)).await;
        cancel.cancel();

        assert_eq!(cache.purge_expired().unwrap(), 0);
        assert_eq!(cache.get("keep").unwrap(), Some(b"y".to_vec()));
    }
}

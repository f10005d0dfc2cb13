use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration shared by the server and its modules.
///
/// The binary fills this from its TOML file and CLI flags, then passes it
/// to storage initialization and request handling.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Root directory for on-disk stores.
    pub data_dir: Option<PathBuf>,

    /// Path to the SQLite database holding users and permissions.
    /// Defaults to `{data_dir}/data.sqlite` if not specified.
    pub sqlite_path: Option<PathBuf>,

    /// Path to the redb file backing the session cache.
    /// Defaults to `{data_dir}/cache.redb` if not specified.
    pub cache_path: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,

    /// Per-request deadline in milliseconds. Zero disables the deadline.
    pub request_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            sqlite_path: None,
            cache_path: None,
            listen: "0.0.0.0:8080".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl ServiceConfig {
    /// Resolve the SQLite database path, falling back to `{data_dir}/data.sqlite`.
    pub fn resolve_sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.sqlite"))
    }

    /// Resolve the session cache path, falling back to `{data_dir}/cache.redb`.
    pub fn resolve_cache_path(&self) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("cache.redb"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_sqlite_path(),
            PathBuf::from("/data/data.sqlite")
        );
        assert_eq!(config.resolve_cache_path(), PathBuf::from("/data/cache.redb"));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_explicit_paths_win() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            cache_path: Some(PathBuf::from("/fast/sessions.redb")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_cache_path(),
            PathBuf::from("/fast/sessions.redb")
        );
        assert_eq!(
            config.resolve_sqlite_path(),
            PathBuf::from("/data/data.sqlite")
        );
    }

    #[test]
    fn test_no_data_dir() {
        let config = ServiceConfig::default();
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("data.sqlite"));
    }
}

//! Server configuration file (`/etc/ecomm/<context>.toml`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use auth::service::{AuthConfig, CookieConfig};

/// Directory holding named server contexts.
pub const CONTEXT_DIR: &str = "/etc/ecomm";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for `data.sqlite` and `cache.redb`.
    pub data_dir: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cache ttl for new sessions in seconds. 0 keeps them until logout.
    #[serde(default)]
    pub ttl_secs: u64,
}

fn default_cookie_name() -> String {
    "sessionId".to_string()
}

fn default_cookie_max_age() -> u64 {
    86400
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSection {
    #[serde(default = "default_cookie_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_cookie_max_age")]
    pub max_age_secs: u64,
}

impl Default for CookieSection {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            domain: String::new(),
            secure: false,
            max_age_secs: default_cookie_max_age(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Deadline for each request in milliseconds. 0 disables it.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// A permission granted to the seeded admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionSeed {
    pub id: i64,
    pub name: String,
}

/// Optional account created or refreshed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub username: String,
    /// bcrypt or argon2 hash; plain passwords are never stored here.
    pub password_hash: String,
    #[serde(default)]
    pub permissions: Vec<PermissionSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub cookie: CookieSection,
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminConfig>,
}

impl ServerConfig {
    /// A bare context name maps to `/etc/ecomm/<name>.toml`; anything with a
    /// `/` or `.` is used as a path.
    pub fn resolve_path(context: &str) -> PathBuf {
        if context.contains('/') || context.contains('.') {
            PathBuf::from(context)
        } else {
            Path::new(CONTEXT_DIR).join(format!("{}.toml", context))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            session_ttl: Duration::from_secs(self.session.ttl_secs),
            cookie: CookieConfig {
                name: self.cookie.name.clone(),
                domain: Some(self.cookie.domain.clone()).filter(|d| !d.is_empty()),
                secure: self.cookie.secure,
                max_age: Duration::from_secs(self.cookie.max_age_secs),
            },
            request_timeout: self.request_timeout(),
        }
    }
}

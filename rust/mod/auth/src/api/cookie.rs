//! Session cookie transport.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

use crate::service::CookieConfig;

/// Value of the named cookie in the request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

fn attributes(cfg: &CookieConfig, max_age_secs: u64) -> String {
    let mut attrs = format!("Path=/; Max-Age={}; HttpOnly; SameSite=Strict", max_age_secs);
    if cfg.secure {
        attrs.push_str("; Secure");
    }
    if let Some(domain) = cfg.domain.as_deref().filter(|d| !d.is_empty()) {
        attrs.push_str("; Domain=");
        attrs.push_str(domain);
    }
    attrs
}

/// `Set-Cookie` value carrying a fresh session id.
pub fn session_cookie(
    cfg: &CookieConfig,
    session_id: &str,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; {}",
        cfg.name,
        session_id,
        attributes(cfg, cfg.max_age.as_secs())
    ))
}

/// `Set-Cookie` value that expires the session cookie.
pub fn expired_cookie(
    cfg: &CookieConfig,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!("{}=; {}", cfg.name, attributes(cfg, 0)))
}

//! On-disk entry layout: an 8-byte big-endian expiry (unix millis, 0 = never)
//! followed by the raw value.

use std::time::Duration;

const HEADER_LEN: usize = 8;

/// Expiry timestamp for a ttl, relative to `now_ms`. Zero ttl means never.
pub fn expires_at(now_ms: i64, ttl: Duration) -> i64 {
    if ttl.is_zero() {
        0
    } else {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_add(ttl_ms.max(1))
    }
}

pub fn is_live(expires_at: i64, now_ms: i64) -> bool {
    expires_at == 0 || now_ms < expires_at
}

pub fn encode(value: &[u8], expires_at: i64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + value.len());
    buf.extend_from_slice(&expires_at.to_be_bytes());
    buf.extend_from_slice(value);
    buf
}

/// Split a stored entry into `(expires_at, value)`. None if truncated.
pub fn decode(raw: &[u8]) -> Option<(i64, &[u8])> {
    if raw.len() < HEADER_LEN {
        return None;
    }
    let (header, value) = raw.split_at(HEADER_LEN);
    let mut bytes = [0u8; HEADER_LEN];
    bytes.copy_from_slice(header);
    Some((i64::from_be_bytes(bytes), value))
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

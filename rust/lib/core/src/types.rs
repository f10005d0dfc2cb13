/// Generate a new random id (UUIDv4, hyphenated, 36 chars).
///
/// Used for request ids and session ids. 122 random bits, so collisions
/// are not a practical concern.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current time as unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id() {
        let id = new_id();
        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_ne!(id, new_id());
    }

    #[test]
    fn test_now_millis() {
        let a = now_millis();
        let b = now_millis();
        assert!(a > 1_600_000_000_000);
        assert!(b >= a);
    }
}

//! Identifier Substitution - Session-id-shaped metadata rewriting
//!
//! Metadata values that look like session identifiers are replaced with our
//! own session's primary id on every forwarded call, not only on blocks, so
//! the values a server correlates on are ours rather than the host's.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;

static UUID_SHAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .ok()
});

static TOKEN_SHAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{16,}$").ok());

/// Whether a metadata value has a recognizable session-identifier shape:
/// a UUID, or an alphanumeric/hyphen/underscore token of length >= 16.
pub fn looks_like_session_identifier(value: &str) -> bool {
    let matches = |re: &Option<Regex>| re.as_ref().map(|r| r.is_match(value)).unwrap_or(false);
    matches(&UUID_SHAPE) || matches(&TOKEN_SHAPE)
}

/// Replace every identifier-shaped metadata value with `replacement`.
/// Returns the number of substitutions made.
pub fn substitute_identifiers(
    metadata: &mut HashMap<String, String>,
    replacement: &str,
) -> usize {
    let mut substituted = 0;
    for (key, value) in metadata.iter_mut() {
        if value != replacement && looks_like_session_identifier(value) {
            trace!(key, "substituting identifier-shaped metadata value");
            *value = replacement.to_string();
            substituted += 1;
        }
    }
    substituted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_shape() {
        assert!(looks_like_session_identifier(
            "550e8400-e29b-41d4-a716-446655440000"
        ));
        assert!(!looks_like_session_identifier(
            "550e8400-e29b-41d4-a716"
        ));
    }

    #[test]
    fn test_token_shape() {
        assert!(looks_like_session_identifier("abc123_DEF-456xyz9"));
        assert!(!looks_like_session_identifier("short-token"));
        assert!(!looks_like_session_identifier("has spaces in it 12345678"));
        assert!(!looks_like_session_identifier("token!with#symbols$123"));
    }

    #[test]
    fn test_substitution() {
        let mut metadata = HashMap::new();
        metadata.insert(
            "x-session-id".to_string(),
            "550e8400-e29b-41d4-a716-446655440000".to_string(),
        );
        metadata.insert(
            "x-api-token".to_string(),
            "a_very_long_opaque_token_0001".to_string(),
        );
        metadata.insert("accept".to_string(), "application/json".to_string());

        let n = substitute_identifiers(&mut metadata, "replacement-id");
        assert_eq!(n, 2);
        assert_eq!(
            metadata.get("x-session-id").map(String::as_str),
            Some("replacement-id")
        );
        assert_eq!(
            metadata.get("accept").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let mut metadata = HashMap::new();
        metadata.insert(
            "x-session-id".to_string(),
            "550e8400-e29b-41d4-a716-446655440000".to_string(),
        );

        substitute_identifiers(&mut metadata, "replacement-id");
        let n = substitute_identifiers(&mut metadata, "replacement-id");
        assert_eq!(n, 0);
    }
}

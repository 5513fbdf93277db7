//! Route exclusion rules.
//!
//! An exclusion pattern ending in `*` excludes every path that starts with
//! the pattern minus its wildcard. Patterns without a wildcard only exclude
//! a path whose slash-normalized form equals the pattern exactly as written,
//! so `/api/v1/status` (no trailing slash) never matches anything while
//! `/api/v1/status/` matches both `/api/v1/status` and `/api/v1/status/`.

pub const WILDCARD: char = '*';

/// Decide whether `path` needs authentication given the exclusion patterns.
///
/// An empty path or an empty exclusion list always requires authentication.
pub fn require_auth<S: AsRef<str>>(path: &str, excluded_paths: &[S]) -> bool {
    if path.is_empty() || excluded_paths.is_empty() {
        return true;
    }

    let normalized = normalize(path);

    let wildcard_hit = excluded_paths.iter().any(|pattern| {
        pattern
            .as_ref()
            .strip_suffix(WILDCARD)
            .map(|prefix| prefix.trim_end_matches(WILDCARD))
            .is_some_and(|prefix| normalized.starts_with(prefix))
    });
    if wildcard_hit {
        return false;
    }

    !excluded_paths
        .iter()
        .any(|pattern| pattern.as_ref() == normalized)
}

/// Strip trailing slashes then append exactly one.
pub fn normalize(path: &str) -> String {
    let mut normalized = path.trim_end_matches('/').to_string();
    normalized.push('/');
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EXCLUDED: [&str; 2] = ["/api/v1/status/", "/api/v1/stat*"];

    #[test]
    fn test_fail_safe_defaults() {
        assert!(require_auth("", &EXCLUDED));
        assert!(require_auth::<&str>("/api/v1/users", &[]));
        assert!(require_auth::<&str>("", &[]));
    }

    #[test]
    fn test_exact_exclusion_with_or_without_trailing_slash() {
        let excluded = ["/api/v1/status/"];
        assert!(!require_auth("/api/v1/status", &excluded));
        assert!(!require_auth("/api/v1/status/", &excluded));
        assert!(!require_auth("/api/v1/status///", &excluded));
        assert!(require_auth("/api/v1/users", &excluded));
    }

    #[test]
    fn test_exact_match_compares_against_pattern_as_written() {
        // Normalized paths always end in '/', so a slashless pattern never matches.
        let excluded = ["/api/v1/status"];
        assert!(require_auth("/api/v1/status", &excluded));
        assert!(require_auth("/api/v1/status/", &excluded));
    }

    #[test]
    fn test_non_wildcard_patterns_do_not_prefix_match() {
        let excluded = ["/api/v1/status/"];
        assert!(require_auth("/api/v1/status/details", &excluded));
    }

    #[test]
    fn test_wildcard_exclusion() {
        let excluded = ["/api/v1/stat*"];
        assert!(!require_auth("/api/v1/stat/anything/", &excluded));
        assert!(!require_auth("/api/v1/stat/", &excluded));
        assert!(!require_auth("/api/v1/stats", &excluded));
        assert!(!require_auth("/api/v1/status", &excluded));
        assert!(require_auth("/api/v1/users", &excluded));
    }

    #[test]
    fn test_repeated_wildcards_are_stripped() {
        assert!(!require_auth("/api/v1/stats", &["/api/v1/st**"]));
    }

    #[test]
    fn test_root_path() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
        assert!(!require_auth("/", &["/"]));
    }

    proptest! {
        #[test]
        fn prop_empty_inputs_require_auth(path in "[a-z/]{0,20}", excluded in prop::collection::vec("[a-z/*]{0,12}", 0..4)) {
            prop_assert!(require_auth("", &excluded));
            prop_assert!(require_auth::<String>(&path, &[]));
        }

        #[test]
        fn prop_wildcard_prefix_is_excluded(suffix in "[a-z0-9/]{0,20}") {
            let path = format!("/api/v1/stat{suffix}");
            prop_assert!(!require_auth(&path, &["/api/v1/stat*"]));
        }

        #[test]
        fn prop_normalize_ends_with_single_slash(path in "[a-z/]{0,20}") {
            let normalized = normalize(&path);
            prop_assert!(normalized.ends_with('/'));
            prop_assert!(!normalized.ends_with("//"));
        }
    }
}

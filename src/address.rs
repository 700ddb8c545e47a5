//! Canonical address extraction from free-form mail headers.

/// Extract a canonical lowercase email address from a raw header value
/// such as `"Jane Doe <jane@example.com>"` or a bare address.
///
/// A bracketed `<...>` substring wins; otherwise the whole trimmed value
/// is used. Malformed input degrades to `None` rather than erroring, so
/// a bad header never fails a batch.
pub fn normalize_address(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }

    let inner = match value.find('<') {
        Some(lt) => match value[lt + 1..].find('>') {
            Some(rel) => value[lt + 1..lt + 1 + rel].trim(),
            None => value,
        },
        None => value,
    };

    if inner.is_empty() {
        return None;
    }
    Some(inner.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracketed_address() {
        assert_eq!(
            normalize_address(Some("Jane Doe <Jane@Example.com>")),
            Some("jane@example.com".to_string())
        );
    }

    #[test]
    fn test_bare_address() {
        assert_eq!(
            normalize_address(Some("SALES@vestas.dk")),
            Some("sales@vestas.dk".to_string())
        );
    }

    #[test]
    fn test_quoted_display_name() {
        assert_eq!(
            normalize_address(Some("\"Jensen, Mette\" <mj@vestas.dk>")),
            Some("mj@vestas.dk".to_string())
        );
    }

    #[test]
    fn test_absent_input() {
        assert_eq!(normalize_address(None), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_address(Some("")), None);
        assert_eq!(normalize_address(Some("   ")), None);
    }

    #[test]
    fn test_empty_brackets() {
        assert_eq!(normalize_address(Some("Jane <>")), None);
    }

    #[test]
    fn test_unclosed_bracket_falls_back_to_whole_value() {
        // No closing '>' — degrade to the whole value rather than failing.
        assert_eq!(
            normalize_address(Some("Jane <jane@example.com")),
            Some("jane <jane@example.com".to_string())
        );
    }

    #[test]
    fn test_only_first_bracket_pair_is_used() {
        assert_eq!(
            normalize_address(Some("A <a@x.com> B <b@y.com>")),
            Some("a@x.com".to_string())
        );
    }
}

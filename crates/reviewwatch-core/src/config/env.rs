#[must_use]
pub(super) fn read_raw_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[must_use]
pub(super) fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[must_use]
pub(super) fn parse_u64_at_least(raw: Option<String>, min_value: u64) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value >= min_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_and_drops_blank_values() {
        assert_eq!(non_empty(Some("  abc ".to_string())).as_deref(), Some("abc"));
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn parse_u64_at_least_rejects_garbage_and_small_values() {
        assert_eq!(parse_u64_at_least(Some(" 250 ".to_string()), 1), Some(250));
        assert_eq!(parse_u64_at_least(Some("0".to_string()), 1), None);
        assert_eq!(parse_u64_at_least(Some("-3".to_string()), 1), None);
        assert_eq!(parse_u64_at_least(None, 1), None);
    }
}

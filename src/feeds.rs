//! Stop / line identifier to realtime feed routing.

use anyhow::{Result, anyhow};

use crate::config::FeedConfig;

/// Lines whose feed key differs from the line character itself.
///
/// | Line prefix | Feed key | Service                   |
/// |-------------|----------|---------------------------|
/// | `S`         | `SIR`    | Staten Island Railway     |
/// | `9`         | `S`      | 42 St shuttle             |
pub const LINE_FEED_KEYS: &[(&str, &str)] = &[("S", "SIR"), ("9", "S")];

/// Returns the line prefix of a stop id or line identifier (its first character).
pub fn line_prefix(id: &str) -> Option<&str> {
    let end = id.chars().next()?.len_utf8();
    Some(&id[..end])
}

/// Resolves the feed key serving `id`.
///
/// Looks the line prefix up in [`LINE_FEED_KEYS`]; lines without an entry
/// use the prefix itself as their key.
pub fn feed_key(id: &str) -> Option<&str> {
    let line = line_prefix(id)?;
    let key = LINE_FEED_KEYS
        .iter()
        .find(|(prefix, _)| *prefix == line)
        .map(|(_, key)| *key)
        .unwrap_or(line);
    Some(key)
}

/// Resolves the full feed URL serving `id` (a stop id such as `"R36"` or a
/// line identifier such as `"N"`).
///
/// # Errors
///
/// Fails when `id` is empty or no URL is configured for its feed key.
pub fn feed_url(config: &FeedConfig, id: &str) -> Result<String> {
    let key = feed_key(id).ok_or_else(|| anyhow!("empty stop or line identifier"))?;
    config
        .url(key)
        .ok_or_else(|| anyhow!("no feed configured for line '{key}' (from '{id}')"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FeedConfig {
        FeedConfig::from_json(
            r#"{
                "base": "https://feeds.example/gtfs",
                "suffixes": { "6": "", "R": "-nqrw", "SIR": "-si", "S": "" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_feed_key_plain_line() {
        assert_eq!(feed_key("R36"), Some("R"));
        assert_eq!(feed_key("631"), Some("6"));
    }

    #[test]
    fn test_feed_key_remaps() {
        assert_eq!(feed_key("S09"), Some("SIR"));
        assert_eq!(feed_key("901"), Some("S"));
    }

    #[test]
    fn test_feed_key_empty() {
        assert_eq!(feed_key(""), None);
    }

    #[test]
    fn test_feed_url_resolves() {
        let config = config();
        assert_eq!(
            feed_url(&config, "R36").unwrap(),
            "https://feeds.example/gtfs-nqrw"
        );
        assert_eq!(
            feed_url(&config, "S31").unwrap(),
            "https://feeds.example/gtfs-si"
        );
    }

    #[test]
    fn test_feed_url_unknown_line() {
        let err = feed_url(&config(), "L08").unwrap_err();
        assert!(err.to_string().contains("'L'"));
    }
}

//! Feed endpoint configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Maps feed keys to realtime endpoint URLs.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "base": "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs",
///   "suffixes": { "1": "", "A": "-ace", "N": "-nqrw", "SIR": "-si" }
/// }
/// ```
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    base: String,
    suffixes: HashMap<String, String>,
}

impl FeedConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read feed config '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid feed config '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Returns the full endpoint URL for `feed_key`, if one is configured.
    pub fn url(&self, feed_key: &str) -> Option<String> {
        self.suffixes
            .get(feed_key)
            .map(|suffix| format!("{}{}", self.base, suffix))
    }

    /// Iterates over all `(feed_key, url)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, String)> {
        self.suffixes
            .iter()
            .map(|(k, suffix)| (k.as_str(), format!("{}{}", self.base, suffix)))
    }
}

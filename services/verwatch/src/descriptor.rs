//! Version descriptor wire format

use serde::{Deserialize, Deserializer};
use std::time::{SystemTime, UNIX_EPOCH};

/// Deployed version descriptor, e.g. `{"version": "1.0.3"}`.
///
/// The version token is opaque: a JSON string is taken as-is and a bare
/// number is normalized to its decimal string form. Any other fields in
/// the body are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionDescriptor {
    #[serde(deserialize_with = "version_token")]
    pub version: String,
}

fn version_token<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Token {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Token::deserialize(deserializer)? {
        Token::Text(s) => s,
        Token::Number(n) => n.to_string(),
    })
}

impl VersionDescriptor {
    /// Parse a descriptor from a response body
    pub fn parse(body: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Append the cache-defeating query parameter so intermediate caches can
/// never serve a stale descriptor.
pub fn cache_busted_url(base: &str, epoch_ms: u64) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", base, separator, epoch_ms)
}

pub fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

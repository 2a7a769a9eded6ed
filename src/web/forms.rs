//! Urlencoded request data and path parameter parsing.

use super::WebError;
use serde::Deserialize;
use std::str::FromStr;

/// Urlencoded pairs in submission order, keeping repeated keys.
///
/// Works with both `Form` and `Query`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub(crate) struct FormData(Vec<(String, String)>);

impl FormData {
    /// Last value submitted for `key`.
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Value for `key`, or an empty string.
    pub(crate) fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_owned()
    }

    /// Every value submitted for `key`.
    pub(crate) fn all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
            .collect()
    }
}

/// Parses an identifier taken from the path. Malformed ids are not found.
pub(crate) fn parse_id<T: FromStr>(raw: &str) -> Result<T, WebError> {
    T::from_str(raw).map_err(|_| WebError::malformed_id(raw))
}

/// Accepts a post-login target only when it stays on this site.
pub(crate) fn local_target(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|target| {
        target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
    })
}

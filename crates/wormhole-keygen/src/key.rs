use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// An opaque, globally unique token minted by the Key Generation Service.
///
/// A `Key` is handed out to exactly one caller and never reused. Its alphabet
/// and length are defined by the authority that minted it; validating the
/// format is left to whoever consumes the key (for example a short-link alias
/// validator).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the underlying string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<Key> for String {
    fn from(value: Key) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_raw_token() {
        let key = Key::from("aB3xZ9");
        assert_eq!(key.to_string(), "aB3xZ9");
        assert_eq!(key.as_str(), "aB3xZ9");
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = Key::new("k3y");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"k3y\"");

        let back: Key = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn into_inner_returns_owned_string() {
        let key = Key::new(String::from("owned"));
        let raw: String = key.into();
        assert_eq!(raw, "owned");
    }
}

// Copyright 2025 Cowboy AI, LLC.

//! Identifiers for domain objects
//!
//! An identifier is a `(namespace, key)` pair. Its key-string form is the
//! bare key when the namespace is empty and `namespace:key` otherwise, with
//! `:` and `\` escaped inside either part.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a domain object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier {
    namespace: String,
    key: String,
}

impl Identifier {
    /// Create an identifier from its parts
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Create an identifier with no namespace
    pub fn local(key: impl Into<String>) -> Self {
        Self::new("", key)
    }

    /// Create an identifier with a random key in the given namespace
    pub fn generate(namespace: impl Into<String>) -> Self {
        Self::new(namespace, Uuid::new_v4().to_string())
    }

    /// Parse a key string, splitting on the first unescaped `:`
    pub fn parse(keystring: &str) -> Self {
        let mut namespace = String::new();
        let mut current = String::new();
        let mut split = false;
        let mut chars = keystring.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                ':' if !split => {
                    namespace = std::mem::take(&mut current);
                    split = true;
                }
                _ => current.push(c),
            }
        }

        Self {
            namespace,
            key: current,
        }
    }

    /// Namespace part (empty for local identifiers)
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key part
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key-string form
    pub fn keystring(&self) -> String {
        self.to_string()
    }

    /// Namespace, or `default` when this identifier has none
    pub fn space_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.namespace.is_empty() {
            default
        } else {
            &self.namespace
        }
    }
}

fn escape(part: &str) -> String {
    part.replace('\\', "\\\\").replace(':', "\\:")
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", escape(&self.key))
        } else {
            write!(f, "{}:{}", escape(&self.namespace), escape(&self.key))
        }
    }
}

impl FromStr for Identifier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Identifier::parse(s))
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.keystring())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Identifier::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("abc", "", "abc" ; "bare key")]
    #[test_case("mct:abc", "mct", "abc" ; "namespaced")]
    #[test_case("mct:a:b", "mct", "a:b" ; "only first colon splits")]
    #[test_case("a\\:b", "", "a:b" ; "escaped colon")]
    fn test_parse(input: &str, namespace: &str, key: &str) {
        let id = Identifier::parse(input);
        assert_eq!(id.namespace(), namespace);
        assert_eq!(id.key(), key);
    }

    #[test]
    fn test_keystring_roundtrips_escapes() {
        let id = Identifier::new("my:space", "key\\with:stuff");
        assert_eq!(Identifier::parse(&id.keystring()), id);
    }

    #[test]
    fn test_space_or_default() {
        assert_eq!(Identifier::local("x").space_or("mct"), "mct");
        assert_eq!(Identifier::new("other", "x").space_or("mct"), "other");
    }

    #[test]
    fn test_generate_is_unique() {
        let a = Identifier::generate("mct");
        let b = Identifier::generate("mct");
        assert_ne!(a, b);
        assert_eq!(a.namespace(), "mct");
    }

    #[test]
    fn test_serde_uses_keystring() {
        let id = Identifier::new("mct", "root");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"mct:root\"");
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

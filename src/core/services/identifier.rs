// Copyright 2025 Cowboy AI, LLC.

//! Identifier generation and parsing (`identifierService`)

use crate::identifiers::Identifier;

/// Generates and parses identifiers relative to a default space
#[derive(Debug, Clone)]
pub struct IdentifierService {
    default_space: String,
}

impl IdentifierService {
    /// Service whose generated identifiers default to `default_space`
    pub fn new(default_space: impl Into<String>) -> Self {
        Self {
            default_space: default_space.into(),
        }
    }

    /// Default persistence space
    pub fn default_space(&self) -> &str {
        &self.default_space
    }

    /// New identifier in `space`, or in the default space
    pub fn generate(&self, space: Option<&str>) -> Identifier {
        Identifier::generate(space.unwrap_or(&self.default_space))
    }

    /// Parse a key string
    pub fn parse(&self, keystring: &str) -> Identifier {
        Identifier::parse(keystring)
    }

    /// Space an identifier persists to
    pub fn space_of(&self, identifier: &Identifier) -> String {
        identifier.space_or(&self.default_space).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_identifiers_use_space() {
        let service = IdentifierService::new("mct");
        let local = service.generate(None);
        let remote = service.generate(Some("lab"));

        assert_eq!(local.namespace(), "mct");
        assert_eq!(remote.namespace(), "lab");
        assert_ne!(service.generate(None), local);
        assert_eq!(service.space_of(&service.parse("abc")), "mct");
        assert_eq!(service.space_of(&service.parse("lab:abc")), "lab");
    }
}

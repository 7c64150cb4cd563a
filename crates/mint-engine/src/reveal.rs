// mint-engine/src/reveal.rs

use crate::ledger::TokenId;
use serde::{Deserialize, Serialize};

/// Pause and reveal flags. Independent of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gates {
    paused: bool,
    revealed: bool,
}

impl Gates {
    pub fn new(paused: bool) -> Self {
        Self {
            paused,
            revealed: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn set_revealed(&mut self, revealed: bool) {
        self.revealed = revealed;
    }
}

/// Metadata location strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataUris {
    #[serde(default)]
    pub base_uri: String,
    #[serde(default)]
    pub not_revealed_uri: String,
    #[serde(default = "default_extension")]
    pub base_extension: String,
}

fn default_extension() -> String {
    ".json".into()
}

impl Default for MetadataUris {
    fn default() -> Self {
        Self {
            base_uri: String::new(),
            not_revealed_uri: String::new(),
            base_extension: default_extension(),
        }
    }
}

impl MetadataUris {
    /// Resolve the URI of an existing token.
    ///
    /// Unrevealed collections share one placeholder. An empty base URI
    /// yields an empty string even after reveal.
    pub fn resolve(&self, revealed: bool, token_id: TokenId) -> String {
        if !revealed {
            return self.not_revealed_uri.clone();
        }
        if self.base_uri.is_empty() {
            return String::new();
        }
        format!("{}{}{}", self.base_uri, token_id, self.base_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uris() -> MetadataUris {
        MetadataUris {
            base_uri: "https://y/".into(),
            not_revealed_uri: "https://x/".into(),
            base_extension: ".json".into(),
        }
    }

    #[test]
    fn test_unrevealed_ignores_token_id() {
        let uris = uris();
        assert_eq!(uris.resolve(false, 1), "https://x/");
        assert_eq!(uris.resolve(false, 9999), "https://x/");
    }

    #[test]
    fn test_revealed_concatenates() {
        assert_eq!(uris().resolve(true, 5), "https://y/5.json");
    }

    #[test]
    fn test_empty_base_uri_overrides() {
        let mut uris = uris();
        uris.base_uri.clear();
        assert_eq!(uris.resolve(true, 5), "");
    }

    #[test]
    fn test_gates_are_independent() {
        let mut gates = Gates::new(true);
        assert!(gates.is_paused());
        assert!(!gates.is_revealed());

        gates.set_revealed(true);
        assert!(gates.is_paused());

        gates.set_paused(false);
        assert!(gates.is_revealed());
    }
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Host languages
//!
//! Languages whose source files may carry embedded SQL fragments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported host languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostLanguage {
    /// TypeScript and plain JavaScript
    TypeScript,
    /// TypeScript / JavaScript with JSX
    Tsx,
    /// Rust
    Rust,
}

impl HostLanguage {
    /// Get all supported host languages
    pub fn all() -> &'static [HostLanguage] {
        &[HostLanguage::TypeScript, HostLanguage::Tsx, HostLanguage::Rust]
    }

    /// Get the host language name as string
    pub fn name(&self) -> &'static str {
        match self {
            HostLanguage::TypeScript => "typescript",
            HostLanguage::Tsx => "tsx",
            HostLanguage::Rust => "rust",
        }
    }

    /// Resolve a host language from an editor language identifier
    pub fn from_language_id(language_id: &str) -> Option<HostLanguage> {
        match language_id.to_lowercase().as_str() {
            "typescript" | "javascript" | "ts" | "js" => Some(HostLanguage::TypeScript),
            "typescriptreact" | "javascriptreact" | "tsx" | "jsx" => Some(HostLanguage::Tsx),
            "rust" | "rs" => Some(HostLanguage::Rust),
            _ => None,
        }
    }

    /// Resolve a host language from a file extension (without the dot)
    pub fn from_extension(extension: &str) -> Option<HostLanguage> {
        match extension {
            "ts" | "mts" | "cts" | "js" | "mjs" | "cjs" => Some(HostLanguage::TypeScript),
            "tsx" | "jsx" => Some(HostLanguage::Tsx),
            "rs" => Some(HostLanguage::Rust),
            _ => None,
        }
    }

    /// Whether this is one of the ECMAScript family grammars
    pub fn is_ecmascript(&self) -> bool {
        matches!(self, HostLanguage::TypeScript | HostLanguage::Tsx)
    }

    /// Whether `"…"` / `'…'` literals may span several physical lines
    ///
    /// ECMAScript quoted strings cannot hold a raw newline, Rust strings can.
    pub fn quoted_literals_allow_newlines(&self) -> bool {
        match self {
            HostLanguage::TypeScript | HostLanguage::Tsx => false,
            HostLanguage::Rust => true,
        }
    }

    /// Whether the language has macro invocation syntax (`name!(…)`)
    pub fn has_macros(&self) -> bool {
        matches!(self, HostLanguage::Rust)
    }

    /// Whether the language has tagged template literals (`` tag`…` ``)
    pub fn has_tagged_templates(&self) -> bool {
        self.is_ecmascript()
    }
}

impl fmt::Display for HostLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_language_id() {
        assert_eq!(
            HostLanguage::from_language_id("typescript"),
            Some(HostLanguage::TypeScript)
        );
        assert_eq!(
            HostLanguage::from_language_id("javascriptreact"),
            Some(HostLanguage::Tsx)
        );
        assert_eq!(HostLanguage::from_language_id("Rust"), Some(HostLanguage::Rust));
        assert_eq!(HostLanguage::from_language_id("python"), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(HostLanguage::from_extension("mts"), Some(HostLanguage::TypeScript));
        assert_eq!(HostLanguage::from_extension("tsx"), Some(HostLanguage::Tsx));
        assert_eq!(HostLanguage::from_extension("rs"), Some(HostLanguage::Rust));
        assert_eq!(HostLanguage::from_extension("sql"), None);
    }

    #[test]
    fn test_capabilities() {
        assert!(HostLanguage::Rust.has_macros());
        assert!(!HostLanguage::Rust.has_tagged_templates());
        assert!(HostLanguage::Tsx.has_tagged_templates());
        assert!(!HostLanguage::TypeScript.quoted_literals_allow_newlines());
        assert!(HostLanguage::Rust.quoted_literals_allow_newlines());
    }
}

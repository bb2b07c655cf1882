// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Extraction rules
//!
//! An [`ExtractionRule`] describes one call shape that carries SQL text:
//!
//! - `` prisma.$queryRaw`SELECT 1` ``: tagged template
//! - `entityManager.query("SELECT 1", [])`: string / template argument
//! - `sqlx::query!("SELECT 1")`: macro argument
//!
//! Rules for one host language are validated together into a [`RuleSet`]
//! before the extractor sees them.
//!
//! ## Argument positions
//!
//! Observed configurations disagree on whether argument numbers start at 0 or
//! 1, so every [`ArgumentPosition`] carries its [`IndexBase`] explicitly and is
//! normalised with [`ArgumentPosition::zero_based`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::host::HostLanguage;

/// Syntactic shape a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LiteralKind {
    /// `` tag`…` `` with no `${}` substitutions
    TaggedTemplate,
    /// `f(…)` / `obj.f(…)` / `f!(…)` whose selected argument is a literal
    StringOrTemplateArgument,
}

/// Numbering base of an argument position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBase {
    /// First argument is 0
    Zero,
    /// First argument is 1
    #[default]
    One,
}

/// Argument index together with the base it is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgumentPosition {
    /// Index as written in configuration
    pub index: u32,
    /// Base `index` is counted from
    pub base: IndexBase,
}

impl ArgumentPosition {
    /// Zero-based position
    pub fn zero(index: u32) -> Self {
        Self {
            index,
            base: IndexBase::Zero,
        }
    }

    /// One-based position
    pub fn one(index: u32) -> Self {
        Self {
            index,
            base: IndexBase::One,
        }
    }

    /// Normalised zero-based index, `None` when invalid for the base
    pub fn zero_based(&self) -> Option<usize> {
        match self.base {
            IndexBase::Zero => Some(self.index as usize),
            IndexBase::One => (self.index as usize).checked_sub(1),
        }
    }
}

/// One configured call shape carrying SQL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRule {
    /// Identifier or member name to match
    pub function_name: String,

    /// Argument holding the SQL text (ignored for tagged templates)
    pub argument_position: ArgumentPosition,

    /// Shape to match
    pub literal_kind: LiteralKind,

    /// Match `name!(…)` macro invocations instead of calls
    pub is_macro_like: bool,
}

impl ExtractionRule {
    /// Rule matching `` name`…` `` and `` obj.name`…` ``
    pub fn tagged_template(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            argument_position: ArgumentPosition::zero(0),
            literal_kind: LiteralKind::TaggedTemplate,
            is_macro_like: false,
        }
    }

    /// Rule matching a literal argument of `name(…)` / `obj.name(…)`
    pub fn call_argument(function_name: impl Into<String>, position: ArgumentPosition) -> Self {
        Self {
            function_name: function_name.into(),
            argument_position: position,
            literal_kind: LiteralKind::StringOrTemplateArgument,
            is_macro_like: false,
        }
    }

    /// Rule matching a literal argument of `name!(…)`
    pub fn macro_argument(function_name: impl Into<String>, position: ArgumentPosition) -> Self {
        Self {
            function_name: function_name.into(),
            argument_position: position,
            literal_kind: LiteralKind::StringOrTemplateArgument,
            is_macro_like: true,
        }
    }

    /// Validate the rule for a host language
    pub fn validate(&self, host: HostLanguage) -> Result<(), RuleError> {
        if self.function_name.trim().is_empty() {
            return Err(RuleError::EmptyFunctionName);
        }

        match self.literal_kind {
            LiteralKind::TaggedTemplate => {
                if !host.has_tagged_templates() {
                    return Err(RuleError::UnsupportedShape {
                        host,
                        function_name: self.function_name.clone(),
                        shape: "tagged template",
                    });
                }
                if self.is_macro_like {
                    return Err(RuleError::UnsupportedShape {
                        host,
                        function_name: self.function_name.clone(),
                        shape: "macro tagged template",
                    });
                }
            }
            LiteralKind::StringOrTemplateArgument => {
                if self.is_macro_like && !host.has_macros() {
                    return Err(RuleError::UnsupportedShape {
                        host,
                        function_name: self.function_name.clone(),
                        shape: "macro invocation",
                    });
                }
                if self.argument_position.zero_based().is_none() {
                    return Err(RuleError::InvalidArgumentPosition {
                        function_name: self.function_name.clone(),
                        position: self.argument_position,
                    });
                }
            }
        }

        Ok(())
    }

    /// Key under which two rules would select the same literal
    fn shape_key(&self) -> (&str, LiteralKind, bool, Option<usize>) {
        let position = match self.literal_kind {
            LiteralKind::TaggedTemplate => None,
            LiteralKind::StringOrTemplateArgument => self.argument_position.zero_based(),
        };
        (
            self.function_name.as_str(),
            self.literal_kind,
            self.is_macro_like,
            position,
        )
    }
}

/// Validated, ordered rules for one host language
///
/// Order matters: when two rules select the same literal, the earlier one
/// produces the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    host: HostLanguage,
    rules: Vec<ExtractionRule>,
}

impl RuleSet {
    /// Validate `rules` for `host`
    ///
    /// Rejects malformed rules and rules that duplicate an earlier one.
    pub fn new(host: HostLanguage, rules: Vec<ExtractionRule>) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            rule.validate(host)?;
            if !seen.insert(rule.shape_key()) {
                return Err(RuleError::DuplicateRule {
                    function_name: rule.function_name.clone(),
                });
            }
        }
        Ok(Self { host, rules })
    }

    /// Built-in rules for a host language
    ///
    /// - TypeScript / TSX: Prisma's `` $queryRaw`…` ``
    /// - Rust: sqlx's `query!("…", …)` and `query_as!(Type, "…", …)`
    pub fn builtin(host: HostLanguage) -> Self {
        let rules = match host {
            HostLanguage::TypeScript | HostLanguage::Tsx => {
                vec![ExtractionRule::tagged_template("$queryRaw")]
            }
            HostLanguage::Rust => vec![
                ExtractionRule::macro_argument("query", ArgumentPosition::one(1)),
                ExtractionRule::macro_argument("query_as", ArgumentPosition::one(2)),
            ],
        };
        Self { host, rules }
    }

    /// Built-in rules followed by `custom`
    pub fn with_custom(host: HostLanguage, custom: Vec<ExtractionRule>) -> Result<Self, RuleError> {
        let mut rules = Self::builtin(host).rules;
        rules.extend(custom);
        Self::new(host, rules)
    }

    /// Host language the rules were validated for
    pub fn host(&self) -> HostLanguage {
        self.host
    }

    /// Rules in priority order
    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Rule validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Rule without a function name
    #[error("Extraction rule has an empty function name")]
    EmptyFunctionName,

    /// Argument position not representable in its base (e.g. 0 when one-based)
    #[error("Invalid argument position {position:?} for '{function_name}'")]
    InvalidArgumentPosition {
        function_name: String,
        position: ArgumentPosition,
    },

    /// Shape the host language has no syntax for
    #[error("{host} has no {shape} syntax (rule '{function_name}')")]
    UnsupportedShape {
        host: HostLanguage,
        function_name: String,
        shape: &'static str,
    },

    /// Rule selecting the same literal as an earlier rule
    #[error("Duplicate extraction rule for '{function_name}'")]
    DuplicateRule { function_name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_position_zero_based() {
        assert_eq!(ArgumentPosition::zero(0).zero_based(), Some(0));
        assert_eq!(ArgumentPosition::zero(2).zero_based(), Some(2));
        assert_eq!(ArgumentPosition::one(1).zero_based(), Some(0));
        assert_eq!(ArgumentPosition::one(3).zero_based(), Some(2));
        assert_eq!(ArgumentPosition::one(0).zero_based(), None);
    }

    #[test]
    fn test_validate_rejects_one_based_zero() {
        let rule = ExtractionRule::call_argument("query", ArgumentPosition::one(0));
        assert!(matches!(
            rule.validate(HostLanguage::TypeScript),
            Err(RuleError::InvalidArgumentPosition { .. })
        ));
    }

    #[test]
    fn test_validate_tagged_template_ignores_position() {
        let mut rule = ExtractionRule::tagged_template("sql");
        rule.argument_position = ArgumentPosition::one(0);
        assert!(rule.validate(HostLanguage::TypeScript).is_ok());
    }

    #[test]
    fn test_validate_rejects_shapes_missing_from_host() {
        let template = ExtractionRule::tagged_template("sql");
        assert!(matches!(
            template.validate(HostLanguage::Rust),
            Err(RuleError::UnsupportedShape { .. })
        ));

        let mac = ExtractionRule::macro_argument("query", ArgumentPosition::one(1));
        assert!(matches!(
            mac.validate(HostLanguage::TypeScript),
            Err(RuleError::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let rule = ExtractionRule::tagged_template("  ");
        assert_eq!(
            rule.validate(HostLanguage::TypeScript),
            Err(RuleError::EmptyFunctionName)
        );
    }

    #[test]
    fn test_rule_set_rejects_duplicates_across_bases() {
        let result = RuleSet::new(
            HostLanguage::TypeScript,
            vec![
                ExtractionRule::call_argument("query", ArgumentPosition::zero(1)),
                ExtractionRule::call_argument("query", ArgumentPosition::one(2)),
            ],
        );
        assert!(matches!(result, Err(RuleError::DuplicateRule { .. })));
    }

    #[test]
    fn test_rule_set_allows_distinct_shapes_for_same_name() {
        let result = RuleSet::new(
            HostLanguage::TypeScript,
            vec![
                ExtractionRule::tagged_template("sql"),
                ExtractionRule::call_argument("sql", ArgumentPosition::zero(0)),
            ],
        );
        assert_eq!(result.map(|set| set.rules().len()), Ok(2));
    }

    #[test]
    fn test_builtin_rules() {
        let ts = RuleSet::builtin(HostLanguage::TypeScript);
        assert_eq!(ts.rules()[0].function_name, "$queryRaw");
        assert_eq!(ts.rules()[0].literal_kind, LiteralKind::TaggedTemplate);

        let rs = RuleSet::builtin(HostLanguage::Rust);
        assert_eq!(rs.rules().len(), 2);
        assert!(rs.rules().iter().all(|rule| rule.is_macro_like));
        assert_eq!(rs.rules()[1].argument_position.zero_based(), Some(1));
    }

    #[test]
    fn test_with_custom_appends_after_builtin() {
        let set = RuleSet::with_custom(
            HostLanguage::TypeScript,
            vec![ExtractionRule::tagged_template("sql")],
        )
        .unwrap();

        let names: Vec<_> = set.rules().iter().map(|r| r.function_name.as_str()).collect();
        assert_eq!(names, vec!["$queryRaw", "sql"]);
    }

    #[test]
    fn test_with_custom_rejects_builtin_duplicate() {
        let result = RuleSet::with_custom(
            HostLanguage::TypeScript,
            vec![ExtractionRule::tagged_template("$queryRaw")],
        );
        assert!(matches!(result, Err(RuleError::DuplicateRule { .. })));
    }
}

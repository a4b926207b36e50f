use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ReconError;
use crate::model::CanonicalField;
use crate::normalize::{normalize_header, DEFAULT_TIMESTAMP_FORMATS};

/// Header tables shipped with the engine, kept in sync with the live form.
pub const BUILTIN_TOML: &str = include_str!("builtin_headers.toml");

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    pub name: String,
    /// Exact-match table: one entry per historical question wording.
    #[serde(default)]
    pub headers: Vec<KnownHeader>,
    /// Heuristic fallbacks, highest priority first.
    #[serde(default)]
    pub rules: Vec<HeaderRule>,
    #[serde(default)]
    pub timestamps: TimestampConfig,
}

// ---------------------------------------------------------------------------
// Header tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnownHeader {
    pub text: String,
    pub field: CanonicalField,
}

/// Matches when the normalized header contains every term of at least one
/// `any` alternative, or equals one of `equals`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderRule {
    pub field: CanonicalField,
    #[serde(default)]
    pub any: Vec<Vec<String>>,
    #[serde(default)]
    pub equals: Vec<String>,
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimestampConfig {
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
        }
    }
}

fn default_formats() -> Vec<String> {
    DEFAULT_TIMESTAMP_FORMATS.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The embedded tables for the current form.
    pub fn builtin() -> Result<Self, ReconError> {
        Self::from_toml(BUILTIN_TOML)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        // Two wordings that normalize alike must agree on the field
        let mut seen: HashMap<String, CanonicalField> = HashMap::new();
        for (i, header) in self.headers.iter().enumerate() {
            let norm = normalize_header(&header.text);
            if norm.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "headers[{i}]: text is empty after normalization"
                )));
            }
            if let Some(prev) = seen.insert(norm.clone(), header.field) {
                if prev != header.field {
                    return Err(ReconError::ConfigValidation(format!(
                        "headers[{i}]: '{norm}' maps to both '{prev}' and '{}'",
                        header.field
                    )));
                }
            }
        }

        for (i, rule) in self.rules.iter().enumerate() {
            if rule.any.is_empty() && rule.equals.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "rules[{i}] ({}): needs at least one 'any' alternative or 'equals' value",
                    rule.field
                )));
            }
            for (j, alt) in rule.any.iter().enumerate() {
                if alt.is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "rules[{i}] ({}): alternative {j} has no terms",
                        rule.field
                    )));
                }
                if alt.iter().any(|t| normalize_header(t).is_empty()) {
                    return Err(ReconError::ConfigValidation(format!(
                        "rules[{i}] ({}): alternative {j} has an empty term",
                        rule.field
                    )));
                }
            }
            if rule.equals.iter().any(|t| normalize_header(t).is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "rules[{i}] ({}): empty 'equals' value",
                    rule.field
                )));
            }
        }

        if self.timestamps.formats.is_empty() {
            return Err(ReconError::ConfigValidation(
                "timestamps.formats must list at least one format".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

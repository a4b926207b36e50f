//! Column header → canonical field resolution.
//!
//! Exact wordings are looked up first; misses fall through to the ordered
//! heuristic rules. Both tables come from [`ReconConfig`], so tests and
//! deployments can inject their own.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::ReconConfig;
use crate::model::CanonicalField;
use crate::normalize::normalize_header;

/// How a header was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum Resolution {
    Exact { field: CanonicalField },
    /// `rule` is the 0-based index into the configured rule list.
    Heuristic { field: CanonicalField, rule: usize },
    Unrecognized,
}

impl Resolution {
    pub fn field(&self) -> Option<CanonicalField> {
        match self {
            Self::Exact { field } | Self::Heuristic { field, .. } => Some(*field),
            Self::Unrecognized => None,
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    field: CanonicalField,
    any: Vec<Vec<String>>,
    equals: Vec<String>,
}

impl CompiledRule {
    fn matches(&self, header: &str) -> bool {
        self.equals.iter().any(|e| e == header)
            || self
                .any
                .iter()
                .any(|alt| alt.iter().all(|term| header.contains(term.as_str())))
    }
}

#[derive(Debug, Clone)]
pub struct HeaderNormalizer {
    exact: HashMap<String, CanonicalField>,
    rules: Vec<CompiledRule>,
}

impl HeaderNormalizer {
    /// Pre-normalizes every wording and rule term in `config`.
    pub fn from_config(config: &ReconConfig) -> Self {
        let exact = config
            .headers
            .iter()
            .map(|h| (normalize_header(&h.text), h.field))
            .collect();

        let rules = config
            .rules
            .iter()
            .map(|r| CompiledRule {
                field: r.field,
                any: r
                    .any
                    .iter()
                    .map(|alt| alt.iter().map(|t| normalize_header(t)).collect())
                    .collect(),
                equals: r.equals.iter().map(|e| normalize_header(e)).collect(),
            })
            .collect();

        Self { exact, rules }
    }

    pub fn resolve(&self, raw_header: &str) -> Option<CanonicalField> {
        self.resolve_detailed(raw_header).field()
    }

    pub fn resolve_detailed(&self, raw_header: &str) -> Resolution {
        let header = normalize_header(raw_header);
        if let Some(field) = self.exact.get(&header) {
            return Resolution::Exact { field: *field };
        }
        self.rules
            .iter()
            .position(|rule| rule.matches(&header))
            .map(|rule| Resolution::Heuristic {
                field: self.rules[rule].field,
                rule,
            })
            .unwrap_or(Resolution::Unrecognized)
    }
}

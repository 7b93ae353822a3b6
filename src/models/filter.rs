use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Facet;

/// Structured, multi-facet query derived from free text.
///
/// Maps each constrained facet to the terms it may match. A facet that is not
/// present places no constraint on results. An empty filter object means the
/// query's intent could not be determined; retrieval treats it as "match
/// nothing", never as "match everything".
///
/// Terms are trimmed on insertion and blank terms are dropped. A facet whose
/// term list ends up empty is not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterObject {
    facets: BTreeMap<Facet, Vec<String>>,
}

impl FilterObject {
    /// Creates an empty filter object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this filter with `terms` added under `facet`.
    #[must_use]
    pub fn with<I, S>(mut self, facet: Facet, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(facet, terms);
        self
    }

    /// Adds terms under `facet`, skipping blanks and duplicates.
    pub fn insert<I, S>(&mut self, facet: Facet, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = self.facets.remove(&facet).unwrap_or_default();
        for term in terms {
            let term = term.as_ref().trim();
            if !term.is_empty() && !cleaned.iter().any(|existing| existing == term) {
                cleaned.push(term.to_string());
            }
        }
        if !cleaned.is_empty() {
            self.facets.insert(facet, cleaned);
        }
    }

    /// Returns the terms for `facet`, or `None` if the facet is unconstrained.
    pub fn terms(&self, facet: Facet) -> Option<&[String]> {
        self.facets.get(&facet).map(Vec::as_slice)
    }

    /// Iterates over constrained facets and their terms in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Facet, &[String])> {
        self.facets
            .iter()
            .map(|(facet, terms)| (*facet, terms.as_slice()))
    }

    /// Returns true if no facet is constrained.
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Returns the number of constrained facets.
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Builds a filter object from a loosely-typed JSON value.
    ///
    /// Unknown keys are ignored. A facet value may be an array of strings or a
    /// single string; non-string array items are skipped. Anything other than a
    /// JSON object yields an empty filter.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut filter = Self::new();
        let Some(obj) = value.as_object() else {
            return filter;
        };

        for (key, value) in obj {
            let Some(facet) = Facet::parse(key) else {
                tracing::debug!(key = %key, "ignoring unrecognized filter key");
                continue;
            };

            match value {
                serde_json::Value::String(term) => filter.insert(facet, [term]),
                serde_json::Value::Array(items) => {
                    filter.insert(facet, items.iter().filter_map(|item| item.as_str()));
                }
                _ => {}
            }
        }

        filter
    }
}

impl std::fmt::Display for FilterObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }
        let parts: Vec<String> = self
            .iter()
            .map(|(facet, terms)| format!("{}: {}", facet, terms.join(" | ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

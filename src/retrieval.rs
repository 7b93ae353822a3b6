//! Deterministic filtering of the contact directory.
//!
//! Facets combine conjunctively (a row must satisfy every constrained facet)
//! and the terms inside a facet combine disjunctively (any one term may match).
//! Each term is matched as a literal, case-insensitive substring.

use regex::{Regex, RegexBuilder};

use crate::models::{ContactRecord, Facet, FilterObject, ResultSet};

/// Case-insensitive "contains any of these terms" matcher.
///
/// Terms are escaped before being joined, so characters such as `+`, `(` or
/// `|` inside a term are matched literally.
#[derive(Debug, Clone)]
pub struct TermPattern {
    regex: Regex,
}

impl TermPattern {
    /// Builds a pattern from `terms`.
    ///
    /// Returns `None` if no term is non-blank, or if the combined pattern is
    /// too large to compile.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Option<Self> {
        let alternatives: Vec<String> = terms
            .iter()
            .map(|term| term.as_ref().trim())
            .filter(|term| !term.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return None;
        }

        match RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
        {
            Ok(regex) => Some(Self { regex }),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build term pattern");
                None
            }
        }
    }

    /// Returns true if `text` contains any of the terms.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Returns true if `value` is present and contains any of the terms.
    ///
    /// Absent values never match.
    pub fn matches_field(&self, value: Option<&str>) -> bool {
        value.is_some_and(|text| self.is_match(text))
    }
}

/// Returns the column a non-`names` facet is matched against.
fn facet_column(contact: &ContactRecord, facet: Facet) -> Option<&str> {
    match facet {
        Facet::Domains => contact.domains.as_deref(),
        Facet::Communities => contact.communities_served.as_deref(),
        Facet::Campus => contact.campus.as_deref(),
        Facet::Capabilities => contact.capabilities.as_deref(),
        Facet::Names => None,
    }
}

/// Builds the text the `names` facet searches: name, notes and affiliation.
///
/// Absent fields contribute empty strings.
fn name_search_text(contact: &ContactRecord) -> String {
    [
        contact.name.as_deref(),
        contact.notes.as_deref(),
        contact.program_affiliation.as_deref(),
    ]
    .map(|field| field.unwrap_or(""))
    .join(" ")
}

/// Applies `filter` to `dataset`, returning the matching rows in dataset order.
///
/// An empty filter returns an empty result set: a query with no extractable
/// intent must not broaden to the whole directory. If any facet's pattern
/// cannot be built, that facet matches nothing.
pub fn retrieve(filter: &FilterObject, dataset: &[ContactRecord]) -> ResultSet {
    if filter.is_empty() {
        tracing::debug!("empty filter, returning no matches");
        return ResultSet::empty();
    }

    let mut matches: Vec<&ContactRecord> = dataset.iter().collect();

    for (facet, terms) in filter.iter().filter(|(facet, _)| *facet != Facet::Names) {
        let Some(pattern) = TermPattern::new(terms) else {
            return ResultSet::empty();
        };
        matches.retain(|contact| pattern.matches_field(facet_column(contact, facet)));
        tracing::debug!(facet = %facet, remaining = matches.len(), "applied facet");
    }

    if let Some(terms) = filter.terms(Facet::Names) {
        let Some(pattern) = TermPattern::new(terms) else {
            return ResultSet::empty();
        };
        matches.retain(|contact| pattern.is_match(&name_search_text(contact)));
        tracing::debug!(facet = "names", remaining = matches.len(), "applied facet");
    }

    tracing::info!(matches = matches.len(), total = dataset.len(), "retrieval complete");
    ResultSet::from(matches.into_iter().cloned().collect::<Vec<_>>())
}

//! Manual faceted browsing of the directory.
//!
//! Unlike interpreted search, browsing is driven by explicit selections, so
//! an empty selection shows the whole directory.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{ContactRecord, ResultSet};
use crate::retrieval::TermPattern;

/// Distinct values available for each browsable facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetValues {
    pub campuses: Vec<String>,
    pub domains: Vec<String>,
    pub roles: Vec<String>,
}

impl FacetValues {
    /// Collects sorted, de-duplicated facet values from `dataset`.
    ///
    /// Domains are split on commas so each tag is listed once.
    pub fn collect(dataset: &[ContactRecord]) -> Self {
        let mut campuses = BTreeSet::new();
        let mut domains = BTreeSet::new();
        let mut roles = BTreeSet::new();

        for contact in dataset {
            if let Some(campus) = &contact.campus {
                campuses.insert(campus.clone());
            }
            if let Some(role) = &contact.role {
                roles.insert(role.clone());
            }
            domains.extend(contact.domain_tags().into_iter().map(String::from));
        }

        Self {
            campuses: campuses.into_iter().collect(),
            domains: domains.into_iter().collect(),
            roles: roles.into_iter().collect(),
        }
    }
}

/// Explicit facet selections for browsing.
///
/// Campus and role selections are exact matches; domain selections match as
/// case-insensitive substrings of the domains column. Selections on different
/// facets must all hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryFilter {
    pub campuses: Vec<String>,
    pub domains: Vec<String>,
    pub roles: Vec<String>,
}

impl DirectoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.campuses.is_empty() && self.domains.is_empty() && self.roles.is_empty()
    }

    /// Applies the selections to `dataset`, preserving dataset order.
    pub fn apply(&self, dataset: &[ContactRecord]) -> ResultSet {
        let domain_pattern = TermPattern::new(self.domains.as_slice());

        let matches: Vec<ContactRecord> = dataset
            .iter()
            .filter(|contact| selected(&self.campuses, contact.campus.as_deref()))
            .filter(|contact| selected(&self.roles, contact.role.as_deref()))
            .filter(|contact| match &domain_pattern {
                Some(pattern) => pattern.matches_field(contact.domains.as_deref()),
                None => true,
            })
            .cloned()
            .collect();

        ResultSet::from(matches)
    }
}

/// Exact membership test; an empty selection accepts everything.
fn selected(selection: &[String], value: Option<&str>) -> bool {
    if selection.is_empty() {
        return true;
    }
    value.is_some_and(|value| selection.iter().any(|choice| choice == value))
}

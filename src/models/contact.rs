use serde::{Deserialize, Deserializer, Serialize};

use super::ContactId;

/// Sentinel strings that spreadsheet exports leave behind for empty cells.
const ABSENT_SENTINELS: [&str; 4] = ["nan", "none", "null", "n/a"];

/// One row of the civic contact directory.
///
/// Every field except `id` is optional. Empty cells and spreadsheet sentinels
/// such as `"nan"` are stored as `None`, so matching code never has to
/// special-case them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Stable identifier assigned at ingestion.
    pub id: ContactId,
    /// Display name of the person or organization.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub name: Option<String>,
    /// Campus the contact is affiliated with.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub campus: Option<String>,
    /// Role or title.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub role: Option<String>,
    /// Program or organization affiliation.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub program_affiliation: Option<String>,
    /// Comma-separated civic focus tags.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub domains: Option<String>,
    /// Communities the contact serves.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub communities_served: Option<String>,
    /// Capabilities or expertise offered.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub capabilities: Option<String>,
    /// Stated needs or challenges.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub challenges: Option<String>,
    /// Free-form notes and insights.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub notes: Option<String>,
    /// Email, phone, or profile link.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub contact_info: Option<String>,
    /// Overview page URL.
    #[serde(default, deserialize_with = "deserialize_field")]
    pub url: Option<String>,
}

impl ContactRecord {
    /// Returns the individual domain tags, split on commas and trimmed.
    pub fn domain_tags(&self) -> Vec<&str> {
        self.domains
            .as_deref()
            .map(|domains| {
                domains
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the name, or `"Unknown"` when absent.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// Normalizes a raw cell value, mapping blanks and sentinels to `None`.
pub fn normalize_field(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    if ABSENT_SENTINELS
        .iter()
        .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
    {
        return None;
    }
    Some(trimmed.to_string())
}

/// Deserializes an optional text field through [`normalize_field`].
fn deserialize_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_field(value.as_deref()))
}

/// Builder for constructing `ContactRecord` instances.
///
/// All text setters run through [`normalize_field`].
///
/// # Examples
///
/// ```
/// use civic_discovery::ContactBuilder;
///
/// let contact = ContactBuilder::new(1)
///     .name("Liz Evans")
///     .campus("Hunter")
///     .domains("Public Health, Housing")
///     .notes("nan")
///     .build();
///
/// assert_eq!(contact.name.as_deref(), Some("Liz Evans"));
/// assert!(contact.notes.is_none());
/// ```
#[derive(Debug)]
pub struct ContactBuilder {
    record: ContactRecord,
}

impl ContactBuilder {
    /// Creates a builder for a contact with the given ID and no other fields.
    pub fn new(id: i64) -> Self {
        Self {
            record: ContactRecord {
                id: ContactId::new(id),
                name: None,
                campus: None,
                role: None,
                program_affiliation: None,
                domains: None,
                communities_served: None,
                capabilities: None,
                challenges: None,
                notes: None,
                contact_info: None,
                url: None,
            },
        }
    }

    pub fn name(mut self, value: &str) -> Self {
        self.record.name = normalize_field(Some(value));
        self
    }

    pub fn campus(mut self, value: &str) -> Self {
        self.record.campus = normalize_field(Some(value));
        self
    }

    pub fn role(mut self, value: &str) -> Self {
        self.record.role = normalize_field(Some(value));
        self
    }

    pub fn program_affiliation(mut self, value: &str) -> Self {
        self.record.program_affiliation = normalize_field(Some(value));
        self
    }

    pub fn domains(mut self, value: &str) -> Self {
        self.record.domains = normalize_field(Some(value));
        self
    }

    pub fn communities_served(mut self, value: &str) -> Self {
        self.record.communities_served = normalize_field(Some(value));
        self
    }

    pub fn capabilities(mut self, value: &str) -> Self {
        self.record.capabilities = normalize_field(Some(value));
        self
    }

    pub fn challenges(mut self, value: &str) -> Self {
        self.record.challenges = normalize_field(Some(value));
        self
    }

    pub fn notes(mut self, value: &str) -> Self {
        self.record.notes = normalize_field(Some(value));
        self
    }

    pub fn contact_info(mut self, value: &str) -> Self {
        self.record.contact_info = normalize_field(Some(value));
        self
    }

    pub fn url(mut self, value: &str) -> Self {
        self.record.url = normalize_field(Some(value));
        self
    }

    /// Builds the `ContactRecord`.
    pub fn build(self) -> ContactRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Facet, FilterObject};
    use crate::retrieval::retrieve;

    #[test]
    fn builder_leaves_unset_fields_absent() {
        let contact = ContactBuilder::new(3).name("Hostos CC").build();

        assert_eq!(contact.id, ContactId::new(3));
        assert_eq!(contact.name.as_deref(), Some("Hostos CC"));
        assert!(contact.campus.is_none());
        assert!(contact.domains.is_none());
    }

    #[test]
    fn sentinels_and_blanks_become_absent() {
        assert_eq!(normalize_field(Some("nan")), None);
        assert_eq!(normalize_field(Some("NaN")), None);
        assert_eq!(normalize_field(Some("  None ")), None);
        assert_eq!(normalize_field(Some("   ")), None);
        assert_eq!(normalize_field(None), None);
        assert_eq!(
            normalize_field(Some("  Bronx ")),
            Some("Bronx".to_string())
        );
    }

    #[test]
    fn sentinel_inside_longer_text_is_kept() {
        let contact = ContactBuilder::new(1).notes("Nanotech lab partner").build();
        assert_eq!(contact.notes.as_deref(), Some("Nanotech lab partner"));
    }

    #[test]
    fn domain_tags_split_and_trim() {
        let contact = ContactBuilder::new(1)
            .domains("Public Health, Housing ,, Environment")
            .build();

        assert_eq!(
            contact.domain_tags(),
            vec!["Public Health", "Housing", "Environment"]
        );
    }

    #[test]
    fn deserialized_sentinels_become_absent_and_never_match() {
        let contact: ContactRecord = serde_json::from_str(
            r#"{"id": 1, "name": " Ana Ruiz ", "campus": "nan", "notes": "N/A", "role": null}"#,
        )
        .unwrap();

        assert_eq!(contact.name.as_deref(), Some("Ana Ruiz"));
        assert!(contact.campus.is_none());
        assert!(contact.notes.is_none());
        assert!(contact.role.is_none());
        assert!(contact.url.is_none());

        let filter = FilterObject::new().with(Facet::Campus, ["an"]);
        assert!(retrieve(&filter, &[contact]).is_empty());
    }

    #[test]
    fn display_name_falls_back_to_unknown() {
        let contact = ContactBuilder::new(1).build();
        assert_eq!(contact.display_name(), "Unknown");
    }
}

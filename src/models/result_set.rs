use serde::Serialize;

use super::{ContactId, ContactRecord};

/// Ordered subset of the directory that satisfied a filter.
///
/// Created fresh per query and read-only afterwards. Records keep the order
/// they had in the source dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    contacts: Vec<ContactRecord>,
}

impl ResultSet {
    /// Creates an empty result set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the matching contacts.
    pub fn contacts(&self) -> &[ContactRecord] {
        &self.contacts
    }

    /// Returns the IDs of the matching contacts, in order.
    pub fn ids(&self) -> Vec<ContactId> {
        self.contacts.iter().map(|contact| contact.id).collect()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContactRecord> {
        self.contacts.iter()
    }

    /// Consumes the result set, returning the contacts.
    pub fn into_contacts(self) -> Vec<ContactRecord> {
        self.contacts
    }
}

impl From<Vec<ContactRecord>> for ResultSet {
    fn from(contacts: Vec<ContactRecord>) -> Self {
        Self { contacts }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ContactRecord;
    type IntoIter = std::slice::Iter<'a, ContactRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.contacts.iter()
    }
}

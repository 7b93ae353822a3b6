mod schema;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use rusqlite::types::ValueRef;

use crate::models::{ContactBuilder, ContactId, ContactRecord, normalize_field};

use schema::*;

/// Column name under which `load_contacts` selects the SQLite rowid.
const ROWID_ALIAS: &str = "__rowid";

/// SQLite-backed contact directory.
///
/// Supplies the dataset the discovery pipeline reads. Each call to
/// `load_contacts` returns an independent snapshot.
pub struct ContactStore {
    conn: Connection,
}

impl ContactStore {
    /// Opens an in-memory directory with an empty contacts table.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Opens a file-based directory database at the given path.
    ///
    /// Creates the database file and contacts table if they do not exist. An
    /// existing table is used as-is, whatever columns it has.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open directory database: {}", path.display()))?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(INITIAL_SCHEMA)
            .context("Failed to initialize contacts schema")?;
        Ok(())
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Loads every contact, ordered by rowid.
    ///
    /// Columns are mapped by header name, so tables exported with extra or
    /// missing columns still load; missing columns leave the field absent.
    /// The `id` column supplies the contact ID when present, otherwise the
    /// rowid is used. A present `id` column must hold a unique integer in
    /// every row; a NULL, non-integer or repeated id is an error. Non-text
    /// cells are rendered as text, and NULL, NaN and sentinel strings become
    /// absent.
    pub fn load_contacts(&self) -> Result<Vec<ContactRecord>> {
        let sql = format!(
            "SELECT rowid AS \"{ROWID_ALIAS}\", * FROM \"{CONTACTS_TABLE}\" ORDER BY rowid"
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("Failed to prepare contacts query")?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let has_id_column = columns
            .iter()
            .skip(1)
            .any(|column| column.trim().eq_ignore_ascii_case(COL_ID));

        let rows = stmt
            .query_map([], |row| {
                let rowid: i64 = row.get(0)?;
                let mut contact = ContactBuilder::new(rowid).build();
                let mut id_cell = None;

                for (index, column) in columns.iter().enumerate().skip(1) {
                    let value = row.get_ref(index)?;
                    if column.trim().eq_ignore_ascii_case(COL_ID) {
                        id_cell = cell_id(value);
                        continue;
                    }
                    assign_column(&mut contact, column, cell_text(value));
                }

                if let Some(id) = id_cell {
                    contact.id = ContactId::new(id);
                }
                Ok((rowid, id_cell.is_some(), contact))
            })
            .context("Failed to query contacts")?;

        let mut contacts = Vec::new();
        let mut seen = HashSet::new();
        for row in rows {
            let (rowid, has_id, contact) = row.context("Failed to read contact row")?;
            if has_id_column && !has_id {
                anyhow::bail!("Contact at row {rowid} has a missing or non-integer id");
            }
            if !seen.insert(contact.id) {
                anyhow::bail!("Duplicate contact id {} at row {rowid}", contact.id);
            }
            contacts.push(contact);
        }

        tracing::debug!(count = contacts.len(), "loaded contacts");
        Ok(contacts)
    }

    /// Inserts a contact under its own ID, for seeding directory fixtures.
    pub fn insert_contact(&self, contact: &ContactRecord) -> Result<ContactId> {
        self.conn
            .execute(
                r#"INSERT INTO "Network_Contacts" (
                    "id", "Contact Name", "Campus", "Role/Title", "Program/Org Affiliation",
                    "Civic Domains", "Communities Served", "Capabilities / Expertise",
                    "Needs / Challenges", "Notes / Insights", "Email/Phone/LinkedIn",
                    "URL (Overview Page)"
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
                rusqlite::params![
                    contact.id.get(),
                    contact.name,
                    contact.campus,
                    contact.role,
                    contact.program_affiliation,
                    contact.domains,
                    contact.communities_served,
                    contact.capabilities,
                    contact.challenges,
                    contact.notes,
                    contact.contact_info,
                    contact.url,
                ],
            )
            .with_context(|| format!("Failed to insert contact {}", contact.id))?;

        Ok(contact.id)
    }
}

/// Renders a cell as normalized text.
fn cell_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) if f.is_nan() => None,
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) => normalize_field(Some(&*String::from_utf8_lossy(bytes))),
    }
}

/// Reads an id cell. Integral reals and numeric text are accepted.
fn cell_id(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(id) => Some(id),
        ValueRef::Real(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).trim().parse().ok(),
        _ => None,
    }
}

fn assign_column(contact: &mut ContactRecord, column: &str, value: Option<String>) {
    let column = column.trim();
    let field = if column.eq_ignore_ascii_case(COL_NAME) {
        &mut contact.name
    } else if column.eq_ignore_ascii_case(COL_CAMPUS) {
        &mut contact.campus
    } else if column.eq_ignore_ascii_case(COL_ROLE) {
        &mut contact.role
    } else if column.eq_ignore_ascii_case(COL_AFFILIATION) {
        &mut contact.program_affiliation
    } else if column.eq_ignore_ascii_case(COL_DOMAINS) {
        &mut contact.domains
    } else if column.eq_ignore_ascii_case(COL_COMMUNITIES) {
        &mut contact.communities_served
    } else if column.eq_ignore_ascii_case(COL_CAPABILITIES) {
        &mut contact.capabilities
    } else if column.eq_ignore_ascii_case(COL_CHALLENGES) {
        &mut contact.challenges
    } else if column.eq_ignore_ascii_case(COL_NOTES) {
        &mut contact.notes
    } else if column.eq_ignore_ascii_case(COL_CONTACT_INFO) {
        &mut contact.contact_info
    } else if column.eq_ignore_ascii_case(COL_URL) {
        &mut contact.url
    } else {
        return;
    };
    *field = value;
}

use super::*;
use crate::models::ContactBuilder;
use tempfile::tempdir;

fn sample_contacts() -> Vec<ContactRecord> {
    vec![
        ContactBuilder::new(10)
            .name("Maria Lopez")
            .campus("Hunter")
            .role("Director")
            .program_affiliation("Health Equity Lab")
            .domains("Public Health, Housing")
            .communities_served("Latinx, Bronx")
            .capabilities("Research")
            .challenges("Needs bilingual volunteers")
            .notes("Partnered with Liz Evans in 2023")
            .contact_info("maria@example.edu")
            .url("https://example.edu/lab")
            .build(),
        ContactBuilder::new(20)
            .name("Green Futures")
            .campus("Queens")
            .domains("Environment")
            .build(),
    ]
}

#[test]
fn in_memory_opens_successfully() {
    let result = ContactStore::in_memory();
    assert!(result.is_ok());
}

#[test]
fn contacts_table_exists() {
    let store = ContactStore::in_memory().unwrap();

    let tables: Vec<String> = store
        .connection()
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .filter_map(|r| r.ok())
        .collect();

    assert!(tables.contains(&"Network_Contacts".to_string()));
}

#[test]
fn open_creates_database_file() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("directory.db");

    let result = ContactStore::open(&db_path);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn empty_directory_loads_no_contacts() {
    let store = ContactStore::in_memory().unwrap();
    assert!(store.load_contacts().unwrap().is_empty());
}

#[test]
fn inserted_contacts_load_unchanged_in_id_order() {
    let store = ContactStore::in_memory().unwrap();
    let contacts = sample_contacts();
    for contact in contacts.iter().rev() {
        store.insert_contact(contact).unwrap();
    }

    let loaded = store.load_contacts().unwrap();

    assert_eq!(loaded, contacts);
}

#[test]
fn duplicate_id_is_rejected() {
    let store = ContactStore::in_memory().unwrap();
    let contact = ContactBuilder::new(1).name("First").build();

    store.insert_contact(&contact).unwrap();
    assert!(store.insert_contact(&contact).is_err());
}

#[test]
fn sentinel_text_and_nulls_load_as_absent() {
    let store = ContactStore::in_memory().unwrap();
    store
        .connection()
        .execute(
            r#"INSERT INTO "Network_Contacts" ("id", "Contact Name", "Campus", "Notes / Insights")
               VALUES (5, 'Dev Patel', 'nan', NULL)"#,
            [],
        )
        .unwrap();

    let loaded = store.load_contacts().unwrap();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, ContactId::new(5));
    assert_eq!(loaded[0].name.as_deref(), Some("Dev Patel"));
    assert!(loaded[0].campus.is_none());
    assert!(loaded[0].notes.is_none());
}

#[test]
fn exported_table_without_id_uses_rowid_and_tolerates_missing_columns() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("export.db");

    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE "Network_Contacts" (
                "index" INTEGER,
                "Contact Name" TEXT,
                "Civic Domains" TEXT,
                "Campus" REAL,
                "Spreadsheet Notes" TEXT
            );
            INSERT INTO "Network_Contacts" VALUES (0, 'Ana Ruiz', 'Criminal Justice', NULL, 'ignored');
            INSERT INTO "Network_Contacts" VALUES (1, 'Sam Lee', NULL, 3.0, 'ignored');
            "#,
        )
        .unwrap();
    }

    let store = ContactStore::open(&db_path).unwrap();
    let loaded = store.load_contacts().unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, ContactId::new(1));
    assert_eq!(loaded[1].id, ContactId::new(2));
    assert_eq!(loaded[0].domains.as_deref(), Some("Criminal Justice"));
    assert!(loaded[0].campus.is_none());
    assert_eq!(loaded[1].campus.as_deref(), Some("3"));
    assert!(loaded[1].capabilities.is_none());
}

#[test]
fn null_id_is_rejected_instead_of_colliding_with_rowid() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("null-id.db");

    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE "Network_Contacts" ("id" INTEGER, "Contact Name" TEXT);
            INSERT INTO "Network_Contacts" VALUES (2, 'A');
            INSERT INTO "Network_Contacts" VALUES (NULL, 'B');
            "#,
        )
        .unwrap();
    }

    let store = ContactStore::open(&db_path).unwrap();
    let error = store.load_contacts().unwrap_err();

    assert!(error.to_string().contains("missing or non-integer id"));
}

#[test]
fn non_integer_id_is_rejected() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("text-id.db");

    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE "Network_Contacts" ("id" TEXT, "Contact Name" TEXT);
            INSERT INTO "Network_Contacts" VALUES ('abc', 'A');
            "#,
        )
        .unwrap();
    }

    let store = ContactStore::open(&db_path).unwrap();
    assert!(store.load_contacts().is_err());
}

#[test]
fn numeric_text_and_integral_real_ids_are_accepted() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("loose-id.db");

    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE "Network_Contacts" ("id", "Contact Name" TEXT);
            INSERT INTO "Network_Contacts" VALUES (' 12 ', 'A');
            INSERT INTO "Network_Contacts" VALUES (13.0, 'B');
            "#,
        )
        .unwrap();
    }

    let store = ContactStore::open(&db_path).unwrap();
    let loaded = store.load_contacts().unwrap();

    assert_eq!(loaded[0].id, ContactId::new(12));
    assert_eq!(loaded[1].id, ContactId::new(13));
}

#[test]
fn repeated_id_is_rejected() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("dup-id.db");

    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE "Network_Contacts" ("id" INTEGER, "Contact Name" TEXT);
            INSERT INTO "Network_Contacts" VALUES (7, 'A');
            INSERT INTO "Network_Contacts" VALUES (7, 'B');
            "#,
        )
        .unwrap();
    }

    let store = ContactStore::open(&db_path).unwrap();
    let error = store.load_contacts().unwrap_err();

    assert!(error.to_string().contains("Duplicate contact id 7"));
}

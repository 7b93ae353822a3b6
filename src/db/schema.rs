/// Name of the contact directory table.
pub const CONTACTS_TABLE: &str = "Network_Contacts";

/// Column headers, as they appear in the directory spreadsheet.
pub const COL_ID: &str = "id";
pub const COL_NAME: &str = "Contact Name";
pub const COL_CAMPUS: &str = "Campus";
pub const COL_ROLE: &str = "Role/Title";
pub const COL_AFFILIATION: &str = "Program/Org Affiliation";
pub const COL_DOMAINS: &str = "Civic Domains";
pub const COL_COMMUNITIES: &str = "Communities Served";
pub const COL_CAPABILITIES: &str = "Capabilities / Expertise";
pub const COL_CHALLENGES: &str = "Needs / Challenges";
pub const COL_NOTES: &str = "Notes / Insights";
pub const COL_CONTACT_INFO: &str = "Email/Phone/LinkedIn";
pub const COL_URL: &str = "URL (Overview Page)";

/// Schema for the contact directory.
///
/// Uses CREATE TABLE IF NOT EXISTS so that opening an existing directory
/// database leaves its table untouched.
pub const INITIAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "Network_Contacts" (
    "id" INTEGER PRIMARY KEY,
    "Contact Name" TEXT,
    "Campus" TEXT,
    "Role/Title" TEXT,
    "Program/Org Affiliation" TEXT,
    "Civic Domains" TEXT,
    "Communities Served" TEXT,
    "Capabilities / Expertise" TEXT,
    "Needs / Challenges" TEXT,
    "Notes / Insights" TEXT,
    "Email/Phone/LinkedIn" TEXT,
    "URL (Overview Page)" TEXT
);
"#;

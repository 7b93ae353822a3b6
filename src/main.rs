use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use civic_discovery::utils::{ensure_database_directory, resolve_database_path};
use civic_discovery::{
    ContactRecord, ContactStore, DirectoryFilter, DiscoveryEngine, FacetValues, FilterObject,
    LlmError, ProviderConfig,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Shown when interpreted search finds nothing.
const NO_MATCHES_HINT: &str =
    "No direct matches found. Try broadening or rephrasing your question.";

/// Shown when `ask` has no matches to ground an answer in.
const NO_GROUNDING_HINT: &str =
    "I couldn't find enough relevant data to answer that specifically.";

/// civic - natural-language discovery over a civic contact directory
#[derive(Parser)]
#[command(name = "civic")]
#[command(about = "Ask questions about a directory of civic partners")]
#[command(version)]
struct Cli {
    /// Path to the directory database (defaults to CIVIC_DB or the user data directory)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Find contacts matching a free-text question
    Search(SearchCommand),
    /// Answer a question from the directory with a synthesized insight
    Ask(AskCommand),
    /// Filter the directory by explicit campus, domain, or role selections
    Browse(BrowseCommand),
    /// List the campuses, domains, and roles present in the directory
    Facets,
}

#[derive(Parser)]
struct SearchCommand {
    /// The question to interpret
    #[arg(value_name = "QUERY")]
    query: String,
}

#[derive(Parser)]
struct AskCommand {
    /// The question to answer
    #[arg(value_name = "QUERY")]
    query: String,

    /// Ground the answer in the whole directory instead of the search matches
    #[arg(long)]
    all: bool,
}

#[derive(Parser)]
struct BrowseCommand {
    /// Exact campus to include (repeatable)
    #[arg(long = "campus", value_name = "CAMPUS")]
    campuses: Vec<String>,

    /// Domain to match as a case-insensitive substring (repeatable)
    #[arg(long = "domain", value_name = "DOMAIN")]
    domains: Vec<String>,

    /// Exact role or title to include (repeatable)
    #[arg(long = "role", value_name = "ROLE")]
    roles: Vec<String>,

    /// Maximum number of contacts to print
    #[arg(long, default_value_t = 50)]
    limit: usize,
}

fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let db = cli.db.as_deref();

    let result = match &cli.command {
        Commands::Search(cmd) => handle_search(db, cmd),
        Commands::Ask(cmd) => handle_ask(db, cmd),
        Commands::Browse(cmd) => handle_browse(db, cmd),
        Commands::Facets => handle_facets(db),
    };

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Installs a stderr subscriber filtered by `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("civic_discovery=warn,civic=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are empty queries and provider misconfiguration.
fn is_user_error(error: &anyhow::Error) -> bool {
    if error.to_string().contains("cannot be empty") {
        return true;
    }
    error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<LlmError>(),
            Some(LlmError::MissingApiKey { .. } | LlmError::InvalidUrl(_))
        )
    })
}

fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Query cannot be empty");
    }
    Ok(())
}

/// Opens the directory database and loads a snapshot of its contacts.
fn load_directory(db: Option<&Path>) -> Result<Vec<ContactRecord>> {
    let db_path = resolve_database_path(db)?;
    ensure_database_directory(&db_path)?;

    let store = ContactStore::open(&db_path).context("Failed to open directory database")?;
    store.load_contacts().context("Failed to load contacts")
}

fn build_engine() -> Result<DiscoveryEngine> {
    DiscoveryEngine::from_config(ProviderConfig::from_env())
        .context("Failed to configure inference provider")
}

fn handle_search(db: Option<&Path>, cmd: &SearchCommand) -> Result<()> {
    validate_query(&cmd.query)?;
    let directory = load_directory(db)?;
    let engine = build_engine()?;

    let (matches, filter) = engine.search(&cmd.query, &directory);

    println!("Filters: {}", format_filter(&filter));
    if matches.is_empty() {
        println!("{NO_MATCHES_HINT}");
        return Ok(());
    }

    println!("Found {} partner(s)", matches.len());
    for contact in &matches {
        println!("---");
        println!("{}", format_search_card(contact));
    }
    Ok(())
}

fn handle_ask(db: Option<&Path>, cmd: &AskCommand) -> Result<()> {
    validate_query(&cmd.query)?;
    let directory = load_directory(db)?;
    let engine = build_engine()?;

    if cmd.all {
        let insight = engine.synthesize(&cmd.query, &directory);
        println!("{insight}");
        println!();
        println!("(Analysis based on all {} directory entries)", directory.len());
        return Ok(());
    }

    let (matches, _filter) = engine.search(&cmd.query, &directory);
    if matches.is_empty() {
        println!("{NO_GROUNDING_HINT}");
        return Ok(());
    }

    let insight = engine.synthesize(&cmd.query, matches.contacts());
    println!("{insight}");
    println!();
    println!("(Analysis based on {} relevant entries)", matches.len());
    Ok(())
}

fn handle_browse(db: Option<&Path>, cmd: &BrowseCommand) -> Result<()> {
    let directory = load_directory(db)?;

    let filter = DirectoryFilter {
        campuses: cmd.campuses.clone(),
        domains: cmd.domains.clone(),
        roles: cmd.roles.clone(),
    };
    let results = filter.apply(&directory);

    println!("Showing {} contacts", results.len());
    for contact in results.iter().take(cmd.limit) {
        println!("---");
        println!("{}", format_directory_card(contact));
    }
    if results.len() > cmd.limit {
        println!("--- ({} more not shown)", results.len() - cmd.limit);
    }
    Ok(())
}

fn handle_facets(db: Option<&Path>) -> Result<()> {
    let directory = load_directory(db)?;
    let values = FacetValues::collect(&directory);

    print_facet("Campuses", &values.campuses);
    print_facet("Domains", &values.domains);
    print_facet("Roles", &values.roles);
    Ok(())
}

fn print_facet(label: &str, values: &[String]) {
    println!("{label} ({}):", values.len());
    for value in values {
        println!("  {value}");
    }
}

fn format_filter(filter: &FilterObject) -> String {
    if filter.is_empty() {
        "(none extracted)".to_string()
    } else {
        filter.to_string()
    }
}

/// Formats the short card shown for search matches.
fn format_search_card(contact: &ContactRecord) -> String {
    format!(
        "{} - {}\nRole: {}\nFocus: {} | {}",
        contact.display_name(),
        contact.campus.as_deref().unwrap_or("Unknown Campus"),
        contact.role.as_deref().unwrap_or("-"),
        contact.domains.as_deref().unwrap_or("-"),
        contact.communities_served.as_deref().unwrap_or("-"),
    )
}

/// Formats the full directory card, listing only fields that are present.
fn format_directory_card(contact: &ContactRecord) -> String {
    let mut header = format!(
        "{}\n{}",
        contact.display_name(),
        contact.campus.as_deref().unwrap_or("Unknown Campus")
    );
    if let Some(role) = &contact.role {
        header.push_str(&format!(" | {role}"));
    }

    let fields = [
        ("Contact", &contact.contact_info),
        ("Website", &contact.url),
        ("Program/Org", &contact.program_affiliation),
        ("Focus", &contact.domains),
        ("Capabilities", &contact.capabilities),
        ("Communities Served", &contact.communities_served),
        ("Needs / Challenges", &contact.challenges),
        ("Notes", &contact.notes),
    ];

    let mut lines = vec![header];
    for (label, value) in fields {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_discovery::{ContactBuilder, Facet};

    #[test]
    fn cli_parses_search() {
        let cli = Cli::try_parse_from(["civic", "search", "public health at Hunter"]).unwrap();
        match cli.command {
            Commands::Search(cmd) => assert_eq!(cmd.query, "public health at Hunter"),
            _ => panic!("expected search command"),
        }
        assert!(cli.db.is_none());
    }

    #[test]
    fn cli_parses_ask_with_all_and_global_db() {
        let cli = Cli::try_parse_from([
            "civic",
            "ask",
            "--all",
            "What needs exist?",
            "--db",
            "x.db",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask(cmd) => {
                assert!(cmd.all);
                assert_eq!(cmd.query, "What needs exist?");
            }
            _ => panic!("expected ask command"),
        }
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
    }

    #[test]
    fn cli_parses_repeated_browse_selections() {
        let cli = Cli::try_parse_from([
            "civic", "browse", "--campus", "Hunter", "--campus", "York", "--domain", "Housing",
        ])
        .unwrap();
        match cli.command {
            Commands::Browse(cmd) => {
                assert_eq!(cmd.campuses, vec!["Hunter", "York"]);
                assert_eq!(cmd.domains, vec!["Housing"]);
                assert!(cmd.roles.is_empty());
                assert_eq!(cmd.limit, 50);
            }
            _ => panic!("expected browse command"),
        }
    }

    #[test]
    fn empty_query_is_user_error() {
        let cmd = SearchCommand {
            query: "   ".to_string(),
        };
        let result = handle_search(None, &cmd);
        let error = result.unwrap_err();
        assert!(error.to_string().contains("cannot be empty"));
        assert!(is_user_error(&error));
    }

    #[test]
    fn missing_api_key_is_user_error() {
        let error = anyhow::Error::new(LlmError::MissingApiKey {
            provider: civic_discovery::Provider::Gemini,
        })
        .context("Failed to configure inference provider");
        assert!(is_user_error(&error));

        let error = anyhow::anyhow!("Failed to load contacts");
        assert!(!is_user_error(&error));
    }

    #[test]
    fn filter_display_marks_empty_filter() {
        assert_eq!(format_filter(&FilterObject::new()), "(none extracted)");
        let filter = FilterObject::new().with(Facet::Campus, ["Hunter", "York"]);
        assert_eq!(format_filter(&filter), "campus: Hunter | York");
    }

    #[test]
    fn directory_card_skips_absent_fields() {
        let contact = ContactBuilder::new(1)
            .name("Maria Lopez")
            .campus("Hunter")
            .role("Director")
            .challenges("Needs volunteers")
            .notes("nan")
            .build();

        let card = format_directory_card(&contact);

        assert!(card.starts_with("Maria Lopez\nHunter | Director"));
        assert!(card.contains("Needs / Challenges: Needs volunteers"));
        assert!(!card.contains("Notes"));
        assert!(!card.contains("Website"));
    }

    #[test]
    fn search_card_uses_placeholders() {
        let contact = ContactBuilder::new(1).name("Dev Patel").build();
        assert_eq!(
            format_search_card(&contact),
            "Dev Patel - Unknown Campus\nRole: -\nFocus: - | -"
        );
    }
}

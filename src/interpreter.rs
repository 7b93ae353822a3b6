//! Translation of free-text questions into structured filter objects.
//!
//! The `QueryInterpreter` asks the inference service for a single JSON object
//! keyed by the five recognized facets. Any failure along the way (service
//! unreachable, malformed output, unparsable JSON) degrades to an empty
//! `FilterObject`, which retrieval turns into zero matches.

use std::sync::Arc;

use crate::llm::CompletionProvider;
use crate::models::FilterObject;

/// System instruction for filter extraction.
const SYSTEM_PROMPT: &str =
    "You are a civic discovery assistant that converts questions into search filters. You MUST output a single valid JSON object and nothing else.";

/// Prompt template for filter extraction.
///
/// The vocabulary lists are hints about what each facet holds, not a closed
/// set; terms are passed through unvalidated.
const PROMPT_TEMPLATE: &str = r#"Convert the question below into search terms for a directory of civic contacts.

QUESTION:
"{query}"

Use only these keys, each mapping to a list of strings. Omit a key when the question says nothing about it.
- "names": specific people or organizations mentioned (e.g. "Liz Evans", "Hostos")
- "domains": civic focus areas (e.g. "Criminal Justice", "Environment", "Public Health", "Higher Education")
- "communities": communities served (e.g. "Latinx", "Bronx", "Immigrants", "Indigenous", "Students")
- "campus": campuses (e.g. "Hunter", "Queens", "York", "John Jay", "LaGuardia")
- "capabilities": capabilities or expertise (e.g. "Mentorship", "Advocacy", "Funding", "Research")

RULES:
1. Extract only terms the question states or unambiguously implies
2. Do not invent people, places or topics that are not in the question
3. Return {} if nothing in the question maps to a key

EXAMPLE:
Question: "Is Liz Evans doing anything in public health?"
Output: {"names": ["Liz Evans"], "domains": ["Public Health"]}

JSON OUTPUT:"#;

/// Converts free-text queries into `FilterObject`s using an inference service.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use civic_discovery::{ChatClientBuilder, Provider, QueryInterpreter};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ChatClientBuilder::new(Provider::Ollama).build()?;
/// let interpreter = QueryInterpreter::new(Arc::new(client));
///
/// let filter = interpreter.interpret("Who at Hunter works on public health?");
/// println!("{filter}");
/// # Ok(())
/// # }
/// ```
pub struct QueryInterpreter {
    client: Arc<dyn CompletionProvider>,
}

impl QueryInterpreter {
    /// Creates a new `QueryInterpreter` with the specified provider.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionProvider>) -> Self {
        Self { client }
    }

    /// Interprets `query` as a filter object.
    ///
    /// Never fails: blank queries and every service or parsing failure yield
    /// an empty `FilterObject`. Failures are logged at `warn`.
    pub fn interpret(&self, query: &str) -> FilterObject {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("blank query, skipping interpretation");
            return FilterObject::new();
        }

        let prompt = PROMPT_TEMPLATE.replace("{query}", query);

        let response = match self.client.complete_structured(SYSTEM_PROMPT, &prompt) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "query interpretation failed, returning empty filter");
                return FilterObject::new();
            }
        };

        let filter = parse_filter(&response);
        tracing::debug!(query, filter = %filter, "interpreted query");
        filter
    }
}

/// Extracts the outermost JSON object from a model response.
///
/// Handles code fences and explanatory text around the object.
fn extract_json(response: &str) -> Option<&str> {
    let trimmed = response.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;

    if start <= end {
        Some(&trimmed[start..=end])
    } else {
        None
    }
}

/// Parses a model response into a filter object, failing safe to empty.
fn parse_filter(response: &str) -> FilterObject {
    let Some(json_str) = extract_json(response) else {
        tracing::warn!(response, "no JSON object in interpretation response");
        return FilterObject::new();
    };

    match serde_json::from_str::<serde_json::Value>(json_str) {
        Ok(value) if value.is_object() => FilterObject::from_json(&value),
        Ok(_) => {
            tracing::warn!(response, "interpretation response is not a JSON object");
            FilterObject::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse interpretation response");
            FilterObject::new()
        }
    }
}

//! Grounded natural-language answers over retrieved contacts.

use std::sync::Arc;

use crate::llm::{CompletionProvider, LlmError};
use crate::models::ContactRecord;

/// Answer returned when there are no records to ground a response in.
pub const INSUFFICIENT_DATA_MESSAGE: &str =
    "I couldn't find any data to summarize for that topic.";

/// Prefix marking an answer that is actually a service failure.
pub const SYNTHESIS_ERROR_PREFIX: &str = "Error generating insight: ";

const SYSTEM_PROMPT: &str = "You are a civic insight analyst for a university-wide network of civic partners. Answer the user's question using only the directory records provided.";

/// Prompt template for grounded synthesis.
const PROMPT_TEMPLATE: &str = r#"USER QUESTION:
"{query}"

RULES:
1. Answer using ONLY the records below - do not add outside knowledge
2. Cite specific people, campuses or programs by name, and include the record ID like [contact:12]
3. Point out connections between contacts on different campuses where the records support them
4. When a record states challenges or needs relevant to the question, quote them as written
5. If the records do not answer the question, say so plainly

RECORDS:
{records}"#;

/// Returns true if `answer` is a synthesis failure rather than an insight.
pub fn is_synthesis_error(answer: &str) -> bool {
    answer.starts_with(SYNTHESIS_ERROR_PREFIX)
}

/// Produces grounded prose answers from a set of contact records.
pub struct InsightSynthesizer {
    client: Arc<dyn CompletionProvider>,
}

impl InsightSynthesizer {
    #[must_use]
    pub fn new(client: Arc<dyn CompletionProvider>) -> Self {
        Self { client }
    }

    /// Answers `query` from `contacts`.
    ///
    /// `contacts` may be a filtered result set or the whole directory; every
    /// record passed is included in the grounding context. Always returns a
    /// displayable string: [`INSUFFICIENT_DATA_MESSAGE`] without calling the
    /// service when `contacts` is empty, or the error text prefixed with
    /// [`SYNTHESIS_ERROR_PREFIX`] when the service call fails.
    pub fn synthesize(&self, query: &str, contacts: &[ContactRecord]) -> String {
        if contacts.is_empty() {
            return INSUFFICIENT_DATA_MESSAGE.to_string();
        }

        match self.try_synthesize(query, contacts) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, records = contacts.len(), "insight synthesis failed");
                format!("{SYNTHESIS_ERROR_PREFIX}{e}")
            }
        }
    }

    fn try_synthesize(&self, query: &str, contacts: &[ContactRecord]) -> Result<String, LlmError> {
        let prompt = PROMPT_TEMPLATE
            .replace("{query}", query.trim())
            .replace("{records}", &format_records_context(contacts));

        tracing::debug!(records = contacts.len(), prompt_len = prompt.len(), "requesting insight");
        self.client.complete_text(SYSTEM_PROMPT, &prompt)
    }
}

/// Serializes records into field-labeled blocks, one per record.
fn format_records_context(contacts: &[ContactRecord]) -> String {
    contacts
        .iter()
        .map(|contact| {
            format!(
                "[CONTACT ID={}]\nContact: {} ({})\nRole: {} | {}\nRaw note: \"{}\"\nChallenges: \"{}\"\nDomains: {}\nCommunities served: {}\nCapabilities: {}\n---",
                contact.id,
                contact.display_name(),
                contact.campus.as_deref().unwrap_or("Unknown"),
                or_na(&contact.role),
                or_na(&contact.program_affiliation),
                or_na(&contact.notes),
                or_na(&contact.challenges),
                or_na(&contact.domains),
                or_na(&contact.communities_served),
                or_na(&contact.capabilities),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

//! The discovery pipeline as seen by callers.
//!
//! `DiscoveryEngine::search` runs interpretation and retrieval in one call;
//! `DiscoveryEngine::synthesize` is requested separately, over either the
//! search results or the whole directory. Neither operation fails.

use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::interpreter::QueryInterpreter;
use crate::llm::{ChatClientBuilder, CompletionProvider, LlmError};
use crate::models::{ContactRecord, FilterObject, ResultSet};
use crate::retrieval::retrieve;
use crate::synthesis::InsightSynthesizer;

/// Natural-language discovery over a contact directory.
///
/// Stateless between calls: each query works on the dataset snapshot it is
/// given and produces a fresh result set.
///
/// # Examples
///
/// ```no_run
/// use civic_discovery::{ContactBuilder, DiscoveryEngine, ProviderConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = DiscoveryEngine::from_config(ProviderConfig::from_env())?;
/// let directory = vec![
///     ContactBuilder::new(1).name("Maria Lopez").domains("Public Health").build(),
/// ];
///
/// let (matches, filter) = engine.search("Who is working in public health?", &directory);
/// println!("{} matches for {filter}", matches.len());
///
/// let answer = engine.synthesize("Who is working in public health?", matches.contacts());
/// println!("{answer}");
/// # Ok(())
/// # }
/// ```
pub struct DiscoveryEngine {
    interpreter: QueryInterpreter,
    synthesizer: InsightSynthesizer,
}

impl DiscoveryEngine {
    /// Creates an engine that uses `client` for both interpretation and synthesis.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionProvider>) -> Self {
        Self {
            interpreter: QueryInterpreter::new(client.clone()),
            synthesizer: InsightSynthesizer::new(client),
        }
    }

    /// Creates an engine backed by an HTTP chat client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built (invalid URL, missing key).
    pub fn from_config(config: ProviderConfig) -> Result<Self, LlmError> {
        let client = ChatClientBuilder::from_config(config).build()?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Interprets `query` and applies the resulting filter to `dataset`.
    ///
    /// Returns the matches together with the filter that produced them. When
    /// interpretation fails the filter is empty and so are the matches.
    pub fn search(&self, query: &str, dataset: &[ContactRecord]) -> (ResultSet, FilterObject) {
        let filter = self.interpreter.interpret(query);
        let matches = retrieve(&filter, dataset);
        (matches, filter)
    }

    /// Produces a grounded answer to `query` from `contacts`.
    ///
    /// See [`InsightSynthesizer::synthesize`].
    pub fn synthesize(&self, query: &str, contacts: &[ContactRecord]) -> String {
        self.synthesizer.synthesize(query, contacts)
    }
}

//! Natural-language discovery over a directory of civic contacts.
//!
//! A free-text question is interpreted into a [`FilterObject`], applied to the
//! directory with [`retrieve`], and optionally summarized by an
//! [`InsightSynthesizer`] grounded in the matching records. [`DiscoveryEngine`]
//! bundles the pipeline behind two calls that never fail.

pub mod browse;
pub mod config;
pub mod db;
pub mod engine;
pub mod interpreter;
pub mod llm;
pub mod models;
pub mod retrieval;
pub mod synthesis;
pub mod utils;

pub use browse::{DirectoryFilter, FacetValues};
pub use config::{Provider, ProviderConfig};
pub use db::ContactStore;
pub use engine::DiscoveryEngine;
pub use interpreter::QueryInterpreter;
pub use llm::{ChatClient, ChatClientBuilder, CompletionProvider, LlmError};
pub use models::{ContactBuilder, ContactId, ContactRecord, Facet, FilterObject, ResultSet};
pub use retrieval::{TermPattern, retrieve};
pub use synthesis::{
    INSUFFICIENT_DATA_MESSAGE, InsightSynthesizer, SYNTHESIS_ERROR_PREFIX, is_synthesis_error,
};

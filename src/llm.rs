/// Inference service boundary.
///
/// This module provides a blocking chat completion client for OpenAI-compatible
/// endpoints, the `CompletionProvider` trait the pipeline is written against,
/// and retry logic for transient failures.
mod client;

pub use client::{ChatClient, ChatClientBuilder, CompletionProvider, LlmError, retry_with_delays};

//! Chat model client and prompt templates.
//!
//! - [`api::LlmClient`] -- OpenAI-compatible chat completion client.
//! - [`prompt`] -- decision and narrative prompt templates.

pub mod api;
pub mod prompt;

pub use api::{ChatMessage, ChatResponse, Choice, LlmClient, Usage};

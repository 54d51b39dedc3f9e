//! Language model gateway and prompt plumbing.
//!
//! One synchronous, non-streaming completion call per request. Prompts are
//! plain text; model answers come back as markdown and are rendered to HTML.

pub mod config;
pub mod gateway;
pub mod prompts;
pub mod render;
pub mod types;

pub use config::LLMConfig;
pub use gateway::{CompletionGateway, HttpGateway, UnconfiguredGateway};
pub use render::render_markdown;
pub use types::*;

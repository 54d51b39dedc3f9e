//! Conversation runtime: classify a company, then answer its questions.
//!
//! The first message of a session is a company description and is classified
//! into an industry code. Every later message is a question answered from the
//! collection routed for that code's sector.

pub mod assembler;
pub mod assistant;
pub mod classifier;
pub mod events;
pub mod session;

#[cfg(test)]
mod testing;

pub use assembler::{Answer, ContextAssembler};
pub use assistant::{build_assistant, Assistant, Reply};
pub use classifier::{Classification, NaceClassifier};
pub use events::{ConversationEvent, ConversationSink, NoopSink, TracingSink};
pub use session::{CompanyProfile, ConversationState};

//! Message categorization pipeline.
//!
//! Every inbound message, whatever channel it came from, flows through:
//! 1. `channels::*Adapter::adapt()`: webhook payload → `InboundMessage`
//! 2. `prompt::build_categorization_prompt()`: deterministic prompt
//! 3. `AiService::chat()`: policy gate, then LLM transport
//! 4. `extract::extract_verdict()`: reply → `Verdict`
//!
//! **A single categorization never fails.** Anything that goes wrong after the
//! adapter becomes the fallback verdict, flagged for manual review.

pub mod categorizer;
pub mod extract;
pub mod prompt;
pub mod types;

pub use categorizer::Categorizer;
pub use types::{
    BatchResult, CategorizationContext, CategorizedMessage, Category, InboundMessage,
    MessageChannel, Urgency, Verdict,
};

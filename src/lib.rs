//! FlowBridge: property communication webhooks with AI categorization.

pub mod channels;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod routes;

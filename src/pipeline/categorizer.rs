//! Categorizer: runs inbound messages through the model and always
//! hands back a usable verdict.
//!
//! Flow:
//! 1. Validate the message (non-empty text and sender)
//! 2. Build the prompt from message + context
//! 3. Policy gate → LLM transport (fast tier)
//! 4. Extract the verdict; an unusable reply becomes the fallback verdict
//!
//! `categorize` folds every failure into the fallback verdict.
//! `categorize_batch` counts validation, policy and transport failures
//! separately, while extraction fallbacks still count as successful.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, error, info, warn};

use crate::error::{PipelineError, ValidationError};
use crate::llm::service::{AiService, ChatOptions};
use crate::pipeline::extract::extract_verdict;
use crate::pipeline::prompt::{build_categorization_prompt, build_summary_prompt};
use crate::pipeline::types::{
    BatchResult, CategorizationContext, CategorizedMessage, InboundMessage, Verdict,
};

/// Token budget for the daily summary (quality tier).
const SUMMARY_MAX_TOKENS: u32 = 800;

pub struct Categorizer {
    ai: Arc<AiService>,
}

impl Categorizer {
    pub fn new(ai: Arc<AiService>) -> Self {
        Self { ai }
    }

    pub fn ai(&self) -> &AiService {
        &self.ai
    }

    /// Categorize one message. Never fails.
    pub async fn categorize(
        &self,
        message: InboundMessage,
        context: &CategorizationContext,
    ) -> CategorizedMessage {
        match self.try_categorize(&message, context).await {
            Ok(verdict) => CategorizedMessage::new(verdict, message),
            Err(e) => {
                error!(
                    from = %message.from,
                    channel = %message.channel,
                    error = %e,
                    "Categorization failed, using fallback"
                );
                CategorizedMessage::new(Verdict::fallback(e.to_string()), message)
            }
        }
    }

    /// Categorize many messages concurrently.
    ///
    /// Members run independently on the calling task; one failure neither
    /// cancels nor delays the others. `successful` is in completion order.
    pub async fn categorize_batch(
        &self,
        messages: Vec<InboundMessage>,
        context: &CategorizationContext,
    ) -> BatchResult {
        let total = messages.len();
        info!(count = total, "Batch categorizing messages");

        let mut pending: FuturesUnordered<_> = messages
            .into_iter()
            .map(|message| async move {
                let outcome = self.try_categorize(&message, context).await;
                (message, outcome)
            })
            .collect();

        let mut successful = Vec::with_capacity(total);
        let mut failed = 0;
        while let Some((message, outcome)) = pending.next().await {
            match outcome {
                Ok(verdict) => successful.push(CategorizedMessage::new(verdict, message)),
                Err(e) => {
                    failed += 1;
                    error!(
                        from = %message.from,
                        error = %e,
                        "Failed to categorize message in batch"
                    );
                }
            }
        }

        if failed > 0 {
            warn!(failed, total, "Some messages failed to categorize");
        }
        info!(successful = successful.len(), failed, total, "Batch categorization complete");

        BatchResult {
            successful,
            failed,
            total,
        }
    }

    /// Write the daily digest for already-categorized messages.
    ///
    /// Unlike categorization there is no fallback: errors go to the caller.
    pub async fn summarize(
        &self,
        entries: &[CategorizedMessage],
        date: &str,
    ) -> Result<String, PipelineError> {
        let prompt = build_summary_prompt(entries, date);
        let options = ChatOptions::quality().with_max_tokens(SUMMARY_MAX_TOKENS);
        let summary = self.ai.chat(&prompt, options).await?;
        info!(chars = summary.len(), "Daily summary generated");
        Ok(summary)
    }

    /// The fallible core shared by single and batch paths.
    ///
    /// Extraction failures are already resolved to a fallback verdict here;
    /// only validation, policy and transport errors escape.
    async fn try_categorize(
        &self,
        message: &InboundMessage,
        context: &CategorizationContext,
    ) -> Result<Verdict, PipelineError> {
        validate(message)?;
        debug!(from = %message.from, channel = %message.channel, "Categorizing message");

        let context = CategorizationContext::for_message(message, context);
        let prompt = build_categorization_prompt(&message.text, &context);
        let reply = self.ai.chat(&prompt, ChatOptions::default()).await?;

        match extract_verdict(&reply) {
            Ok(verdict) => {
                info!(
                    category = %verdict.category,
                    urgency = %verdict.urgency,
                    "Message categorized"
                );
                Ok(verdict)
            }
            Err(e) => {
                warn!(raw_response = %reply, error = %e, "Failed to parse categorization response");
                Ok(Verdict::fallback(e.to_string()))
            }
        }
    }
}

fn validate(message: &InboundMessage) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    if message.text.trim().is_empty() {
        missing.push("text");
    }
    if message.from.trim().is_empty() {
        missing.push("from");
    }
    match missing.len() {
        0 => Ok(()),
        1 => Err(ValidationError::MissingField(missing[0])),
        _ => Err(ValidationError::MissingFields(missing)),
    }
}

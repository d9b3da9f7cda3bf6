//! Free-chat completion adapter.
//!
//! Wraps an [`LlmProvider`] with the fixed system instruction and sampling
//! settings used for open chat. Provider failures never escape: the caller
//! always gets displayable text back.

use std::sync::Arc;

use crate::conversation::{Speaker, TranscriptEntry};
use crate::llm::provider::{ChatMessage, CompletionRequest, FinishReason, LlmProvider};

/// System instruction prepended to every chat request.
pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful and engaging chatbot.";
/// Reply length cap, in tokens.
pub const CHAT_MAX_TOKENS: u32 = 150;
/// Sampling temperature for chat replies.
pub const CHAT_TEMPERATURE: f32 = 0.8;
/// Shown to the user when the provider fails.
pub const CHAT_FAILURE_MESSAGE: &str = "I'm sorry, something went wrong. Please try again later.";

/// Produces assistant replies for the open-chat step.
#[derive(Clone)]
pub struct ChatResponder {
    llm: Arc<dyn LlmProvider>,
}

impl ChatResponder {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Build the provider request for `message` given the transcript so far.
    pub fn build_request(history: &[TranscriptEntry], message: &str) -> CompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(CHAT_SYSTEM_PROMPT));
        messages.extend(history.iter().map(|entry| match entry.speaker {
            Speaker::User => ChatMessage::user(&entry.content),
            Speaker::Assistant => ChatMessage::assistant(&entry.content),
        }));
        messages.push(ChatMessage::user(message));

        CompletionRequest::new(messages)
            .with_max_tokens(CHAT_MAX_TOKENS)
            .with_temperature(CHAT_TEMPERATURE)
    }

    /// Reply to `message`. Returns [`CHAT_FAILURE_MESSAGE`] if the provider fails.
    pub async fn reply(&self, history: &[TranscriptEntry], message: &str) -> String {
        let request = Self::build_request(history, message);
        match self.llm.complete(request).await {
            Ok(response) => {
                tracing::info!(
                    model = self.llm.model_name(),
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = ?response.finish_reason,
                    "Chat reply generated"
                );
                if response.finish_reason == FinishReason::Length {
                    tracing::warn!("Chat reply hit the {} token cap", CHAT_MAX_TOKENS);
                }
                response.content.trim().to_string()
            }
            Err(e) => {
                tracing::error!("Error generating response: {}", e);
                CHAT_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::LlmError;
    use crate::llm::provider::{CompletionResponse, Role};

    struct ScriptedLlm {
        reply: Result<String, String>,
        finish: FinishReason,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.seen.lock().unwrap().push(request);
            match &self.reply {
                Ok(text) => Ok(CompletionResponse {
                    content: text.clone(),
                    input_tokens: 0,
                    output_tokens: 0,
                    finish_reason: self.finish,
                }),
                Err(reason) => Err(LlmError::RequestFailed {
                    provider: "scripted".to_string(),
                    reason: reason.clone(),
                }),
            }
        }
    }

    fn history() -> Vec<TranscriptEntry> {
        vec![
            TranscriptEntry::new(Speaker::User, "Jane"),
            TranscriptEntry::new(Speaker::Assistant, "Awesome, Jane!"),
        ]
    }

    #[test]
    fn request_prepends_system_and_appends_message() {
        let request = ChatResponder::build_request(&history(), "Any tips?");
        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(request.messages[0].content, CHAT_SYSTEM_PROMPT);
        assert_eq!(request.messages[3].content, "Any tips?");
        assert_eq!(request.max_tokens, Some(CHAT_MAX_TOKENS));
        assert_eq!(request.temperature, Some(CHAT_TEMPERATURE));
    }

    #[tokio::test]
    async fn reply_is_trimmed() {
        let llm = Arc::new(ScriptedLlm {
            reply: Ok("  Sure thing!\n".to_string()),
            finish: FinishReason::Stop,
            seen: Mutex::new(Vec::new()),
        });
        let responder = ChatResponder::new(llm.clone());
        assert_eq!(responder.reply(&history(), "hi").await, "Sure thing!");
        assert_eq!(llm.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_becomes_generic_message() {
        let llm = Arc::new(ScriptedLlm {
            reply: Err("connection reset".to_string()),
            finish: FinishReason::Stop,
            seen: Mutex::new(Vec::new()),
        });
        let responder = ChatResponder::new(llm);
        assert_eq!(responder.reply(&[], "hi").await, CHAT_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn length_cut_reply_is_still_returned() {
        let llm = Arc::new(ScriptedLlm {
            reply: Ok("Try the tasting menu and".to_string()),
            finish: FinishReason::Length,
            seen: Mutex::new(Vec::new()),
        });
        let responder = ChatResponder::new(llm);
        assert_eq!(
            responder.reply(&history(), "dinner ideas?").await,
            "Try the tasting menu and"
        );
    }
}

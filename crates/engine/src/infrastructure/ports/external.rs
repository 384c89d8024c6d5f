//! External service port trait for the generation backend.

use async_trait::async_trait;
use taleforge_domain::MessageRole;

use super::error::LlmError;

/// A single role-tagged turn as replayed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// A completion request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The conversation history, in storage order.
    pub messages: Vec<ChatTurn>,
    /// Optional system prompt, sent as the first message when present.
    pub system_prompt: Option<String>,
    /// Model override; the client default applies when unset.
    pub model: Option<String>,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(messages: Vec<ChatTurn>) -> Self {
        Self {
            messages,
            system_prompt: None,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A completion result.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    /// Model identifier reported by the provider.
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Generation backend port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmPort: Send + Sync {
    /// Produce one completion for an ordered list of role-tagged turns.
    ///
    /// An empty completion is an error, not an empty success.
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Derive a short (<= 5 word) chat title from the first user message.
    /// Best-effort; callers treat a failure as "keep the current title".
    async fn title_for(&self, first_message: &str) -> Result<String, LlmError>;
}

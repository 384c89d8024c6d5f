//! OpenRouter LLM client (OpenAI-compatible API)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use taleforge_domain::MessageRole;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse, TokenUsage};
use crate::prompt_templates;

/// Client for OpenRouter's OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: String,
    /// Default model for role-play completions.
    model: String,
    /// Model used for title derivation.
    title_model: String,
    referer: Option<String>,
    site_name: Option<String>,
}

/// Default OpenRouter base URL.
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1000;
const TITLE_MAX_TOKENS: u32 = 20;

impl OpenRouterClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        // Use 120 second timeout for LLM requests (they can be slow)
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            title_model: model.to_string(),
            referer: None,
            site_name: None,
        }
    }

    /// Create client with custom timeout (for testing).
    pub fn with_timeout(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            title_model: model.to_string(),
            referer: None,
            site_name: None,
        }
    }

    pub fn with_title_model(mut self, model: &str) -> Self {
        self.title_model = model.to_string();
        self
    }

    /// Attribution headers OpenRouter uses for app rankings.
    pub fn with_attribution(mut self, referer: Option<String>, site_name: Option<String>) -> Self {
        self.referer = referer;
        self.site_name = site_name;
        self
    }

    /// Create client from environment variables.
    ///
    /// Uses `OPENROUTER_BASE_URL`, `OPENROUTER_API_KEY`, `RP_MODEL`,
    /// `TITLE_MODEL`, `SITE_URL` and `SITE_NAME`, falling back to defaults
    /// where unset.
    pub fn from_env() -> Self {
        let base_url = std::env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_OPENROUTER_BASE_URL.to_string());
        let api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_default();
        let model = std::env::var("RP_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let title_model = std::env::var("TITLE_MODEL").unwrap_or_else(|_| model.clone());

        Self::new(&base_url, &api_key, &model)
            .with_title_model(&title_model)
            .with_attribution(std::env::var("SITE_URL").ok(), std::env::var("SITE_NAME").ok())
    }

    async fn chat_completion(
        &self,
        api_request: OpenAIChatRequest,
    ) -> Result<OpenAIChatResponse, LlmError> {
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&api_request);

        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(site_name) = &self.site_name {
            builder = builder.header("X-Title", site_name);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| LlmError::RequestFailed(e.to_string()))?;
            return Err(LlmError::RequestFailed(error_text));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LlmPort for OpenRouterClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.model.clone());
        let api_request = OpenAIChatRequest {
            model,
            messages: build_messages(&request),
            temperature: Some(request.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            max_tokens: Some(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
        };

        let api_response = self.chat_completion(api_request).await?;
        convert_response(api_response)
    }

    async fn title_for(&self, first_message: &str) -> Result<String, LlmError> {
        let api_request = OpenAIChatRequest {
            model: self.title_model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: prompt_templates::resolve(
                        prompt_templates::keys::TITLE_SYSTEM_PROMPT,
                    ),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: first_message.to_string(),
                },
            ],
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: Some(TITLE_MAX_TOKENS),
        };

        let api_response = self.chat_completion(api_request).await?;
        let response = convert_response(api_response)?;
        let title = response.content.trim().to_string();
        if title.is_empty() {
            return Err(LlmError::InvalidResponse("Empty title".to_string()));
        }
        Ok(title)
    }
}

fn build_messages(request: &LlmRequest) -> Vec<OpenAIMessage> {
    let mut messages = Vec::new();

    if let Some(system) = &request.system_prompt {
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: system.clone(),
        });
    }

    for msg in &request.messages {
        messages.push(OpenAIMessage {
            role: match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
                MessageRole::System => "system",
            }
            .to_string(),
            content: msg.content.clone(),
        });
    }

    messages
}

fn convert_response(response: OpenAIChatResponse) -> Result<LlmResponse, LlmError> {
    let model = response.model;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in LLM response".to_string()))?;

    let content = choice.message.content.unwrap_or_default();
    if content.is_empty() {
        return Err(LlmError::InvalidResponse(
            "No response from LLM".to_string(),
        ));
    }

    Ok(LlmResponse {
        content,
        model,
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAIChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

//! AI-assisted field suggestions for the universe and character editors.
//!
//! Given a target entity, a field, and whatever the author has filled in so
//! far, ask the generation backend for a draft of that field.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::ports::{ChatTurn, LlmError, LlmPort, LlmRequest};
use crate::prompt_templates::{self, keys};

const SUGGESTION_TEMPERATURE: f32 = 0.8;
const SUGGESTION_MAX_TOKENS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionTarget {
    Character,
    Universe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionField {
    Description,
    Personality,
    Backstory,
    Abilities,
    SystemPrompt,
    GameInstructions,
}

/// Already-filled editor fields, passed along as grounding context.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestionContext {
    pub description: Option<String>,
    pub personality: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("{0} is not a {1} field")]
    FieldMismatch(&'static str, &'static str),
    #[error(transparent)]
    Generation(#[from] LlmError),
}

pub struct FieldSuggestions {
    llm: Arc<dyn LlmPort>,
}

impl FieldSuggestions {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    /// Generate a draft for one editor field. `name` is the entity name the
    /// author has typed so far.
    pub async fn suggest(
        &self,
        target: SuggestionTarget,
        field: SuggestionField,
        name: &str,
        context: &SuggestionContext,
    ) -> Result<String, SuggestionError> {
        let system_prompt = prompt_templates::resolve(template_key(target, field)?);
        let user_message = user_message(target, field, name, context);

        let request = LlmRequest::new(vec![ChatTurn::user(user_message)])
            .with_system_prompt(system_prompt)
            .with_temperature(SUGGESTION_TEMPERATURE)
            .with_max_tokens(SUGGESTION_MAX_TOKENS);

        let response = self.llm.complete(request).await?;
        Ok(response.content.trim().to_string())
    }
}

fn template_key(
    target: SuggestionTarget,
    field: SuggestionField,
) -> Result<&'static str, SuggestionError> {
    use SuggestionField as F;
    use SuggestionTarget as T;
    match (target, field) {
        (T::Character, F::Description) => Ok(keys::SUGGESTION_CHARACTER_DESCRIPTION),
        (T::Character, F::Personality) => Ok(keys::SUGGESTION_CHARACTER_PERSONALITY),
        (T::Character, F::Backstory) => Ok(keys::SUGGESTION_CHARACTER_BACKSTORY),
        (T::Character, F::Abilities) => Ok(keys::SUGGESTION_CHARACTER_ABILITIES),
        (T::Universe, F::Description) => Ok(keys::SUGGESTION_UNIVERSE_DESCRIPTION),
        (T::Universe, F::SystemPrompt) => Ok(keys::SUGGESTION_UNIVERSE_SYSTEM_PROMPT),
        (T::Universe, F::GameInstructions) => Ok(keys::SUGGESTION_UNIVERSE_GAME_INSTRUCTIONS),
        (T::Character, _) => Err(SuggestionError::FieldMismatch(field_name(field), "character")),
        (T::Universe, _) => Err(SuggestionError::FieldMismatch(field_name(field), "universe")),
    }
}

fn field_name(field: SuggestionField) -> &'static str {
    match field {
        SuggestionField::Description => "description",
        SuggestionField::Personality => "personality",
        SuggestionField::Backstory => "backstory",
        SuggestionField::Abilities => "abilities",
        SuggestionField::SystemPrompt => "system_prompt",
        SuggestionField::GameInstructions => "game_instructions",
    }
}

fn user_message(
    target: SuggestionTarget,
    field: SuggestionField,
    name: &str,
    context: &SuggestionContext,
) -> String {
    let noun = match target {
        SuggestionTarget::Character => "Character",
        SuggestionTarget::Universe => "Universe",
    };
    let mut message = format!("{noun} name: {name}");
    if let Some(description) = &context.description {
        message.push_str(&format!("\nDescription: {description}"));
    }
    if let Some(personality) = &context.personality {
        message.push_str(&format!("\nPersonality: {personality}"));
    }
    if let Some(system_prompt) = &context.system_prompt {
        message.push_str(&format!("\nSystem prompt: {system_prompt}"));
    }
    message.push_str(&format!("\n\nGenerate the {}.", field_name(field)));
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{LlmResponse, MockLlmPort};

    #[tokio::test]
    async fn builds_field_specific_request() {
        let mut llm = MockLlmPort::new();
        llm.expect_complete()
            .withf(|req| {
                req.temperature == Some(SUGGESTION_TEMPERATURE)
                    && req.max_tokens == Some(SUGGESTION_MAX_TOKENS)
                    && req
                        .system_prompt
                        .as_deref()
                        .is_some_and(|p| p.contains("backstory"))
                    && req.messages.len() == 1
                    && req.messages[0].content.contains("Character name: Kestrel")
                    && req.messages[0].content.contains("Description: A sky courier")
            })
            .times(1)
            .returning(|_| {
                Ok(LlmResponse {
                    content: "  Raised among cloud pirates.  ".to_string(),
                    model: "openai/gpt-4o-mini".to_string(),
                    usage: None,
                })
            });

        let context = SuggestionContext {
            description: Some("A sky courier".to_string()),
            ..Default::default()
        };
        let suggestion = FieldSuggestions::new(Arc::new(llm))
            .suggest(
                SuggestionTarget::Character,
                SuggestionField::Backstory,
                "Kestrel",
                &context,
            )
            .await
            .expect("suggestion should succeed");
        assert_eq!(suggestion, "Raised among cloud pirates.");
    }

    #[tokio::test]
    async fn rejects_mismatched_target_and_field() {
        let mut llm = MockLlmPort::new();
        llm.expect_complete().times(0);

        let error = FieldSuggestions::new(Arc::new(llm))
            .suggest(
                SuggestionTarget::Universe,
                SuggestionField::Backstory,
                "Clockwork Seas",
                &SuggestionContext::default(),
            )
            .await
            .expect_err("universe has no backstory field");
        assert!(matches!(error, SuggestionError::FieldMismatch(_, _)));
    }
}

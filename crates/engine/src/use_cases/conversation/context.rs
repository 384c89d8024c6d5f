//! Context assembly - system prompt construction for a chat.
//!
//! Resolves the chat's universe and character references against current
//! storage and composes the narrator's system prompt. No caching: the
//! prompt is rebuilt from the latest stored state on every send.

use std::sync::Arc;

use taleforge_domain::{CharacterRef, Chat, UniverseRef};

use crate::entities::{Characters, Universes};
use crate::infrastructure::ports::RepoError;
use crate::prompt_templates;

/// Universe fields that contribute to the prompt, regardless of which
/// storage variant they came from.
#[derive(Debug, Clone)]
pub struct UniverseContext {
    pub system_prompt: String,
    pub game_instructions: Option<String>,
}

/// Character fields that contribute to the prompt.
#[derive(Debug, Clone)]
pub struct CharacterContext {
    pub name: String,
    pub description: String,
    pub personality: Option<String>,
    pub backstory: Option<String>,
    pub special_abilities: Option<Vec<String>>,
}

/// Builds the system prompt for a chat.
pub struct ContextAssembler {
    universes: Arc<Universes>,
    characters: Arc<Characters>,
}

impl ContextAssembler {
    pub fn new(universes: Arc<Universes>, characters: Arc<Characters>) -> Self {
        Self {
            universes,
            characters,
        }
    }

    /// Build the system prompt for a chat, or `None` when the chat has
    /// neither universe nor character context.
    ///
    /// A reference whose record has since been deleted contributes nothing,
    /// same as an unset reference.
    pub async fn build_system_prompt(&self, chat: &Chat) -> Result<Option<String>, RepoError> {
        let universe = self.resolve_universe(chat).await?;
        let character = self.resolve_character(chat).await?;
        Ok(compose_system_prompt(universe.as_ref(), character.as_ref()))
    }

    async fn resolve_universe(&self, chat: &Chat) -> Result<Option<UniverseContext>, RepoError> {
        match chat.universe {
            Some(UniverseRef::Standard(id)) => Ok(self.universes.get(id).await?.map(|u| {
                UniverseContext {
                    system_prompt: u.system_prompt,
                    game_instructions: u.game_instructions,
                }
            })),
            Some(UniverseRef::Custom(id)) => Ok(self.universes.get_custom(id).await?.map(|u| {
                UniverseContext {
                    system_prompt: u.system_prompt,
                    game_instructions: u.game_instructions,
                }
            })),
            None => Ok(None),
        }
    }

    async fn resolve_character(&self, chat: &Chat) -> Result<Option<CharacterContext>, RepoError> {
        match chat.character {
            Some(CharacterRef::Standard(id)) => Ok(self.characters.get(id).await?.map(|c| {
                CharacterContext {
                    name: c.name,
                    description: c.description,
                    personality: c.personality,
                    backstory: c.backstory,
                    special_abilities: c.special_abilities,
                }
            })),
            Some(CharacterRef::Custom(id)) => Ok(self.characters.get_custom(id).await?.map(|c| {
                CharacterContext {
                    name: c.name,
                    description: c.description,
                    personality: c.personality,
                    backstory: c.backstory,
                    special_abilities: c.special_abilities,
                }
            })),
            None => Ok(None),
        }
    }
}

/// Compose the prompt from resolved context. Pure; deterministic for a
/// given pair of inputs.
pub fn compose_system_prompt(
    universe: Option<&UniverseContext>,
    character: Option<&CharacterContext>,
) -> Option<String> {
    if universe.is_none() && character.is_none() {
        return None;
    }

    let mut sections: Vec<String> = Vec::new();

    if let Some(universe) = universe {
        sections.push(universe.system_prompt.clone());
        if let Some(instructions) = &universe.game_instructions {
            sections.push(instructions.clone());
        }
        sections.push(prompt_templates::resolve(
            prompt_templates::keys::NARRATIVE_INSTRUCTIONS,
        ));
    }

    if let Some(character) = character {
        sections.push(character_details(character));
    }

    Some(sections.join("\n\n"))
}

fn character_details(character: &CharacterContext) -> String {
    let mut block = format!(
        "CHARACTER DETAILS:\nName: {}\nDescription: {}",
        character.name, character.description
    );
    if let Some(personality) = &character.personality {
        block.push_str(&format!("\nPersonality: {personality}"));
    }
    if let Some(backstory) = &character.backstory {
        block.push_str(&format!("\nBackstory: {backstory}"));
    }
    if let Some(abilities) = &character.special_abilities {
        block.push_str(&format!("\nSpecial Abilities: {}", abilities.join(", ")));
    }
    block.push_str(&format!(
        "\n\nRemember: the user is playing as {}. Treat every message they \
         send as {}'s own words and actions.",
        character.name, character.name
    ));
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Characters, Universes};
    use crate::infrastructure::ports::{
        MockCharacterRepo, MockCustomCharacterRepo, MockCustomUniverseRepo, MockUniverseRepo,
    };
    use chrono::Utc;
    use taleforge_domain::{Chat, Universe, UniverseId, UserId};

    fn universe_ctx(prompt: &str, instructions: Option<&str>) -> UniverseContext {
        UniverseContext {
            system_prompt: prompt.to_string(),
            game_instructions: instructions.map(str::to_string),
        }
    }

    fn character_ctx(name: &str) -> CharacterContext {
        CharacterContext {
            name: name.to_string(),
            description: "A wandering scholar".to_string(),
            personality: Some("Curious".to_string()),
            backstory: None,
            special_abilities: Some(vec!["Cartography".to_string(), "Stargazing".to_string()]),
        }
    }

    #[test]
    fn returns_none_without_universe_or_character() {
        assert_eq!(compose_system_prompt(None, None), None);
    }

    #[test]
    fn universe_prompt_precedes_game_instructions_and_narrative_block() {
        let universe = universe_ctx("P", Some("G"));
        let prompt = compose_system_prompt(Some(&universe), None).expect("prompt expected");

        let p = prompt.find("P").expect("system prompt present");
        let g = prompt.find("G").expect("game instructions present");
        let narrative = prompt
            .find("NARRATIVE INSTRUCTIONS")
            .expect("narrative block present");
        assert!(p < g);
        assert!(g < narrative);
    }

    #[test]
    fn narrative_block_is_present_for_any_character_configuration() {
        let universe = universe_ctx("P", Some("G"));
        let character = character_ctx("Mira");
        let prompt =
            compose_system_prompt(Some(&universe), Some(&character)).expect("prompt expected");
        assert!(prompt.contains("NARRATIVE INSTRUCTIONS"));
        assert!(prompt.contains("Name: Mira"));
    }

    #[test]
    fn character_details_include_optional_fields_and_reminder() {
        let character = character_ctx("Mira");
        let prompt = compose_system_prompt(None, Some(&character)).expect("prompt expected");
        assert!(prompt.contains("Personality: Curious"));
        assert!(!prompt.contains("Backstory:"));
        assert!(prompt.contains("Special Abilities: Cartography, Stargazing"));
        assert!(prompt.contains("the user is playing as Mira"));
    }

    #[test]
    fn character_only_chat_gets_no_narrative_block() {
        let character = character_ctx("Mira");
        let prompt = compose_system_prompt(None, Some(&character)).expect("prompt expected");
        assert!(!prompt.contains("NARRATIVE INSTRUCTIONS"));
    }

    #[test]
    fn composition_is_deterministic() {
        let universe = universe_ctx("P", Some("G"));
        let character = character_ctx("Mira");
        let first = compose_system_prompt(Some(&universe), Some(&character));
        let second = compose_system_prompt(Some(&universe), Some(&character));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn assembler_re_reads_storage_on_every_call() {
        let universe_id = UniverseId::new();
        let now = Utc::now();

        let mut universe_repo = MockUniverseRepo::new();
        universe_repo.expect_get().times(2).returning(move |_| {
            Ok(Some(Universe::new(
                "Bobiverse",
                "Space exploration",
                "P",
                now,
            )))
        });

        let universes = Arc::new(Universes::new(
            Arc::new(universe_repo),
            Arc::new(MockCustomUniverseRepo::new()),
        ));
        let characters = Arc::new(Characters::new(
            Arc::new(MockCharacterRepo::new()),
            Arc::new(MockCustomCharacterRepo::new()),
        ));
        let assembler = ContextAssembler::new(universes, characters);

        let chat = Chat::new(UserId::new(), "New Adventure", now)
            .with_universe(taleforge_domain::UniverseRef::Standard(universe_id));

        let first = assembler
            .build_system_prompt(&chat)
            .await
            .expect("assembly should succeed");
        let second = assembler
            .build_system_prompt(&chat)
            .await
            .expect("assembly should succeed");
        assert_eq!(first, second);
        assert!(first.is_some());
    }
}

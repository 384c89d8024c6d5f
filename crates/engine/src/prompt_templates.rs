//! Configurable LLM prompt templates used by the engine.
//!
//! Every template has a hard-coded default and an environment-variable
//! override derived from its key (`TALEFORGE_PROMPT_<KEY>`, dots become
//! underscores).

/// All prompt template keys as constants.
pub mod keys {
    // === Narration ===
    /// Fixed instruction block appended after a universe's own prompt.
    pub const NARRATIVE_INSTRUCTIONS: &str = "narration.instructions";

    // === Title back-fill ===
    /// System prompt for deriving a chat title from the first message.
    pub const TITLE_SYSTEM_PROMPT: &str = "title.system_prompt";

    // === Creation form suggestions ===
    /// Character description generation prompt.
    pub const SUGGESTION_CHARACTER_DESCRIPTION: &str = "suggestion.character_description";
    /// Character personality generation prompt.
    pub const SUGGESTION_CHARACTER_PERSONALITY: &str = "suggestion.character_personality";
    /// Character backstory generation prompt.
    pub const SUGGESTION_CHARACTER_BACKSTORY: &str = "suggestion.character_backstory";
    /// Character special abilities generation prompt.
    pub const SUGGESTION_CHARACTER_ABILITIES: &str = "suggestion.character_abilities";
    /// Universe description generation prompt.
    pub const SUGGESTION_UNIVERSE_DESCRIPTION: &str = "suggestion.universe_description";
    /// Universe system prompt generation prompt.
    pub const SUGGESTION_UNIVERSE_SYSTEM_PROMPT: &str = "suggestion.universe_system_prompt";
    /// Universe game instructions generation prompt.
    pub const SUGGESTION_UNIVERSE_GAME_INSTRUCTIONS: &str =
        "suggestion.universe_game_instructions";
}

/// Default values for all prompt templates.
pub mod defaults {
    /// Narration rules for every universe-backed chat.
    pub const NARRATIVE_INSTRUCTIONS: &str = "\
IMPORTANT NARRATIVE INSTRUCTIONS:
- Narrate in the third person as an omniscient storyteller.
- The user's messages represent their character's speech and actions; \
react to them explicitly and weave them into the story.
- Keep the plot moving forward continuously; never stall or repeat.
- End most responses with 2-4 numbered action choices the character \
could take next.
- Use vivid, sensory, immersive descriptions of scenes and events.";

    /// Title derivation instructions.
    pub const TITLE_SYSTEM_PROMPT: &str = "\
Generate a very short, concise title (3-5 words) for a chat that starts \
with the following message. Respond with only the title, no quotes or \
punctuation.";

    pub const SUGGESTION_CHARACTER_DESCRIPTION: &str = "\
You are a creative writing assistant. Generate a detailed, vivid character \
description based on the character name provided. Focus on physical \
appearance, clothing, and notable features. Keep it concise but engaging, \
around 2-3 sentences.";

    pub const SUGGESTION_CHARACTER_PERSONALITY: &str = "\
You are a creative writing assistant. Generate a character personality \
description focusing on traits, quirks, motivations, and behavioral \
patterns. Keep it concise but insightful, around 2-3 sentences.";

    pub const SUGGESTION_CHARACTER_BACKSTORY: &str = "\
You are a creative writing assistant. Generate an interesting backstory \
for a character, including key life events, origin, and formative \
experiences. Keep it engaging and around 3-4 sentences.";

    pub const SUGGESTION_CHARACTER_ABILITIES: &str = "\
You are a creative writing assistant. Generate 3-5 special abilities or \
skills for a character. Each ability should be on a new line and be \
concise (2-4 words each). Focus on abilities that fit the character's \
description and personality.";

    pub const SUGGESTION_UNIVERSE_DESCRIPTION: &str = "\
You are a creative writing assistant. Generate a rich, immersive universe \
description based on the universe name. Focus on the setting, atmosphere, \
key features, and what makes this world unique. Keep it engaging, around \
3-4 sentences.";

    pub const SUGGESTION_UNIVERSE_SYSTEM_PROMPT: &str = "\
You are an expert at creating AI system prompts for roleplay scenarios. \
Generate a system prompt that defines how an AI should behave when \
roleplaying in this universe. Focus on tone, style, knowledge constraints, \
and behavioral guidelines. Keep it clear and actionable.";

    pub const SUGGESTION_UNIVERSE_GAME_INSTRUCTIONS: &str = "\
You are a game design expert. Generate specific game mechanics, rules, or \
instructions for gameplay in this universe. Focus on how interactions \
work, what players can do, any special mechanics or constraints. Keep it \
clear and organized.";
}

/// Resolve a template: environment override first, default otherwise.
pub fn resolve(key: &str) -> String {
    if let Ok(value) = std::env::var(env_var_for(key)) {
        if !value.trim().is_empty() {
            return value;
        }
    }
    default_for(key).to_string()
}

/// Environment variable name for a template key.
pub fn env_var_for(key: &str) -> String {
    format!(
        "TALEFORGE_PROMPT_{}",
        key.replace('.', "_").to_ascii_uppercase()
    )
}

fn default_for(key: &str) -> &'static str {
    match key {
        keys::NARRATIVE_INSTRUCTIONS => defaults::NARRATIVE_INSTRUCTIONS,
        keys::TITLE_SYSTEM_PROMPT => defaults::TITLE_SYSTEM_PROMPT,
        keys::SUGGESTION_CHARACTER_DESCRIPTION => defaults::SUGGESTION_CHARACTER_DESCRIPTION,
        keys::SUGGESTION_CHARACTER_PERSONALITY => defaults::SUGGESTION_CHARACTER_PERSONALITY,
        keys::SUGGESTION_CHARACTER_BACKSTORY => defaults::SUGGESTION_CHARACTER_BACKSTORY,
        keys::SUGGESTION_CHARACTER_ABILITIES => defaults::SUGGESTION_CHARACTER_ABILITIES,
        keys::SUGGESTION_UNIVERSE_DESCRIPTION => defaults::SUGGESTION_UNIVERSE_DESCRIPTION,
        keys::SUGGESTION_UNIVERSE_SYSTEM_PROMPT => defaults::SUGGESTION_UNIVERSE_SYSTEM_PROMPT,
        keys::SUGGESTION_UNIVERSE_GAME_INSTRUCTIONS => {
            defaults::SUGGESTION_UNIVERSE_GAME_INSTRUCTIONS
        }
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_defaults_for_known_keys() {
        let text = resolve(keys::NARRATIVE_INSTRUCTIONS);
        assert!(text.contains("third person"));
        assert!(text.contains("2-4 numbered action choices"));
    }

    #[test]
    fn env_var_names_are_derived_from_keys() {
        assert_eq!(
            env_var_for(keys::TITLE_SYSTEM_PROMPT),
            "TALEFORGE_PROMPT_TITLE_SYSTEM_PROMPT"
        );
    }
}

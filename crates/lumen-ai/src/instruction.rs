//! System instruction and provider configuration built from a
//! [`Configuration`].

use lumen_common::{Configuration, Message, Personality};

use crate::provider::{Content, GenerationConfig, Part};
use crate::AiError;

/// Always the first segment of the system instruction.
pub const IDENTITY_DIRECTIVE: &str = "You are Lumen, a helpful AI assistant. \
Format your answers in Markdown, using headings, lists and fenced code blocks \
where they make the answer easier to read.";

/// Thinking budget sent when extended reasoning is on but no budget was given.
pub const DEFAULT_REASONING_BUDGET: u32 = 1024;

/// Tone directive for a personality. Empty for [`Personality::None`].
pub fn tone_directive(personality: Personality) -> &'static str {
    match personality {
        Personality::Professional => {
            "Keep a formal, professional tone. Be precise and concise, and avoid slang and jokes."
        }
        Personality::Friendly => {
            "Be warm and approachable. Use a conversational tone and invite follow-up questions."
        }
        Personality::Creative => {
            "Be imaginative and expressive. Offer original ideas, vivid language and unexpected angles."
        }
        Personality::Humorous => {
            "Keep things light and witty. Use tasteful humor while still giving accurate answers."
        }
        Personality::Strict => {
            "Be direct and rigorous. Answer only what was asked, point out mistakes plainly and skip pleasantries."
        }
        Personality::None => "",
    }
}

/// Identity, tone and custom instruction joined by blank lines. Blank
/// segments are left out; the custom instruction is otherwise kept verbatim.
pub fn build_system_instruction(config: &Configuration) -> String {
    let custom = config.custom_instruction.as_deref().unwrap_or("");
    [IDENTITY_DIRECTIVE, tone_directive(config.personality), custom]
        .into_iter()
        .filter(|segment| !segment.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_generation_config(config: &Configuration) -> Result<GenerationConfig, AiError> {
    let generation = GenerationConfig::new(
        build_system_instruction(config),
        config.temperature,
        config.max_output_tokens,
    )?;
    if !config.extended_reasoning_enabled {
        return Ok(generation);
    }
    let budget = config
        .extended_reasoning_budget
        .unwrap_or(DEFAULT_REASONING_BUDGET);
    Ok(generation.with_thinking_budget(budget))
}

/// One content item per message, role kept, single text part.
pub fn history_to_contents(history: &[Message]) -> Vec<Content> {
    history
        .iter()
        .map(|msg| Content {
            role: msg.role,
            parts: vec![Part::text(msg.text.clone())],
        })
        .collect()
}

use crate::errors::BotError;

/// Upper bound is exclusive: 999 characters is the longest admitted prompt.
pub const MAX_PROMPT_CHARS: usize = 1000;

/// Reject empty or oversized prompts before any backend call. Pure, no state.
pub fn validate_prompt(text: &str) -> Result<(), BotError> {
    if text.is_empty() {
        return Err(BotError::InvalidPrompt("prompt is empty".to_string()));
    }
    let chars = text.chars().count();
    if chars >= MAX_PROMPT_CHARS {
        return Err(BotError::InvalidPrompt(format!(
            "prompt is {} characters, the limit is {}",
            chars,
            MAX_PROMPT_CHARS - 1
        )));
    }
    Ok(())
}

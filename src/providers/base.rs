use crate::utils::media::Attachment;
use async_trait::async_trait;

/// One turn of a conversation, in backend-native role vocabulary
/// ("user" / "model").
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: String,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".into(),
            text: text.into(),
        }
    }
}

/// Backend-native conversation handle. The generative API keeps no
/// server-side conversation state, so the full turn list travels with every
/// request; each [`crate::session::Session`] owns exactly one of these.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    pub turns: Vec<Turn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// The narrow capability the orchestrator needs from a generative backend:
/// start a conversation, send a prompt within one, or run a single-shot
/// multimodal generation. Swappable for a fake in tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Open a fresh conversation handle. Backends that seed a system
    /// preamble can override this.
    fn start_conversation(&self) -> ChatHistory {
        ChatHistory::new()
    }

    /// Send `prompt` as the next turn of `history`. On success the
    /// implementation appends both the user turn and the model's reply turn
    /// to `history`; on failure `history` is left unchanged.
    async fn send(&self, history: &mut ChatHistory, prompt: &str) -> anyhow::Result<String>;

    /// Single-shot generation from an attachment plus a text prompt. No
    /// conversation state is read or written.
    async fn generate_once(&self, attachment: &Attachment, prompt: &str)
    -> anyhow::Result<String>;

    fn model_name(&self) -> String;

    fn set_model(&self, model: String);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_starts_empty() {
        let history = ChatHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn turns_accumulate_in_order() {
        let mut history = ChatHistory::new();
        history.push(Turn::user("hello"));
        history.push(Turn::model("hi there"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.turns[0].role, "user");
        assert_eq!(history.turns[0].text, "hello");
        assert_eq!(history.turns[1].role, "model");
    }
}

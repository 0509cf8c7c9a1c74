pub mod base;
pub mod gemini;

pub use base::{ChatBackend, ChatHistory, Turn};
pub use gemini::GeminiProvider;

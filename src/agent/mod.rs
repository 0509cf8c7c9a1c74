mod orchestrator;
mod prompt;
mod quota;

pub use orchestrator::Orchestrator;
pub use prompt::{MAX_PROMPT_CHARS, validate_prompt};
pub use quota::{QuotaGate, spawn_daily_reset};

use thiserror::Error;

/// Typed error hierarchy for gembot.
///
/// Use at module boundaries (orchestrator entry points, attachment
/// classification, config validation). Internal/leaf functions can continue
/// using `anyhow::Result` — the `Internal` variant allows seamless conversion
/// via the `?` operator.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Daily request limit has been reached")]
    QuotaExceeded,

    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Failed to process file: {0}")]
    FileProcessing(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results using [`BotError`].
pub type BotResult<T> = std::result::Result<T, BotError>;

impl BotError {
    /// Render a single user-facing reply string. Every failure the
    /// orchestrator can produce maps to something safe to echo back to the
    /// chat platform; internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            BotError::QuotaExceeded => {
                "The daily request limit has been reached. Come back tomorrow.".to_string()
            }
            BotError::InvalidPrompt(reason) => format!("I can't use that prompt: {}", reason),
            BotError::UnsupportedFileType(mime) => {
                format!("That file type is not supported ({}).", mime)
            }
            BotError::FileProcessing(detail) => {
                format!("I couldn't process that file: {}", detail)
            }
            BotError::Backend(detail) => format!("There was an exception. {}", detail),
            BotError::Config(_) | BotError::Internal(_) => {
                "Something went wrong on my end.".to_string()
            }
        }
    }

    /// Whether the user may simply resubmit a corrected request.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            BotError::InvalidPrompt(_)
                | BotError::UnsupportedFileType(_)
                | BotError::FileProcessing(_)
        )
    }
}

use crate::config::Config;
use crate::errors::BotError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn get_config_path() -> PathBuf {
    std::env::var("GEMBOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"))
}

/// Load configuration from a JSON file (missing file means all defaults),
/// then apply environment overrides for the credential and owner.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let default_path = get_config_path();
    let path = config_path.unwrap_or(default_path.as_path());

    let mut config = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON from {}", path.display()))?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(BotError::Config)
        .with_context(|| format!("Invalid config at {}", path.display()))?;

    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            config.api_key = key;
        }
    }
    if let Ok(owner) = std::env::var("GEMBOT_OWNER") {
        if !owner.is_empty() {
            config.owner = owner;
        }
    }
}

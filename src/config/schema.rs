use serde::{Deserialize, Serialize};

/// Bot configuration. Everything has a sensible default so a missing or
/// partial config file still produces a runnable bot; the API credential is
/// sourced from the environment by the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,

    /// Number of backend requests served per day before the quota gate closes.
    #[serde(default = "default_daily_limit", rename = "dailyLimit")]
    pub daily_limit: u32,

    /// Hour of day (UTC, 0-23) at which the daily quota counter resets.
    #[serde(default, rename = "quotaResetHour")]
    pub quota_reset_hour: u32,

    /// Idle minutes after which a conversation session is evicted.
    #[serde(default = "default_session_ttl", rename = "sessionTtlMinutes")]
    pub session_ttl_minutes: u64,

    /// Seconds between eviction sweeps.
    #[serde(default = "default_sweep_interval", rename = "sweepIntervalSecs")]
    pub sweep_interval_secs: u64,

    /// Identity allowed to run administrative commands.
    #[serde(default)]
    pub owner: String,

    /// Backend API key. Normally left empty in the file and supplied via the
    /// `GEMINI_API_KEY` environment variable.
    #[serde(default, rename = "apiKey")]
    pub api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            daily_limit: default_daily_limit(),
            quota_reset_hour: 0,
            session_ttl_minutes: default_session_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            owner: String::new(),
            api_key: String::new(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_daily_limit() -> u32 {
    1500
}

fn default_session_ttl() -> u64 {
    120
}

fn default_sweep_interval() -> u64 {
    3600
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.daily_limit == 0 {
            return Err("dailyLimit must be at least 1".to_string());
        }
        if self.quota_reset_hour > 23 {
            return Err(format!(
                "quotaResetHour must be 0-23, got {}",
                self.quota_reset_hour
            ));
        }
        if self.session_ttl_minutes == 0 {
            return Err("sessionTtlMinutes must be at least 1".to_string());
        }
        Ok(())
    }
}

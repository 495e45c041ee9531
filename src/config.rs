use dotenv::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TIMEOUT_MS: u64 = 45_000;
pub const DEFAULT_HISTORY_LIMIT: usize = 12;
pub const DEFAULT_API_KEY_ENV_VAR: &str = "DEEPSEEK_API_KEY";

/// Process-wide settings, read once at startup and passed into the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub api_url: String,
    pub model: String,
    pub timeout_ms: u64,
    pub history_limit: usize,
    /// Name of the environment variable holding the bearer token. The token
    /// itself is looked up lazily on each call.
    pub api_key_env_var: String,
    pub temperature: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            api_key_env_var: DEFAULT_API_KEY_ENV_VAR.to_string(),
            temperature: 0.6,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();
        Self {
            api_url: env::var("DEEPSEEK_API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_url),
            model: env::var("DEEPSEEK_MODEL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.model),
            timeout_ms: parse_timeout_ms(env::var("DEEPSEEK_TIMEOUT_MS").ok().as_deref()),
            history_limit: parse_history_limit(env::var("CONTEXT_HISTORY_LIMIT").ok().as_deref()),
            ..defaults
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn parse_timeout_ms(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_TIMEOUT_MS)
}

fn parse_history_limit(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
}

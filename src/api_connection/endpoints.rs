use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::PlannerConfig;

#[derive(Clone, Debug)]
pub enum Provider {
    DeepSeek {
        /// Name of the environment variable holding the key, not the key.
        api_key: String,
        api_url: String,
        model: String,
        temperature: f32,
        timeout: Duration,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub index: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: Option<u32>,
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Option<ChatCompletionUsage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the model said anything.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .filter(|content| !content.trim().is_empty())
    }
}

impl Provider {
    pub fn deepseek(config: &PlannerConfig) -> Self {
        Self::DeepSeek {
            api_key: config.api_key_env_var.clone(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: config.timeout(),
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::DeepSeek { model, .. } => model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_content_skips_blank_answers() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "  "}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_content(), None);

        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "{\"meals\": []}"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_content(), Some("{\"meals\": []}"));

        let empty: ChatCompletionResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.first_content(), None);
    }
}

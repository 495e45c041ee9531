use async_trait::async_trait;
use dotenv::dotenv;
use log::{debug, error, info};
use reqwest::Client;
use std::env;
use std::error::Error;
use std::fmt;

use super::endpoints::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Provider};
use crate::prompt::SYSTEM_PROMPT;
use crate::request::HistoryMessage;

#[derive(Debug)]
pub enum ApiConnectionError {
    MissingApiKey(String),
    Timeout,
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    EmptyContent,
}

impl fmt::Display for ApiConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiConnectionError::MissingApiKey(key_name) => {
                write!(f, "API key not found in environment: {}", key_name)
            }
            ApiConnectionError::Timeout => write!(f, "Request timed out"),
            ApiConnectionError::NetworkError(err) => write!(f, "Network error: {}", err),
            ApiConnectionError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            ApiConnectionError::ApiError { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
            ApiConnectionError::EmptyContent => write!(f, "API returned no content"),
        }
    }
}

impl Error for ApiConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiConnectionError::NetworkError(err) => Some(err),
            ApiConnectionError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiConnectionError::Timeout
        } else {
            ApiConnectionError::NetworkError(err)
        }
    }
}

impl From<serde_json::Error> for ApiConnectionError {
    fn from(err: serde_json::Error) -> Self {
        ApiConnectionError::SerializationError(err)
    }
}

/// Text-completion collaborator that turns a prompt plus conversation
/// history into raw plan text.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        history: &[HistoryMessage],
    ) -> Result<String, ApiConnectionError>;
}

/// `[system, ...history, user prompt]`.
pub fn build_messages(prompt: &str, history: &[HistoryMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new("system", SYSTEM_PROMPT));
    messages.extend(
        history
            .iter()
            .map(|turn| ChatMessage::new(turn.role.as_str(), turn.content.clone())),
    );
    messages.push(ChatMessage::new("user", prompt));
    messages
}

impl Provider {
    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        match self {
            Provider::DeepSeek {
                api_key: api_key_env_var_name,
                api_url,
                timeout,
                ..
            } => {
                dotenv().ok();
                let actual_api_key = env::var(api_key_env_var_name)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| ApiConnectionError::MissingApiKey(api_key_env_var_name.clone()))?;

                let client = Client::builder().timeout(*timeout).build()?;

                info!(
                    "Sending chat completion to {} ({} messages)",
                    api_url,
                    request.messages.len()
                );
                let response = client
                    .post(api_url)
                    .bearer_auth(actual_api_key)
                    .header("Content-Type", "application/json")
                    .json(&request)
                    .send()
                    .await?;

                if response.status().is_success() {
                    let chat_response = response.json::<ChatCompletionResponse>().await?;
                    Ok(chat_response)
                } else {
                    let status = response.status();
                    let error_body = response.text().await.unwrap_or_default();
                    error!("Chat completion failed with {}: {}", status, error_body);
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}

#[async_trait]
impl PlanGenerator for Provider {
    async fn generate(
        &self,
        prompt: &str,
        history: &[HistoryMessage],
    ) -> Result<String, ApiConnectionError> {
        let temperature = match self {
            Provider::DeepSeek { temperature, .. } => *temperature,
        };
        let request = ChatCompletionRequest {
            model: self.model().to_string(),
            messages: build_messages(prompt, history),
            temperature: Some(temperature),
            max_tokens: None,
        };

        let response = self.call_chat_completion(request).await?;
        let content = response.first_content().ok_or(ApiConnectionError::EmptyContent)?;
        debug!("Raw completion content:\n---\n{}\n---", content);
        Ok(content.to_string())
    }
}

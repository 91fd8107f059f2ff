use serde::{Deserialize, Serialize};

use crate::core::{ServiceError, ServiceResult};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user",
            content: content.into(),
        }
    }
}

/// Completion parameters. Legal documents want low temperature and room
/// for long output.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        CompletionOptions {
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            max_tokens: 4000,
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Chat-completion client over the OpenAI HTTP API.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    options: CompletionOptions,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let options = CompletionOptions {
            model: model.into(),
            ..CompletionOptions::default()
        };
        OpenAiClient {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            options,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send(&self, messages: &[ChatMessage], stream: bool) -> ServiceResult<reqwest::Response> {
        let body = ChatCompletionRequest {
            model: &self.options.model,
            messages,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
            stream,
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::upstream("openai", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Upstream {
                service: "openai",
                message: format!("HTTP {}: {}", status, text),
            });
        }

        Ok(resp)
    }

    /// Await the full completion and return its text content.
    pub async fn chat(&self, messages: &[ChatMessage]) -> ServiceResult<String> {
        let resp = self.send(messages, false).await?;
        let completion: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::upstream("openai", e))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ServiceError::Upstream {
                service: "openai",
                message: "completion contained no content".to_string(),
            })
    }

    /// Start a streaming completion. The returned response carries the raw
    /// upstream SSE body; `sse::relay_stream` re-frames it for clients.
    pub async fn chat_stream(&self, messages: &[ChatMessage]) -> ServiceResult<reqwest::Response> {
        self.send(messages, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_serialize_with_role_and_content() {
        let message = ChatMessage::system("You are a legal document writer.");
        let value = serde_json::to_value(&message).expect("serializable");
        assert_eq!(value["role"], "system");
        assert_eq!(value["content"], "You are a legal document writer.");
    }

    #[test]
    fn default_options_match_production_settings() {
        let options = CompletionOptions::default();
        assert_eq!(options.model, "gpt-4o");
        assert_eq!(options.temperature, 0.3);
        assert_eq!(options.max_tokens, 4000);
    }
}

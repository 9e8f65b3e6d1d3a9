//! LLM Client: the single seam between the pipeline and any text-generation backend.
//!
//! ARCHITECTURAL RULE: no stage may call a provider API directly.
//! Stages depend on `dyn TextGenerator` only; `build_generator` picks the
//! backend once at startup from whichever API key is configured.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::LlmSettings;

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod parse;
pub mod prompts;
#[cfg(test)]
pub mod testing;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;
pub(crate) const MAX_TOKENS: u32 = 2048;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Could not find structured content in reply: {0}")]
    NoStructuredContent(String),

    #[error("Invalid LLM reply: {0}")]
    Invalid(String),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error(
        "No LLM provider configured. Set GROQ_API_KEY, GOOGLE_API_KEY, OPENAI_API_KEY, or ANTHROPIC_API_KEY"
    )]
    NotConfigured,
}

/// Supported text-generation backends, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Groq,
    Google,
    OpenAi,
    Anthropic,
}

impl Provider {
    /// First provider with a key set wins.
    pub const DETECTION_ORDER: [Provider; 4] = [
        Provider::Groq,
        Provider::Google,
        Provider::OpenAi,
        Provider::Anthropic,
    ];

    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::Google => "GOOGLE_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.3-70b-versatile",
            Provider::Google => "gemini-flash-latest",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-haiku-20240307",
        }
    }
}

/// Single-shot text completion capability.
///
/// `generate_structured` is provided on top of `generate`: it strips code
/// fences and decodes strictly, scanning for an embedded JSON value only as a
/// last resort. Use [`generate_json`] to decode straight into a schema type.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError>;

    async fn generate_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<Value, LlmError> {
        let text = self.generate(system_prompt, user_prompt, temperature).await?;
        parse::decode_structured(&text)
    }
}

/// Calls the generator and decodes the reply into `T`.
pub async fn generate_json<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    system_prompt: &str,
    user_prompt: &str,
    temperature: f32,
) -> Result<T, LlmError> {
    let text = generator
        .generate(system_prompt, user_prompt, temperature)
        .await?;
    parse::decode(&text)
}

/// Builds the generator for the configured provider.
/// Returns `LlmError::NotConfigured` when no API key was found.
pub fn build_generator(
    settings: Option<&LlmSettings>,
) -> Result<Arc<dyn TextGenerator>, LlmError> {
    let settings = settings.ok_or(LlmError::NotConfigured)?;
    let model = settings
        .model
        .clone()
        .unwrap_or_else(|| settings.provider.default_model().to_string());

    info!(
        "Selected LLM provider {:?} (model: {model})",
        settings.provider
    );

    let generator: Arc<dyn TextGenerator> = match settings.provider {
        Provider::Groq => Arc::new(openai::ChatCompletionsClient::groq(
            settings.api_key.clone(),
            model,
        )),
        Provider::OpenAi => Arc::new(openai::ChatCompletionsClient::openai(
            settings.api_key.clone(),
            model,
        )),
        Provider::Google => Arc::new(gemini::GeminiClient::new(settings.api_key.clone(), model)),
        Provider::Anthropic => Arc::new(anthropic::AnthropicClient::new(
            settings.api_key.clone(),
            model,
        )),
    };

    Ok(generator)
}

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to build HTTP client")
}

/// Error envelope shared by the Anthropic, OpenAI-compatible and Gemini APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Sends a request built by `build`, retrying on 429 and 5xx with exponential backoff.
/// Other non-success statuses fail immediately with the provider's error message.
pub(crate) async fn send_with_retry<F>(build: F) -> Result<Response, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "LLM call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        return Ok(response);
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: MAX_RETRIES,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGenerator;
    use serde::Deserialize;

    #[test]
    fn test_build_generator_without_settings_is_not_configured() {
        let result = build_generator(None);
        assert!(matches!(result, Err(LlmError::NotConfigured)));
    }

    #[test]
    fn test_build_generator_selects_configured_provider() {
        for provider in Provider::DETECTION_ORDER {
            let settings = LlmSettings {
                provider,
                api_key: "test-key".to_string(),
                model: None,
            };
            let generator = build_generator(Some(&settings)).unwrap();
            assert_eq!(generator.provider(), provider);
        }
    }

    #[test]
    fn test_provider_key_vars_are_distinct() {
        let vars: std::collections::HashSet<_> = Provider::DETECTION_ORDER
            .iter()
            .map(|p| p.api_key_var())
            .collect();
        assert_eq!(vars.len(), 4);
    }

    #[tokio::test]
    async fn test_generate_structured_strips_fences() {
        let generator = ScriptedGenerator::new(vec!["```json\n{\"confidence\": 0.7}\n```"]);
        let value = generator.generate_structured("sys", "user", 0.3).await.unwrap();
        assert_eq!(value["confidence"], 0.7);
    }

    #[tokio::test]
    async fn test_generate_json_decodes_typed_value() {
        #[derive(Deserialize)]
        struct Reply {
            reasoning: String,
        }

        let generator =
            ScriptedGenerator::new(vec!["Sure! {\"reasoning\": \"core skill\"} Hope this helps."]);
        let reply: Reply = generate_json(&generator, "sys", "user", 0.3).await.unwrap();
        assert_eq!(reply.reasoning, "core skill");
    }

    #[tokio::test]
    async fn test_generate_structured_fails_without_json() {
        let generator = ScriptedGenerator::new(vec!["I cannot help with that."]);
        let result = generator.generate_structured("sys", "user", 0.3).await;
        assert!(matches!(result, Err(LlmError::NoStructuredContent(_))));
    }
}

//! OpenAI-compatible chat completions backend. Serves both OpenAI and Groq,
//! which expose the same `/chat/completions` contract.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::{
    http_client, send_with_retry, LlmError, Provider, TextGenerator, MAX_TOKENS,
};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    api_key: String,
    base_url: &'static str,
    model: String,
    provider: Provider,
}

impl ChatCompletionsClient {
    pub fn openai(api_key: String, model: String) -> Self {
        Self::with_base(api_key, model, OPENAI_BASE_URL, Provider::OpenAi)
    }

    pub fn groq(api_key: String, model: String) -> Self {
        Self::with_base(api_key, model, GROQ_BASE_URL, Provider::Groq)
    }

    fn with_base(api_key: String, model: String, base_url: &'static str, provider: Provider) -> Self {
        Self {
            client: http_client(),
            api_key,
            base_url,
            model,
            provider,
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature,
            max_tokens: MAX_TOKENS,
        };
        let url = format!("{}/chat/completions", self.base_url);

        let response = send_with_retry(|| {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
        })
        .await?;

        let body: ChatResponse = response.json().await?;

        if let Some(usage) = &body.usage {
            debug!(
                "{:?} call succeeded: prompt_tokens={}, completion_tokens={}",
                self.provider, usage.prompt_tokens, usage.completion_tokens
            );
        }

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

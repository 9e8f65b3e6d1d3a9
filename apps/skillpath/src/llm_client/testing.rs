//! In-memory `TextGenerator` doubles for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{LlmError, Provider, TextGenerator};

type Responder = Box<dyn Fn(&str, &str) -> Result<String, LlmError> + Send + Sync>;

enum Script {
    Queue(Mutex<VecDeque<Result<String, LlmError>>>),
    Responder(Responder),
}

/// Replays canned replies in order, or answers through a closure over
/// `(system_prompt, user_prompt)`. Records every user prompt it receives.
pub struct ScriptedGenerator {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<&str>) -> Self {
        Self::from_results(replies.into_iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn from_results(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Script::Queue(Mutex::new(replies.into())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str, &str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            script: Script::Responder(Box::new(responder)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails like an unreachable backend.
    pub fn failing() -> Self {
        Self::from_fn(|_, _| {
            Err(LlmError::Api {
                status: 503,
                message: "backend unavailable".to_string(),
            })
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _temperature: f32,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(user_prompt.to_string());
        match &self.script {
            Script::Queue(replies) => replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent)),
            Script::Responder(responder) => responder(system_prompt, user_prompt),
        }
    }
}

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

use crate::llm_client::Provider;

/// Credentials for the selected text-generation backend.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: Provider,
    pub api_key: String,
    /// Overrides the provider's default model when set (`LLM_MODEL`).
    pub model: Option<String>,
}

/// Tunables for the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub job_posting_limit: usize,
    pub max_resources_per_skill: usize,
    pub daily_minutes: u32,
    pub days_ahead: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            job_posting_limit: 5,
            max_resources_per_skill: 3,
            daily_minutes: 30,
            days_ahead: 14,
        }
    }
}

/// Application configuration loaded from environment variables.
/// No provider key is required: without one the pipeline runs in fallback mode.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: Option<LlmSettings>,
    pub pipeline: PipelineSettings,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = PipelineSettings::default();

        let pipeline = PipelineSettings {
            job_posting_limit: parse_or(&lookup, "JOB_POSTING_LIMIT", defaults.job_posting_limit)?,
            max_resources_per_skill: parse_or(
                &lookup,
                "MAX_RESOURCES_PER_SKILL",
                defaults.max_resources_per_skill,
            )?,
            daily_minutes: parse_or(&lookup, "DAILY_MINUTES", defaults.daily_minutes)?,
            days_ahead: parse_or(&lookup, "DAYS_AHEAD", defaults.days_ahead)?,
        };

        if pipeline.daily_minutes == 0 {
            bail!("DAILY_MINUTES must be greater than zero");
        }

        Ok(Config {
            llm: detect_llm(&lookup),
            pipeline,
            port: parse_or(&lookup, "PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Picks the first provider (in `Provider::DETECTION_ORDER`) whose key is set and non-empty.
fn detect_llm(lookup: &impl Fn(&str) -> Option<String>) -> Option<LlmSettings> {
    Provider::DETECTION_ORDER.into_iter().find_map(|provider| {
        lookup(provider.api_key_var())
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| LlmSettings {
                provider,
                api_key,
                model: lookup("LLM_MODEL").filter(|m| !m.trim().is_empty()),
            })
    })
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Environment variable '{key}' is invalid ({raw}): {e}")),
        None => Ok(default),
    }
}

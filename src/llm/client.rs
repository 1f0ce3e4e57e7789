//! Anthropic Messages API client used for bullet generation

use crate::config::LlmConfig;
use crate::error::{Result, TailorError};
use crate::llm::prompts::{BulletPromptParams, PromptTemplates};
use crate::processing::bullets::{BulletGenerator, BulletRequest};
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl MessagesResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    max_retries: u32,
    templates: PromptTemplates,
    bullet_range: (usize, usize),
}

impl LlmClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            templates: PromptTemplates::default(),
            bullet_range: (4, 6),
        })
    }

    /// Client configured from the environment; `None` when generation is
    /// disabled or the API key variable is unset.
    pub fn from_env(config: &LlmConfig) -> Result<Option<Self>> {
        if !config.enabled {
            info!("LLM bullet generation disabled in configuration");
            return Ok(None);
        }
        match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(Some(Self::new(config, key)?)),
            _ => {
                warn!("{} is not set; using baseline bullets", config.api_key_env);
                Ok(None)
            }
        }
    }

    pub fn with_bullet_range(mut self, min: usize, max: usize) -> Self {
        self.bullet_range = (min, max);
        self
    }

    /// Send a single-turn prompt and return the first text block.
    /// Transport errors, 429 and 5xx responses are retried up to `max_retries` times.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request_body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<TailorError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * attempt as u64);
                warn!("LLM call attempt {} failed, retrying after {}ms", attempt, delay.as_millis());
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(TailorError::Network(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = Some(TailorError::Llm(format!("status {}: {}", status, body)));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(TailorError::Llm(format!("status {}: {}", status, message)));
            }

            let parsed: MessagesResponse = response.json().await?;
            debug!("LLM call succeeded on attempt {}", attempt + 1);
            return parsed
                .text()
                .map(str::to_string)
                .ok_or_else(|| TailorError::Llm("response contained no text block".to_string()));
        }

        Err(last_error.unwrap_or_else(|| TailorError::Llm("no attempts made".to_string())))
    }
}

impl BulletGenerator for LlmClient {
    async fn generate(&self, request: &BulletRequest<'_>) -> Result<String> {
        let prompt = self.templates.render_role_bullets(&BulletPromptParams {
            role: request.role.heading.clone(),
            job_title: request.job_title.to_string(),
            company: request.company.to_string(),
            min_bullets: self.bullet_range.0,
            max_bullets: self.bullet_range.1,
            baseline_bullets: request.role.bullets.clone(),
        });
        self.complete(&prompt).await
    }
}

//! OpenAI-compatible chat completions provider.
//!
//! Works against api.openai.com and any server exposing the same
//! `/chat/completions` endpoint (llama-server, vLLM, hosted gateways).

use std::collections::BTreeMap;

use async_trait::async_trait;
use errata_core::{Explanation, RuntimeContext};
use serde::{Deserialize, Serialize};

use crate::provider::{analyze_with, ChatBackend, Completion};
use crate::{AIProvider, ProviderError, ProviderSettings, RetryPolicy};

pub struct OpenAiProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

/// OpenAI-compatible chat completion request.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// Chat message in OpenAI format.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI-compatible chat completion response.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

impl OpenAiProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }
}

#[async_trait]
impl AIProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn is_available(&self) -> bool {
        self.settings.is_available()
    }

    async fn analyze(&self, context: &RuntimeContext) -> Explanation {
        analyze_with(self, context).await
    }
}

#[async_trait]
impl ChatBackend for OpenAiProvider {
    fn model(&self) -> &str {
        &self.settings.model
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.settings.retry
    }

    /// Uses the `/chat/completions` endpoint.
    async fn complete(&self, system: &str, user: &str) -> Result<Completion, ProviderError> {
        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.2,
            max_tokens: self.settings.max_tokens,
            stream: false,
        };

        let mut builder = self
            .client
            .post(self.settings.endpoint("chat/completions"))
            .json(&request);
        if !self.settings.api_key.is_empty() {
            builder = builder.bearer_auth(&self.settings.api_key);
        }

        let response = builder.send().await.map_err(|e| {
            ProviderError::from_transport(e, &self.settings.base_url, self.settings.timeout_secs)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, &body, None));
        }

        let completion: ChatCompletionResponse = response.json().await?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        let mut usage = BTreeMap::new();
        if let Some(u) = completion.usage {
            usage.insert("prompt_tokens", u.prompt_tokens);
            usage.insert("completion_tokens", u.completion_tokens);
            usage.insert("total_tokens", u.total_tokens);
        }

        Ok(Completion { text, usage })
    }
}

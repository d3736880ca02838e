//! Ollama provider for local LLM inference.

use std::collections::BTreeMap;

use async_trait::async_trait;
use errata_core::{Explanation, RuntimeContext};
use serde::{Deserialize, Serialize};

use crate::provider::{analyze_with, ChatBackend, Completion};
use crate::{AIProvider, ProviderError, ProviderSettings, RetryPolicy};

pub struct OllamaProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

/// Request to Ollama generate API.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    format: &'a str,
    options: OllamaOptions,
}

/// Ollama generation options.
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: i64,
}

/// Response from Ollama generate API.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

impl OllamaProvider {
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
impl AIProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn is_available(&self) -> bool {
        self.settings.is_available()
    }

    async fn analyze(&self, context: &RuntimeContext) -> Explanation {
        analyze_with(self, context).await
    }
}

#[async_trait]
impl ChatBackend for OllamaProvider {
    fn model(&self) -> &str {
        &self.settings.model
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.settings.retry
    }

    async fn complete(&self, system: &str, user: &str) -> Result<Completion, ProviderError> {
        let request = OllamaRequest {
            model: &self.settings.model,
            prompt: user,
            system,
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: 0.1,
                num_predict: i64::from(self.settings.max_tokens),
            },
        };

        let response = self
            .client
            .post(self.settings.endpoint("api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ProviderError::from_transport(e, &self.settings.base_url, self.settings.timeout_secs)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, &body, None));
        }

        let response: OllamaResponse = response.json().await?;

        if let Some(error) = response.error {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error,
            });
        }
        if response.response.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let mut usage = BTreeMap::new();
        if let Some(count) = response.prompt_eval_count {
            usage.insert("prompt_eval_count", count);
        }
        if let Some(count) = response.eval_count {
            usage.insert("eval_count", count);
        }

        Ok(Completion {
            text: response.response,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderKind;
    use errata_core::{ExceptionInfo, SourceContext};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> RuntimeContext {
        RuntimeContext::new(
            ExceptionInfo::new("OutOfBoundsException", "No route named 'home'").at("r.php", 2),
            SourceContext::empty(),
        )
    }

    #[test]
    fn test_available_without_key() {
        let provider = OllamaProvider::new(ProviderSettings::new(ProviderKind::Ollama)).unwrap();
        assert!(provider.is_available());
        assert_eq!(provider.model(), "deepseek-coder-v2");
        assert_eq!(provider.settings().base_url, "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_generate_records_eval_counts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "qwen2.5-coder:7b", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "{\"message\": \"Missing route\", \"cause\": \"No route is named home\", \"suggestions\": [\"Define the route\"], \"confidence\": 0.7}",
                "done": true,
                "prompt_eval_count": 310,
                "eval_count": 64
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings = ProviderSettings::new(ProviderKind::Ollama)
            .with_base_url(server.uri())
            .with_model("qwen2.5-coder:7b");
        let e = OllamaProvider::new(settings).unwrap().analyze(&ctx()).await;

        assert_eq!(e.message, "Missing route");
        assert_eq!(e.metadata["prompt_eval_count"], 310);
        assert_eq!(e.metadata["eval_count"], 64);
        assert_eq!(e.metadata["model"], "qwen2.5-coder:7b");
    }

    #[tokio::test]
    async fn test_error_field_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "", "error": "model not loaded"})),
            )
            .mount(&server)
            .await;

        let settings = ProviderSettings::new(ProviderKind::Ollama).with_base_url(server.uri());
        let e = OllamaProvider::new(settings).unwrap().analyze(&ctx()).await;
        assert!(e.is_empty());
    }
}

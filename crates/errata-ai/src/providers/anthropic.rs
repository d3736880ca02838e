//! Anthropic Messages API provider.

use std::collections::BTreeMap;

use async_trait::async_trait;
use errata_core::{Explanation, RuntimeContext};
use serde::{Deserialize, Serialize};

use crate::provider::{analyze_with, ChatBackend, Completion};
use crate::{AIProvider, ProviderError, ProviderSettings, RetryPolicy};

const API_VERSION: &str = "2023-06-01";

/// Anthropic's "overloaded" status, treated like a rate limit.
const OVERLOADED: u16 = 529;

/// Claude via the Anthropic Messages API.
pub struct AnthropicProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

/// Request to the Messages API.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the Messages API.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

impl AnthropicProvider {
    /// Create a new provider.
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
impl AIProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn is_available(&self) -> bool {
        self.settings.is_available()
    }

    async fn analyze(&self, context: &RuntimeContext) -> Explanation {
        analyze_with(self, context).await
    }
}

#[async_trait]
impl ChatBackend for AnthropicProvider {
    fn model(&self) -> &str {
        &self.settings.model
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.settings.retry
    }

    async fn complete(&self, system: &str, user: &str) -> Result<Completion, ProviderError> {
        if self.settings.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let request = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(self.settings.endpoint("v1/messages"))
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ProviderError::from_transport(e, &self.settings.base_url, self.settings.timeout_secs)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, &body, Some(OVERLOADED)));
        }

        let response: MessagesResponse = response.json().await?;

        // Extract text from response
        let text = response
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let mut usage = BTreeMap::new();
        if let Some(u) = response.usage {
            usage.insert("input_tokens", u.input_tokens);
            usage.insert("output_tokens", u.output_tokens);
        }

        Ok(Completion { text, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderKind;
    use errata_core::{ExceptionInfo, SourceContext};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> AnthropicProvider {
        let settings = ProviderSettings::new(ProviderKind::Anthropic)
            .with_api_key("sk-ant-test")
            .with_base_url(server.uri())
            .with_retry(RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::ZERO,
            });
        AnthropicProvider::new(settings).unwrap()
    }

    fn ctx() -> RuntimeContext {
        RuntimeContext::new(
            ExceptionInfo::new("RuntimeException", "Cache store unavailable").at("c.php", 9),
            SourceContext::empty(),
        )
    }

    #[tokio::test]
    async fn test_successful_analysis_records_usage() {
        let server = MockServer::start().await;
        let answer = json!({
            "message": "Redis is down",
            "cause": "The cache store could not connect",
            "suggestions": ["Start Redis"],
            "confidence": 0.75
        });
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": answer.to_string()}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 120, "output_tokens": 40}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let e = provider(&server).analyze(&ctx()).await;
        assert_eq!(e.message, "Redis is down");
        assert_eq!(e.confidence, 0.75);
        assert_eq!(e.provider(), Some("anthropic"));
        assert_eq!(e.metadata["input_tokens"], 120);
        assert_eq!(e.metadata["output_tokens"], 40);
        assert_eq!(e.metadata["model"], ProviderKind::Anthropic.default_model());
    }

    #[tokio::test]
    async fn test_overloaded_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529))
            .expect(3)
            .mount(&server)
            .await;

        assert!(provider(&server).analyze(&ctx()).await.is_empty());
    }

    #[tokio::test]
    async fn test_auth_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(provider(&server).analyze(&ctx()).await.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_without_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let settings = ProviderSettings::new(ProviderKind::Anthropic).with_base_url(server.uri());
        let provider = AnthropicProvider::new(settings).unwrap();
        assert!(!provider.is_available());
        assert!(provider.analyze(&ctx()).await.is_empty());
    }
}

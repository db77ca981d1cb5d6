//! OpenAI-compatible chat completions provider

use super::openai_stream::openai_sse_stream;
use crate::config::ProviderConfig;
use crate::error::{ChatError, ChatResult};
use crate::llm::provider::{CompletionProvider, CompletionRequest, CompletionResponse};
use crate::llm::streaming::CompletionStream;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::instrument;

const PROVIDER_NAME: &str = "openai";

/// Client for any endpoint speaking the OpenAI `/chat/completions` protocol
pub struct OpenAiProvider {
    config: ProviderConfig,
    http_client: Client,
}

impl OpenAiProvider {
    /// Create a provider with its own HTTP client
    pub fn new(config: ProviderConfig) -> ChatResult<Self> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ChatError::llm(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(config, http_client))
    }

    /// Create a provider sharing an existing HTTP client
    pub fn with_client(config: ProviderConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Build the JSON body for a request
    pub(crate) fn request_body(request: &CompletionRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();
        let sampling = &request.sampling;

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": sampling.max_tokens,
            "temperature": sampling.temperature,
            "top_p": sampling.top_p,
            "n": sampling.n,
            "presence_penalty": sampling.presence_penalty,
            "frequency_penalty": sampling.frequency_penalty,
            "stream": request.stream,
        });
        if !sampling.stop.is_empty() {
            body["stop"] = json!(sampling.stop);
        }
        body
    }

    /// Parse a non-streamed response body
    pub(crate) fn parse_response(body: &Value) -> ChatResult<CompletionResponse> {
        if let Some(error) = body.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown error");
            return Err(ChatError::llm(format!("OpenAI API error: {}", message)));
        }

        let choice = body["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .ok_or_else(|| ChatError::llm("OpenAI response has no choices"))?;

        Ok(CompletionResponse {
            content: choice["message"]["content"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            model: body["model"].as_str().map(str::to_string),
            finish_reason: choice["finish_reason"].as_str().map(str::to_string),
        })
    }

    async fn send(&self, body: &Value) -> ChatResult<reqwest::Response> {
        let mut request = self.http_client.post(self.endpoint()).json(body);

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }
        if let Some(org) = &self.config.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChatError::llm(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatError::llm_with_status(
                format!("OpenAI API error (status {}): {}", status, error_text),
                PROVIDER_NAME,
                status.as_u16(),
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, request), fields(model = %request.model), level = "debug")]
    async fn complete(&self, request: CompletionRequest) -> ChatResult<CompletionResponse> {
        let body = Self::request_body(&CompletionRequest {
            stream: false,
            ..request
        });
        let response = self.send(&body).await?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| ChatError::llm(format!("Failed to parse OpenAI response: {}", e)))?;
        Self::parse_response(&json)
    }

    #[instrument(skip(self, request), fields(model = %request.model), level = "debug")]
    async fn stream_complete(&self, request: CompletionRequest) -> ChatResult<CompletionStream> {
        let body = Self::request_body(&CompletionRequest {
            stream: true,
            ..request
        });
        let response = self.send(&body).await?;
        Ok(openai_sse_stream(response.bytes_stream()))
    }
}

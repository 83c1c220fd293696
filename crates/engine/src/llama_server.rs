//! LlamaServer Engine - completion calls against a running llama.cpp `llama-server`

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sfcore_ai_conversation::{GenerationRequest, TextGenerator};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("llama-server request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("llama-server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("llama-server returned no content")]
    EmptyOutput,
}

/// Options for the llama-server engine
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Base URL llama-server listens on, tanpa trailing slash.
    pub base_url: String,

    /// Model name sent with each request. `None` lets the server use its loaded model.
    pub model: Option<String>,

    /// Batas waktu per request (detik). Generasi di CPU bisa lambat.
    pub timeout_seconds: u64,

    /// Prepend the prompt to the returned text, like pipelines that echo
    /// their input. Reply extraction relies on the assistant marker either way.
    pub return_full_text: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            model: None,
            timeout_seconds: 120,
            return_full_text: true,
        }
    }
}

/// Request payload for `POST /completion`
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tokens_predicted: Option<u32>,
}

/// Text generation through llama-server's native completion endpoint
pub struct LlamaServerEngine {
    client: Client,
    opts: EngineOptions,
}

impl LlamaServerEngine {
    pub fn new(opts: EngineOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(opts.timeout_seconds))
            .build()
            .context("failed to build HTTP client")?;
        info!(
            "LlamaServer engine ready: {} (model: {})",
            opts.base_url,
            opts.model.as_deref().unwrap_or("<server default>")
        );
        Ok(Self { client, opts })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.opts
    }

    fn completion_url(&self) -> String {
        format!("{}/completion", self.opts.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, EngineError> {
        let t_start = Instant::now();
        let model = request.model.as_deref().or(self.opts.model.as_deref());

        let body = CompletionRequest {
            prompt: &request.prompt,
            n_predict: request.max_tokens,
            temperature: request.temperature,
            top_k: request.top_k,
            top_p: request.top_p,
            stream: false,
            model,
        };

        debug!(
            "Completion request: prompt {} bytes, n_predict {}",
            request.prompt.len(),
            request.max_tokens
        );

        let response = self.client.post(self.completion_url()).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status { status, body });
        }

        let completion: CompletionResponse = response.json().await?;
        if completion.content.trim().is_empty() {
            return Err(EngineError::EmptyOutput);
        }

        info!(
            "[metrics] tokens: {}, time: {} ms",
            completion.tokens_predicted.unwrap_or(0),
            t_start.elapsed().as_millis()
        );

        if self.opts.return_full_text {
            Ok(format!("{}{}", request.prompt, completion.content))
        } else {
            Ok(completion.content)
        }
    }
}

#[async_trait]
impl TextGenerator for LlamaServerEngine {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        Ok(self.complete(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfcore_ai_conversation::SamplingParams;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine_for(server: &MockServer, return_full_text: bool) -> LlamaServerEngine {
        LlamaServerEngine::new(EngineOptions {
            base_url: server.uri(),
            return_full_text,
            ..EngineOptions::default()
        })
        .unwrap()
    }

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest::new(prompt.to_string(), SamplingParams::default())
    }

    #[tokio::test]
    async fn test_generate_echoes_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completion"))
            .and(body_partial_json(serde_json::json!({
                "prompt": "User: Hi\nAssistant:",
                "n_predict": 80,
                "top_k": 50,
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": " Hello there",
                "tokens_predicted": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let engine = engine_for(&server, true);
        let output = engine.generate(&request("User: Hi\nAssistant:")).await.unwrap();
        assert_eq!(output, "User: Hi\nAssistant: Hello there");
    }

    #[tokio::test]
    async fn test_generate_continuation_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completion"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": " Hello there"
            })))
            .mount(&server)
            .await;

        let engine = engine_for(&server, false);
        let output = engine.generate(&request("User: Hi\nAssistant:")).await.unwrap();
        assert_eq!(output, " Hello there");
    }

    #[tokio::test]
    async fn test_model_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completion"))
            .and(body_partial_json(serde_json::json!({ "model": "distilgpt2" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": "ok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let engine = engine_for(&server, false);
        let req = request("Hi").with_model("distilgpt2");
        assert_eq!(engine.generate(&req).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completion"))
            .respond_with(ResponseTemplate::new(503).set_body_string("loading model"))
            .mount(&server)
            .await;

        let engine = engine_for(&server, true);
        let err = engine.complete(&request("Hi")).await.unwrap_err();
        match err {
            EngineError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "loading model");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completion"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": "  "
            })))
            .mount(&server)
            .await;

        let engine = engine_for(&server, true);
        assert!(matches!(
            engine.complete(&request("Hi")).await,
            Err(EngineError::EmptyOutput)
        ));
    }
}

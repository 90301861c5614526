//! Inference client - talks to the remote text-to-action service
//!
//! Construction probes `/health` and fails if the service is unreachable or
//! has no model loaded, so the relay never starts without inference.

use crate::backend::InferenceBackend;
use crate::config::{normalize_base_url, InferenceConfig, DEFAULT_INFERENCE_URL};
use crate::error::{http_error, Error, ErrorKind, Result};
use crate::types::{ModelInfo, ParsedCommand, StatsSnapshot, StatusContext};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

pub const TIMEOUT_MESSAGE: &str = "Timeout - try again";
pub const UNREACHABLE_MESSAGE: &str = "Cannot reach inference server";

/// Body of `GET /health`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub model_info: serde_json::Map<String, serde_json::Value>,
}

impl HealthReport {
    pub fn gpu_name(&self) -> &str {
        self.model_info
            .get("gpu_name")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
    }
}

/// HTTP client for the inference service
#[derive(Debug)]
pub struct InferenceClient {
    client: Client,
    base_url: String,
    config: InferenceConfig,
}

impl InferenceClient {
    /// Build the client and verify the service is ready to translate.
    pub async fn connect(config: &InferenceConfig) -> Result<Self> {
        let raw = config.base_url.as_deref().unwrap_or(DEFAULT_INFERENCE_URL);
        let base_url = normalize_base_url(raw);
        info!(url = %base_url, "inference server url");

        let client = Client::builder()
            .build()
            .map_err(|e| http_error(e, "inference::connect"))?;

        let this = Self {
            client,
            base_url,
            config: config.clone(),
        };

        let report = this
            .health_check()
            .await
            .map_err(|e| e.with_operation("inference::connect"))?;
        info!(gpu = report.gpu_name(), "connected to inference server");

        Ok(this)
    }

    /// Probe `/health`; an unloaded model is an error.
    pub async fn health_check(&self) -> Result<HealthReport> {
        info!("testing connection to inference server");

        let report: HealthReport = self
            .get_json("/health", self.config.health_timeout, "inference::health_check")
            .await
            .inspect_err(|err| match err.kind() {
                ErrorKind::ConnectionFailed => error!(url = %self.base_url, "cannot connect to inference server"),
                _ => error!(%err, "inference connection error"),
            })?;

        if !report.model_loaded {
            warn!("model not loaded on inference server");
            return Err(Error::service_unavailable("model not loaded on inference server")
                .with_operation("inference::health_check")
                .with_context("url", self.base_url.as_str()));
        }

        Ok(report)
    }

    async fn request_parse(&self, text: &str, context: Option<&StatusContext>) -> Result<ParsedCommand> {
        let body = ParseRequest {
            text,
            context: match context {
                Some(status) => ParseContext::Status(status),
                None => ParseContext::Empty {},
            },
        };

        self.client
            .post(self.url("/parse"))
            .timeout(self.config.parse_timeout)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| http_error(e, "inference::parse"))?
            .json::<ParsedCommand>()
            .await
            .map_err(|e| http_error(e, "inference::parse"))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        timeout: Duration,
        operation: &'static str,
    ) -> Result<T> {
        self.client
            .get(self.url(path))
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| http_error(e, operation))?
            .json::<T>()
            .await
            .map_err(|e| http_error(e, operation))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl InferenceBackend for InferenceClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn parse(&self, text: &str, context: Option<&StatusContext>) -> ParsedCommand {
        info!(text, "sending to inference server");
        let started = Instant::now();

        match self.request_parse(text, context).await {
            Ok(command) => {
                info!("total time: {:.2}s", started.elapsed().as_secs_f64());
                info!(action = ?command.action, "inference result");
                command
            }
            Err(err) => {
                let message = match err.kind() {
                    ErrorKind::Timeout => {
                        error!("request timeout - inference server might still be processing");
                        TIMEOUT_MESSAGE.to_string()
                    }
                    ErrorKind::ConnectionFailed => {
                        error!("lost connection to inference server");
                        UNREACHABLE_MESSAGE.to_string()
                    }
                    _ => {
                        error!(%err, "parse failed");
                        err.message().to_string()
                    }
                };
                ParsedCommand::failed(message)
            }
        }
    }

    async fn model_info(&self) -> ModelInfo {
        self.get_json("/info", self.config.query_timeout, "inference::model_info")
            .await
            .unwrap_or_else(|err| {
                error!(%err, "error getting model info");
                ModelInfo::new()
            })
    }

    async fn stats(&self) -> StatsSnapshot {
        self.get_json("/stats", self.config.query_timeout, "inference::stats")
            .await
            .unwrap_or_else(|err| {
                error!(%err, "error getting stats");
                StatsSnapshot::new()
            })
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
    context: ParseContext<'a>,
}

/// The service expects `{}` rather than `null` when there is no context.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ParseContext<'a> {
    Status(&'a StatusContext),
    Empty {},
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request_without_context() {
        let body = ParseRequest {
            text: "mine 5 diamonds",
            context: ParseContext::Empty {},
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"text": "mine 5 diamonds", "context": {}})
        );
    }

    #[test]
    fn test_parse_request_with_context() {
        let status = StatusContext {
            health: 20,
            food: 18,
            position: "(1, 2, 3)".into(),
        };
        let body = ParseRequest {
            text: "eat",
            context: ParseContext::Status(&status),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"text": "eat", "context": {"health": 20, "food": 18, "position": "(1, 2, 3)"}})
        );
    }

    #[test]
    fn test_gpu_name_fallback() {
        let report: HealthReport = serde_json::from_value(json!({"model_loaded": true})).unwrap();
        assert_eq!(report.gpu_name(), "Unknown");

        let report: HealthReport = serde_json::from_value(json!({
            "model_loaded": true,
            "model_info": {"gpu_name": "Tesla T4"}
        }))
        .unwrap();
        assert_eq!(report.gpu_name(), "Tesla T4");
    }
}

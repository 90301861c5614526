//! Agent client - relays actions to the agent control server

use crate::backend::AgentBackend;
use crate::config::{normalize_base_url, AgentConfig};
use crate::error::{http_error, is_connect_failure, Result};
use crate::types::{AgentStatus, CommandResult, Params};
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

pub const CANNOT_CONNECT_MESSAGE: &str = "Cannot connect to agent control server";

/// HTTP client for the agent control server
#[derive(Debug)]
pub struct AgentClient {
    client: Client,
    base_url: String,
    config: AgentConfig,
}

impl AgentClient {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| http_error(e, "agent::new"))?;
        let base_url = normalize_base_url(&config.base_url);
        info!(url = %base_url, "agent control server url");

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
        })
    }

    async fn request_command(&self, action: &str, params: &Params) -> Result<CommandResult> {
        self.client
            .post(format!("{}/command", self.base_url))
            .timeout(self.config.command_timeout)
            .json(&CommandRequest { action, params })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| http_error(e, "agent::send_command"))?
            .json::<CommandResult>()
            .await
            .map_err(|e| http_error(e, "agent::send_command"))
    }

    async fn request_status(&self) -> Result<AgentStatus> {
        let body = self
            .client
            .get(format!("{}/status", self.base_url))
            .timeout(self.config.status_timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| http_error(e, "agent::status"))?
            .json::<serde_json::Value>()
            .await
            .map_err(|e| http_error(e, "agent::status"))?;

        AgentStatus::from_value(body).map_err(|e| e.with_operation("agent::status"))
    }
}

impl AgentBackend for AgentClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send_command(&self, action: &str, params: Params) -> CommandResult {
        info!(action, "sending to agent");

        match self.request_command(action, &params).await {
            Ok(result) => {
                if result.success {
                    info!("{}", result.message.as_deref().unwrap_or("Done"));
                } else {
                    warn!("{}", result.error.as_deref().unwrap_or("Failed"));
                }
                result
            }
            Err(err) if is_connect_failure(&err) => {
                error!(url = %self.base_url, "{}", CANNOT_CONNECT_MESSAGE);
                CommandResult::failure(CANNOT_CONNECT_MESSAGE)
            }
            Err(err) => {
                error!(%err, transient = err.is_transient(), "agent command failed");
                CommandResult::failure(format!("Agent error: {}", err.message()))
            }
        }
    }

    async fn status(&self) -> Result<AgentStatus> {
        self.request_status()
            .await
            .inspect_err(|err| error!(%err, "error getting agent status"))
    }
}

#[derive(Debug, Serialize)]
struct CommandRequest<'a> {
    action: &'a str,
    params: &'a Params,
}

//! Backend traits
//!
//! The dispatcher and the interactive session only talk to these traits.
//! [`InferenceClient`](crate::InferenceClient) and [`AgentClient`](crate::AgentClient)
//! implement them over HTTP; [`crate::mock`] implements them in memory.
//!
//! Only `AgentBackend::status` returns a `Result`. The other calls fold every
//! failure into their return value so a turn can always report back.

use crate::error::Result;
use crate::types::{AgentStatus, CommandResult, ModelInfo, Params, ParsedCommand, StatsSnapshot, StatusContext};

/// Translates operator text into structured actions
#[allow(async_fn_in_trait)]
pub trait InferenceBackend: Send + Sync {
    /// Normalized base URL, for display
    fn base_url(&self) -> &str;

    /// Translate `text`. Failures come back as a command with `error` set.
    async fn parse(&self, text: &str, context: Option<&StatusContext>) -> ParsedCommand;

    /// Model details; empty on failure
    async fn model_info(&self) -> ModelInfo;

    /// Resource usage; empty on failure
    async fn stats(&self) -> StatsSnapshot;
}

/// Executes actions on the agent and reports its state
#[allow(async_fn_in_trait)]
pub trait AgentBackend: Send + Sync {
    fn base_url(&self) -> &str;

    /// Relay one action. Failures come back with `success: false`.
    async fn send_command(&self, action: &str, params: Params) -> CommandResult;

    /// Current health, food and position
    async fn status(&self) -> Result<AgentStatus>;
}

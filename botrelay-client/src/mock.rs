//! In-memory backends with scripted responses.
//!
//! Both mocks record every call so tests can assert on what would have gone
//! over the wire.

use crate::backend::{AgentBackend, InferenceBackend};
use crate::error::{Error, Result};
use crate::types::{AgentStatus, CommandResult, ModelInfo, Params, ParsedCommand, StatsSnapshot, StatusContext};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock inference service.
///
/// `parse` pops scripted commands in order; once they run out it answers with
/// a translation error.
pub struct MockInference {
    responses: Mutex<VecDeque<ParsedCommand>>,
    calls: Mutex<Vec<(String, Option<StatusContext>)>>,
    model_info: ModelInfo,
    stats: StatsSnapshot,
    queries: AtomicUsize,
}

impl Default for MockInference {
    fn default() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            model_info: ModelInfo::new(),
            stats: StatsSnapshot::new(),
            queries: AtomicUsize::new(0),
        }
    }
}

impl MockInference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, command: ParsedCommand) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(command);
        self
    }

    pub fn with_model_info(mut self, info: ModelInfo) -> Self {
        self.model_info = info;
        self
    }

    pub fn with_stats(mut self, stats: StatsSnapshot) -> Self {
        self.stats = stats;
        self
    }

    /// Every `parse` call as `(text, context)`
    pub fn calls(&self) -> Vec<(String, Option<StatusContext>)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of `parse`, `model_info` and `stats` calls
    pub fn request_count(&self) -> usize {
        self.calls().len() + self.queries.load(Ordering::Relaxed)
    }
}

impl InferenceBackend for MockInference {
    fn base_url(&self) -> &str {
        "mock://inference"
    }

    async fn parse(&self, text: &str, context: Option<&StatusContext>) -> ParsedCommand {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((text.to_string(), context.cloned()));

        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| ParsedCommand::failed("no scripted response"))
    }

    async fn model_info(&self) -> ModelInfo {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.model_info.clone()
    }

    async fn stats(&self) -> StatsSnapshot {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.stats.clone()
    }
}

/// Mock agent control server
pub struct MockAgent {
    status: std::result::Result<AgentStatus, String>,
    result: CommandResult,
    commands: Mutex<Vec<(String, Params)>>,
    status_calls: AtomicUsize,
}

impl Default for MockAgent {
    fn default() -> Self {
        Self {
            status: Ok(AgentStatus::default()),
            result: CommandResult::success("Done"),
            commands: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
        }
    }
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = Ok(status);
        self
    }

    /// Make every `status` call fail with `error`
    pub fn with_status_error(mut self, error: impl Into<String>) -> Self {
        self.status = Err(error.into());
        self
    }

    /// Result returned for every command
    pub fn with_result(mut self, result: CommandResult) -> Self {
        self.result = result;
        self
    }

    /// Every dispatched command as `(action, params)`
    pub fn commands(&self) -> Vec<(String, Params)> {
        self.commands.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::Relaxed)
    }

    /// Number of requests of any kind
    pub fn request_count(&self) -> usize {
        self.commands().len() + self.status_calls()
    }
}

impl AgentBackend for MockAgent {
    fn base_url(&self) -> &str {
        "mock://agent"
    }

    async fn send_command(&self, action: &str, params: Params) -> CommandResult {
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((action.to_string(), params));
        self.result.clone()
    }

    async fn status(&self) -> Result<AgentStatus> {
        self.status_calls.fetch_add(1, Ordering::Relaxed);
        self.status
            .clone()
            .map_err(|e| Error::agent_failed(e).with_operation("mock_agent::status"))
    }
}

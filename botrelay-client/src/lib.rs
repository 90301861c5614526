//! # Botrelay Client
//!
//! HTTP clients for the two services botrelay sits between.
//!
//! ## Core Concepts
//! - **Inference client**: turns operator text into a structured action
//!   (`/health`, `/parse`, `/info`, `/stats`)
//! - **Agent client**: relays actions to the agent control server and reads its
//!   live status (`/command`, `/status`)
//! - **Backends**: trait seams the dispatcher is generic over, with in-memory
//!   mocks for tests
//! - **Config**: explicit, immutable configuration built once at startup

pub mod agent;
pub mod backend;
pub mod config;
pub mod error;
pub mod inference;
pub mod mock;
pub mod types;

pub use agent::AgentClient;
pub use backend::{AgentBackend, InferenceBackend};
pub use config::{normalize_base_url, AgentConfig, InferenceConfig, RelayConfig};
pub use error::{Error, ErrorKind, Result};
pub use inference::{HealthReport, InferenceClient};
pub use mock::{MockAgent, MockInference};
pub use types::{
    AgentStatus, CommandResult, ModelInfo, Params, ParsedCommand, StatsSnapshot, StatusContext,
};

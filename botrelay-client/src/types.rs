//! Request and response shapes shared by both services.
//!
//! Everything here lives for a single turn; nothing is cached.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Action parameters, passed through to the agent untouched
pub type Params = serde_json::Map<String, Value>;

/// Free-form `/info` payload
pub type ModelInfo = BTreeMap<String, Value>;

/// Free-form `/stats` payload; floating-point values are gigabytes
pub type StatsSnapshot = BTreeMap<String, Value>;

const FULL_VITAL: i64 = 20;

// ============================================================================
// Agent status
// ============================================================================

/// Live agent status from `GET /status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    #[serde(default = "full_vital", deserialize_with = "vital")]
    pub health: i64,
    #[serde(default = "full_vital", deserialize_with = "vital")]
    pub food: i64,
    #[serde(default = "unknown_position")]
    pub position: Value,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self {
            health: FULL_VITAL,
            food: FULL_VITAL,
            position: unknown_position(),
        }
    }
}

impl AgentStatus {
    /// Decode a `/status` body.
    ///
    /// The server reports failures in-band as `{"error": ...}`; the presence of
    /// the key alone marks the body as a failure.
    pub fn from_value(value: Value) -> Result<Self> {
        if let Some(error) = value.get("error") {
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(Error::agent_failed(message).with_operation("agent_status::from_value"));
        }

        serde_json::from_value(value).map_err(|e| {
            Error::parse_failed(e.to_string())
                .with_operation("agent_status::from_value")
                .set_source(e)
        })
    }

    /// Position as display text. `{x, y, z}` objects become `(x, y, z)`.
    pub fn position_label(&self) -> String {
        match &self.position {
            Value::String(s) => s.clone(),
            Value::Object(map) => match (map.get("x"), map.get("y"), map.get("z")) {
                (Some(x), Some(y), Some(z)) if x.is_number() && y.is_number() && z.is_number() => {
                    format!("({}, {}, {})", x, y, z)
                }
                _ => self.position.to_string(),
            },
            other => other.to_string(),
        }
    }

    /// Snapshot handed to the inference service as grounding context
    pub fn to_context(&self) -> StatusContext {
        StatusContext {
            health: self.health,
            food: self.food,
            position: self.position_label(),
        }
    }
}

fn full_vital() -> i64 {
    FULL_VITAL
}

fn unknown_position() -> Value {
    Value::String("unknown".into())
}

/// Health and food arrive as integers or floats (half hearts); null means full.
fn vital<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(FULL_VITAL),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| serde::de::Error::custom("vital out of range")),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number, got {}",
            other
        ))),
    }
}

/// Inference context built from a successful status read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusContext {
    pub health: i64,
    pub food: i64,
    pub position: String,
}

// ============================================================================
// Parsed command
// ============================================================================

/// Structured action returned by `POST /parse`.
///
/// A non-empty `error` invalidates the command whatever `action` says.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "params_or_empty")]
    pub params: Params,
    #[serde(default)]
    pub error: Option<String>,
}

impl ParsedCommand {
    pub fn new(action: impl Into<String>, params: Params) -> Self {
        Self {
            action: Some(action.into()),
            params,
            error: None,
        }
    }

    /// A translation failure: no action, empty params
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            action: None,
            params: Params::new(),
            error: Some(error.into()),
        }
    }

    /// The error text, if any. Empty strings are treated as no error.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// Split into the action and its params. Empty strings are treated as no action.
    pub fn into_action(self) -> Option<(String, Params)> {
        let action = self.action.filter(|a| !a.is_empty())?;
        Some((action, self.params))
    }
}

fn params_or_empty<'de, D>(deserializer: D) -> std::result::Result<Params, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Params>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Command result
// ============================================================================

/// Outcome of a turn, as reported by `POST /command` or produced locally
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A failure carrying only an error, as the clients produce
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }

    /// A failure with an operator-facing message alongside the error
    pub fn rejected(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            error: Some(error.into()),
        }
    }
}

//! Interactive session - reads operator lines and prints turn results

use botrelay_client::{AgentBackend, AgentStatus, CommandResult, InferenceBackend, Result};
use botrelay_dispatch::Dispatcher;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

const FAREWELL: &str = "Goodbye!";
const UNREADABLE_INPUT: &str = "input is not valid UTF-8";

const HELP: &str = "
Commands:
  Mining:   \"mine 5 diamonds\"
  Crafting: \"craft a pickaxe\"
  Fighting: \"kill zombies\"
  Farming:  \"harvest wheat\"
  status    agent health, food and position
  model     inference model info
  stats     inference GPU stats
  help      this text
  quit      leave the session
";

/// Words the session handles itself instead of sending for translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaCommand {
    Quit,
    Status,
    Model,
    Stats,
    Help,
}

impl MetaCommand {
    fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => Some(Self::Quit),
            "status" => Some(Self::Status),
            "model" => Some(Self::Model),
            "stats" => Some(Self::Stats),
            "help" | "?" | "h" => Some(Self::Help),
            _ => None,
        }
    }
}

pub struct Session<'a, I, A> {
    dispatcher: &'a Dispatcher<I, A>,
}

impl<'a, I, A> Session<'a, I, A>
where
    I: InferenceBackend,
    A: AgentBackend,
{
    pub fn new(dispatcher: &'a Dispatcher<I, A>) -> Self {
        Self { dispatcher }
    }

    /// Run until quit, end of input, or `interrupt` resolves during a read.
    ///
    /// A turn already in flight is never cancelled; the interrupt is only
    /// observed at the next prompt.
    pub async fn run<R, W, F>(&self, mut reader: R, out: &mut W, interrupt: F) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        F: Future,
    {
        self.write_banner(out)?;

        let mut buf = Vec::new();
        tokio::pin!(interrupt);

        loop {
            write!(out, "You: ")?;
            out.flush()?;

            buf.clear();
            let read = tokio::select! {
                biased;
                _ = &mut interrupt => 0,
                read = reader.read_until(b'\n', &mut buf) => read?,
            };

            if read == 0 {
                writeln!(out)?;
                writeln!(out, "{}", FAREWELL)?;
                return Ok(());
            }

            // A bad line costs the operator that line only.
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(err) => {
                    warn!(%err, "discarding input line");
                    writeln!(out, "\n❌ Error: {}\n", UNREADABLE_INPUT)?;
                    continue;
                }
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            match MetaCommand::parse(input) {
                Some(MetaCommand::Quit) => {
                    writeln!(out, "{}", FAREWELL)?;
                    return Ok(());
                }
                Some(MetaCommand::Status) => {
                    let status = self.dispatcher.agent().status().await;
                    write_status(out, status.as_ref().ok())?;
                }
                Some(MetaCommand::Model) => {
                    let info = self.dispatcher.inference().model_info().await;
                    write_mapping(out, "Model Info:", &info, false)?;
                }
                Some(MetaCommand::Stats) => {
                    let stats = self.dispatcher.inference().stats().await;
                    write_mapping(out, "Inference GPU Stats:", &stats, true)?;
                }
                Some(MetaCommand::Help) => writeln!(out, "{}", HELP)?,
                None => {
                    let result = self.dispatcher.process_command(input).await;
                    write_result(out, &result)?;
                }
            }
        }
    }

    fn write_banner<W: Write>(&self, out: &mut W) -> Result<()> {
        let rule = "=".repeat(70);
        writeln!(out)?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "Agent command relay")?;
        writeln!(out, "Connected to: {}", self.dispatcher.inference().base_url())?;
        writeln!(out, "{}", rule)?;
        writeln!(out)?;
        writeln!(out, "Examples: 'mine 10 diamonds', 'craft pickaxe', 'fight mobs'")?;
        writeln!(out, "Commands: 'status', 'model', 'stats', 'help', 'quit'")?;
        writeln!(out)?;
        Ok(())
    }
}

/// Print a turn result: the message on success, else message, error or "Failed"
pub fn write_result<W: Write>(out: &mut W, result: &CommandResult) -> Result<()> {
    if result.success {
        let message = result.message.as_deref().unwrap_or("Done");
        writeln!(out, "\n✅ {}\n", message)?;
    } else {
        let message = result
            .message
            .as_deref()
            .or(result.error.as_deref())
            .unwrap_or("Failed");
        writeln!(out, "\n❌ {}\n", message)?;
    }
    Ok(())
}

fn write_status<W: Write>(out: &mut W, status: Option<&AgentStatus>) -> Result<()> {
    let (health, food, position) = match status {
        Some(s) => (
            format!("{}/20", s.health),
            format!("{}/20", s.food),
            s.position_label(),
        ),
        None => ("N/A".to_string(), "N/A".to_string(), "N/A".to_string()),
    };

    writeln!(out)?;
    writeln!(out, "Health: {}", health)?;
    writeln!(out, "   Food: {}", food)?;
    writeln!(out, "   Position: {}", position)?;
    writeln!(out)?;
    Ok(())
}

/// Print `key: value` lines; with `gigabytes`, floats print as `x.xx GB`
fn write_mapping<W: Write>(
    out: &mut W,
    title: &str,
    entries: &BTreeMap<String, Value>,
    gigabytes: bool,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    for (key, value) in entries {
        let rendered = match value {
            Value::Number(n) if gigabytes && n.is_f64() => {
                format!("{:.2} GB", n.as_f64().unwrap_or_default())
            }
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        writeln!(out, "   {}: {}", key, rendered)?;
    }
    writeln!(out)?;
    Ok(())
}

//! # Botrelay CLI
//!
//! Operator console for a game-playing agent. Natural-language commands are
//! translated by a remote inference service and relayed to the agent control
//! server.
//!
//! Usage:
//!   botrelay <inference_url>
//!   COLAB_SERVER_URL=<url> botrelay
//!   botrelay <inference_url> -c "craft a pickaxe"
//!
//! Examples:
//!   botrelay https://abcd-12-34.ngrok.io
//!   botrelay localhost:5000 --agent-url http://localhost:3000
//!   botrelay --env-file relay.env -c "mine 10 diamonds"

mod env;
mod session;

use botrelay_client::config::INFERENCE_URL_VAR;
use botrelay_client::{AgentBackend, AgentClient, Error, InferenceClient, RelayConfig, Result};
use botrelay_dispatch::Dispatcher;
use clap::Parser;
use env::EnvSource;
use session::Session;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "botrelay")]
#[command(author, version, about = "Botrelay - talk to your game agent in plain language")]
struct Cli {
    /// Inference server URL (overrides COLAB_SERVER_URL)
    inference_url: Option<String>,

    /// Agent control server URL (overrides NODE_SERVER_URL)
    #[arg(long)]
    agent_url: Option<String>,

    /// Seconds to wait for a command translation
    #[arg(long, default_value = "30")]
    parse_timeout: u64,

    /// Seconds to wait for the agent to finish an action
    #[arg(long, default_value = "120")]
    command_timeout: u64,

    /// Run a single command and exit instead of starting a session
    #[arg(short, long)]
    command: Option<String>,

    /// Read settings from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn relay_config(&self, env: &EnvSource) -> RelayConfig {
        let mut config = RelayConfig::from_lookup(|key| env.get(key))
            .with_inference_url(self.inference_url.clone())
            .with_agent_url(self.agent_url.clone());
        config.inference.parse_timeout = Duration::from_secs(self.parse_timeout);
        config.agent.command_timeout = Duration::from_secs(self.command_timeout);
        config
    }
}

/// Printed after a startup check fails
fn startup_hint(err: &Error) -> &'static str {
    if err.is_transient() {
        "the server may still be starting, try again in a moment"
    } else {
        "check the server URL and its logs"
    }
}

/// `RUST_LOG` (process or env file) wins; otherwise info, or debug with `--verbose`.
fn init_logging(env: &EnvSource, verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = env
        .get("RUST_LOG")
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli, env: &EnvSource) -> Result<ExitCode> {
    let config = cli.relay_config(env);

    if config.require_inference_url().is_err() {
        error!("{} not set!", INFERENCE_URL_VAR);
        error!("usage:");
        error!("  botrelay <inference_url>");
        error!("  or set: export {}=https://xxxxx.ngrok.io", INFERENCE_URL_VAR);
        return Ok(ExitCode::FAILURE);
    }

    info!("initializing agent command relay");
    info!(agent = %config.agent.base_url, "agent control server");

    let inference = match InferenceClient::connect(&config.inference).await {
        Ok(client) => client,
        Err(err) => {
            error!(%err, hint = startup_hint(&err), "failed to connect to inference server");
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("inference engine ready");

    let agent = AgentClient::new(&config.agent)?;

    info!("checking connections");
    if let Err(err) = agent.status().await {
        error!(%err, hint = startup_hint(&err), "cannot connect to agent control server");
        error!("make sure the agent control server is running at {}", agent.base_url());
        return Ok(ExitCode::FAILURE);
    }
    info!("agent connected");

    let dispatcher = Dispatcher::new(inference, agent);
    let mut stdout = std::io::stdout();

    if let Some(text) = &cli.command {
        let result = dispatcher.process_command(text).await;
        session::write_result(&mut stdout, &result)?;
        return Ok(if result.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    Session::new(&dispatcher)
        .run(stdin, &mut stdout, tokio::signal::ctrl_c())
        .await?;

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = match EnvSource::load(cli.env_file.as_deref()) {
        Ok(env) => env,
        Err(err) => {
            init_logging(&EnvSource::default(), cli.verbose);
            error!(%err, "failed to load environment file");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&env, cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(%err, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(run(&cli, &env)).unwrap_or_else(|err| {
        error!(%err, "relay stopped");
        ExitCode::FAILURE
    });

    // A pending stdin read cannot be cancelled; don't wait for it.
    runtime.shutdown_background();
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use botrelay_client::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_overrides_and_timeouts() {
        let cli = Cli::parse_from([
            "botrelay",
            "abcd.ngrok.io",
            "--agent-url",
            "http://10.0.0.5:3000",
            "--parse-timeout",
            "45",
        ]);
        let config = cli.relay_config(&EnvSource::default());

        assert_eq!(config.inference.base_url.as_deref(), Some("abcd.ngrok.io"));
        assert_eq!(config.agent.base_url, "http://10.0.0.5:3000");
        assert_eq!(config.inference.parse_timeout, Duration::from_secs(45));
        assert_eq!(config.agent.command_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_startup_hint_follows_transience() {
        let refused = Error::new(ErrorKind::ConnectionFailed, "connection refused");
        let no_model = Error::new(ErrorKind::ServiceUnavailable, "model not loaded");
        let bad_status = Error::new(ErrorKind::ApiFailed, "HTTP 404");

        assert!(startup_hint(&refused).contains("try again"));
        assert!(startup_hint(&no_model).contains("try again"));
        assert_eq!(startup_hint(&bad_status), "check the server URL and its logs");
    }

    #[test]
    fn test_one_shot_flag() {
        let cli = Cli::parse_from(["botrelay", "-c", "craft a pickaxe", "localhost:5000"]);
        assert_eq!(cli.command.as_deref(), Some("craft a pickaxe"));
        assert_eq!(cli.inference_url.as_deref(), Some("localhost:5000"));
    }
}

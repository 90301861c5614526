//! Dispatcher implementation - one operator turn from text to agent result

use crate::rules::{ActionRule, CraftingChainRule};
use botrelay_client::{AgentBackend, CommandResult, InferenceBackend, Params, Result};
use tracing::{debug, error, info, warn};

const PROCESSING_FAILED: &str = "Error processing command";

/// Orchestrates the inference service and the agent for each turn
pub struct Dispatcher<I, A> {
    inference: I,
    agent: A,
    /// Applied in registration order to every matching action
    rules: Vec<Box<dyn ActionRule>>,
}

impl<I, A> Dispatcher<I, A>
where
    I: InferenceBackend,
    A: AgentBackend,
{
    /// Create a dispatcher with the default rule set
    pub fn new(inference: I, agent: A) -> Self {
        Self {
            inference,
            agent,
            rules: vec![Box::new(CraftingChainRule)],
        }
    }

    /// Register an extra rule after the defaults
    pub fn with_rule(mut self, rule: impl ActionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn inference(&self) -> &I {
        &self.inference
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Run one turn. Never fails: every error becomes an unsuccessful result.
    pub async fn process_command(&self, text: &str) -> CommandResult {
        info!(text, "operator command");

        match self.run_turn(text).await {
            Ok(result) => result,
            Err(err) => {
                error!(%err, "command processing failed");
                CommandResult::rejected(err.message(), PROCESSING_FAILED)
            }
        }
    }

    async fn run_turn(&self, text: &str) -> Result<CommandResult> {
        // Status only enriches the translation; a failed read is not fatal.
        let context = match self.agent.status().await {
            Ok(status) => Some(status.to_context()),
            Err(err) => {
                warn!(%err, "continuing without agent context");
                None
            }
        };

        let command = self.inference.parse(text, context.as_ref()).await;

        if let Some(reason) = command.error_message() {
            error!(reason, "translation failed");
            return Ok(CommandResult::rejected(
                reason,
                format!("I couldn't understand: {}", text),
            ));
        }

        let Some((action, mut params)) = command.into_action() else {
            return Ok(CommandResult::rejected("No action", "Not sure what to do"));
        };

        self.apply_rules(&action, &mut params)?;

        Ok(self.agent.send_command(&action, params).await)
    }

    fn apply_rules(&self, action: &str, params: &mut Params) -> Result<()> {
        for rule in self.rules.iter().filter(|r| r.applies_to(action)) {
            debug!(rule = rule.name(), action, "applying action rule");
            rule.apply(params)
                .map_err(|e| e.with_operation("dispatcher::apply_rules").with_context("rule", rule.name()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botrelay_client::{
        AgentStatus, Error, MockAgent, MockInference, ParsedCommand, StatusContext,
    };
    use serde_json::json;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_craft_gets_crafting_chain_flag() {
        let inference = MockInference::new()
            .with_response(ParsedCommand::new("craft", params(json!({"item": "pickaxe"}))));
        let dispatcher = Dispatcher::new(inference, MockAgent::new());

        let result = dispatcher.process_command("craft pickaxe").await;

        assert!(result.success);
        assert_eq!(
            dispatcher.agent().commands(),
            vec![(
                "craft".to_string(),
                params(json!({"item": "pickaxe", "useCraftingChain": true}))
            )]
        );
    }

    #[tokio::test]
    async fn test_other_actions_are_untouched() {
        let inference = MockInference::new()
            .with_response(ParsedCommand::new("mine", params(json!({"block": "diamond_ore", "count": 10}))));
        let dispatcher = Dispatcher::new(inference, MockAgent::new());

        dispatcher.process_command("mine 10 diamonds").await;

        let commands = dispatcher.agent().commands();
        assert_eq!(commands[0].0, "mine");
        assert!(!commands[0].1.contains_key("useCraftingChain"));
    }

    #[tokio::test]
    async fn test_translation_error_short_circuits() {
        let inference = MockInference::new().with_response(ParsedCommand {
            action: Some("mine".into()),
            params: Params::new(),
            error: Some("Timeout - try again".into()),
        });
        let dispatcher = Dispatcher::new(inference, MockAgent::new());

        let result = dispatcher.process_command("mine stuff").await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Timeout - try again"));
        assert_eq!(result.message.as_deref(), Some("I couldn't understand: mine stuff"));
        assert!(dispatcher.agent().commands().is_empty());
    }

    #[tokio::test]
    async fn test_missing_action_is_rejected() {
        let inference = MockInference::new().with_response(ParsedCommand::default());
        let dispatcher = Dispatcher::new(inference, MockAgent::new());

        let result = dispatcher.process_command("hmm").await;

        assert_eq!(result, CommandResult::rejected("No action", "Not sure what to do"));
        assert!(dispatcher.agent().commands().is_empty());
    }

    #[tokio::test]
    async fn test_empty_action_is_rejected() {
        let inference = MockInference::new()
            .with_response(ParsedCommand::new("", params(json!({"item": "pickaxe"}))));
        let dispatcher = Dispatcher::new(inference, MockAgent::new());

        let result = dispatcher.process_command("do the thing").await;

        assert_eq!(result, CommandResult::rejected("No action", "Not sure what to do"));
        assert!(dispatcher.agent().commands().is_empty());
    }

    #[tokio::test]
    async fn test_empty_error_does_not_block_dispatch() {
        let inference = MockInference::new().with_response(ParsedCommand {
            action: Some("follow".into()),
            params: Params::new(),
            error: Some(String::new()),
        });
        let dispatcher = Dispatcher::new(inference, MockAgent::new());

        assert!(dispatcher.process_command("follow me").await.success);
        assert_eq!(dispatcher.agent().commands().len(), 1);
    }

    #[tokio::test]
    async fn test_status_becomes_context() {
        let agent = MockAgent::new().with_status(AgentStatus {
            health: 14,
            food: 7,
            position: json!({"x": 3, "y": 64, "z": 9}),
        });
        let inference = MockInference::new().with_response(ParsedCommand::new("eat", Params::new()));
        let dispatcher = Dispatcher::new(inference, agent);

        dispatcher.process_command("eat something").await;

        let calls = dispatcher.inference().calls();
        assert_eq!(
            calls[0].1,
            Some(StatusContext {
                health: 14,
                food: 7,
                position: "(3, 64, 9)".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_status_failure_still_parses() {
        let agent = MockAgent::new().with_status_error("Bot not spawned");
        let inference = MockInference::new().with_response(ParsedCommand::new("mine", Params::new()));
        let dispatcher = Dispatcher::new(inference, agent);

        let result = dispatcher.process_command("mine").await;

        assert!(result.success);
        assert_eq!(dispatcher.inference().calls(), vec![("mine".to_string(), None)]);
        assert_eq!(dispatcher.agent().commands().len(), 1);
    }

    #[tokio::test]
    async fn test_agent_result_is_returned_verbatim() {
        let rejection = CommandResult::failure("No diamonds nearby");
        let agent = MockAgent::new().with_result(rejection.clone());
        let inference = MockInference::new().with_response(ParsedCommand::new("mine", Params::new()));
        let dispatcher = Dispatcher::new(inference, agent);

        assert_eq!(dispatcher.process_command("mine diamonds").await, rejection);
    }

    struct PositiveCount;

    impl ActionRule for PositiveCount {
        fn name(&self) -> &'static str {
            "positive_count"
        }

        fn applies_to(&self, action: &str) -> bool {
            action == "mine"
        }

        fn apply(&self, params: &mut Params) -> Result<()> {
            match params.get("count").and_then(|c| c.as_i64()) {
                Some(n) if n <= 0 => Err(Error::invalid_argument("count must be positive")),
                _ => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn test_failing_rule_aborts_turn() {
        let inference = MockInference::new()
            .with_response(ParsedCommand::new("mine", params(json!({"count": 0}))));
        let dispatcher = Dispatcher::new(inference, MockAgent::new()).with_rule(PositiveCount);

        let result = dispatcher.process_command("mine 0 stone").await;

        assert_eq!(result, CommandResult::rejected("count must be positive", "Error processing command"));
        assert!(dispatcher.agent().commands().is_empty());
    }

    #[tokio::test]
    async fn test_rules_run_in_registration_order() {
        struct AssertChainFlag;

        impl ActionRule for AssertChainFlag {
            fn name(&self) -> &'static str {
                "assert_chain_flag"
            }

            fn applies_to(&self, action: &str) -> bool {
                action == "craft"
            }

            fn apply(&self, params: &mut Params) -> Result<()> {
                tokio_test::assert_ok!(params
                    .get(CraftingChainRule::FLAG)
                    .filter(|v| v.as_bool() == Some(true))
                    .ok_or("crafting chain rule did not run first"));
                Ok(())
            }
        }

        let inference = MockInference::new().with_response(ParsedCommand::new("craft", Params::new()));
        let dispatcher = Dispatcher::new(inference, MockAgent::new()).with_rule(AssertChainFlag);

        assert!(dispatcher.process_command("craft table").await.success);
    }
}

//! # Botrelay Dispatch
//!
//! The dispatcher runs one operator turn end to end:
//! 1. Read the agent's status as inference context (optional, never fatal)
//! 2. Ask the inference service to translate the operator's text
//! 3. Stop if translation failed or produced no action
//! 4. Run the action rules over the params
//! 5. Relay the action to the agent and return its result
//!
//! No partial dispatch: the agent is only contacted once step 4 succeeds.

mod dispatcher;
pub mod rules;

pub use dispatcher::Dispatcher;
pub use rules::{ActionRule, CraftingChainRule};

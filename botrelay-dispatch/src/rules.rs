//! Action rules - fixed post-processing applied to params before dispatch

use botrelay_client::{Params, Result};
use serde_json::Value;

/// A rewrite applied to the params of matching actions.
pub trait ActionRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn applies_to(&self, action: &str) -> bool;

    fn apply(&self, params: &mut Params) -> Result<()>;
}

/// Craft actions always go through the agent's crafting chain, which gathers
/// missing ingredients and places a crafting table when needed.
pub struct CraftingChainRule;

impl CraftingChainRule {
    pub const ACTION: &'static str = "craft";
    pub const FLAG: &'static str = "useCraftingChain";
}

impl ActionRule for CraftingChainRule {
    fn name(&self) -> &'static str {
        "crafting_chain"
    }

    fn applies_to(&self, action: &str) -> bool {
        action == Self::ACTION
    }

    fn apply(&self, params: &mut Params) -> Result<()> {
        params.insert(Self::FLAG.to_string(), Value::Bool(true));
        Ok(())
    }
}

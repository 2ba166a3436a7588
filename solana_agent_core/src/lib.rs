pub mod actions;
pub mod agent;
pub mod errors;
pub mod schema;
pub mod wallet;

pub mod agent_actions;
pub mod coingecko_actions;
pub mod defillama_actions;
pub mod dexscreener_actions;
pub mod elfa_actions;

pub use actions::{
    error_envelope, success_envelope, Action, ActionExample, ActionMetadata, ActionRegistry,
};
pub use agent::{Agent, AgentConfig, PriorityLevel};
pub use errors::{ActionError, SchemaError, ValidationError};
pub use schema::{translate, FieldShape, FieldType, SchemaShape};
pub use wallet::{KeypairWallet, Wallet};

pub use agent_actions::register_agent_actions;
pub use coingecko_actions::register_coingecko_actions;
pub use defillama_actions::register_defillama_actions;
pub use dexscreener_actions::register_dexscreener_actions;
pub use elfa_actions::register_elfa_actions;

/// Convenience helper to register all bundled actions for an agent.
/// As more domains are added, extend this function to register their
/// actions as well.
pub fn register_all_actions(registry: &mut ActionRegistry) {
    register_agent_actions(registry);
    register_defillama_actions(registry);
    register_coingecko_actions(registry);
    register_dexscreener_actions(registry);
    register_elfa_actions(registry);
}

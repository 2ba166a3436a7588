//! Wallet-facing actions: address lookup, balances, transfers.

use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;

use crate::actions::{Action, ActionExample, ActionMetadata, ActionRegistry};
use crate::agent::Agent;

// =============================================================================
// GET_WALLET_ADDRESS - Get the agent's wallet address
// =============================================================================

#[derive(Debug)]
pub struct GetWalletAddressAction {
    meta: ActionMetadata,
}

impl GetWalletAddressAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({}),
            output: json!({
                "status": "success",
                "address": "8x2dR8Mpzuz2YqyZyZjUbYWKSWesBo5jMx2Q9Y86udVk",
            }),
            explanation: "Get the agent's wallet address".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "GET_WALLET_ADDRESS".to_string(),
            similes: vec![
                "wallet address".to_string(),
                "show wallet address".to_string(),
                "my wallet address".to_string(),
            ],
            description: "Get the wallet address of the agent".to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for GetWalletAddressAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, _input: Value) -> Result<Value> {
        Ok(json!({
            "status": "success",
            "address": agent.wallet_address().to_string(),
        }))
    }
}

// =============================================================================
// BALANCE_ACTION - Get SOL or SPL token balance
// =============================================================================

#[derive(Debug)]
pub struct GetBalanceAction {
    meta: ActionMetadata,
}

impl GetBalanceAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "tokenAddress": {
                    "type": "string",
                    "description": "Optional SPL token mint address; if omitted, SOL balance is returned",
                }
            },
            "additionalProperties": false,
        });

        let examples = vec![vec![
            ActionExample {
                input: json!({}),
                output: json!({
                    "status": "success",
                    "balance": 100.0,
                    "token": "SOL",
                }),
                explanation: "Get the SOL balance of the agent wallet".to_string(),
            },
            ActionExample {
                input: json!({
                    "tokenAddress": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                }),
                output: json!({
                    "status": "success",
                    "balance": 1000.0,
                    "token": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                }),
                explanation: "Get the USDC token balance".to_string(),
            },
        ]];

        let meta = ActionMetadata {
            name: "BALANCE_ACTION".to_string(),
            similes: vec![
                "check balance".to_string(),
                "get wallet balance".to_string(),
                "view balance".to_string(),
                "check token balance".to_string(),
            ],
            description: "Get the balance of the agent's wallet. If no tokenAddress is provided, the balance is returned in SOL.".to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for GetBalanceAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Input {
            #[serde(default)]
            token_address: Option<String>,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let mint = match parsed.token_address.as_deref() {
            Some(addr) => Some(Pubkey::from_str(addr)?),
            None => None,
        };

        let balance = agent.get_balance(mint).await?;
        let token = parsed.token_address.unwrap_or_else(|| "SOL".to_string());

        Ok(json!({
            "status": "success",
            "balance": balance,
            "token": token,
        }))
    }
}

// =============================================================================
// TRANSFER - Transfer SOL or SPL tokens
// =============================================================================

#[derive(Debug)]
pub struct TransferAction {
    meta: ActionMetadata,
}

impl TransferAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "to": {
                    "type": "string",
                    "description": "Destination Solana address",
                },
                "amount": {
                    "type": "number",
                    "description": "Amount of SOL or tokens to transfer, in UI units",
                },
                "mint": {
                    "type": ["string", "null"],
                    "description": "SPL token mint address; null or omitted for native SOL",
                },
            },
            "required": ["to", "amount"],
            "additionalProperties": false,
        });

        let examples = vec![vec![
            ActionExample {
                input: json!({
                    "to": "ExampleDestination1111111111111111111111111111",
                    "amount": 0.1,
                }),
                output: json!({
                    "status": "success",
                    "signature": "example_signature",
                }),
                explanation: "Transfer 0.1 SOL to the given address".to_string(),
            },
            ActionExample {
                input: json!({
                    "to": "ExampleDestination1111111111111111111111111111",
                    "amount": 5.0,
                    "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                }),
                output: json!({
                    "status": "success",
                    "signature": "example_token_signature",
                }),
                explanation: "Transfer 5 USDC to the given address".to_string(),
            },
        ]];

        let meta = ActionMetadata {
            name: "TRANSFER".to_string(),
            similes: vec![
                "send sol".to_string(),
                "send tokens".to_string(),
                "transfer to another wallet".to_string(),
            ],
            description: "Transfer SOL or SPL tokens from the agent's wallet to another address"
                .to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for TransferAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Input {
            to: String,
            amount: f64,
            #[serde(default)]
            mint: Option<String>,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let to = Pubkey::from_str(&parsed.to)?;
        let mint = match parsed.mint.as_deref() {
            Some(addr) => Some(Pubkey::from_str(addr)?),
            None => None,
        };

        let signature = agent.transfer(to, parsed.amount, mint).await?;
        Ok(json!({
            "status": "success",
            "signature": signature,
        }))
    }
}

// =============================================================================
// Register wallet-facing actions
// =============================================================================

pub fn register_agent_actions(registry: &mut ActionRegistry) {
    registry.register_or_warn(GetWalletAddressAction::new());
    registry.register_or_warn(GetBalanceAction::new());
    registry.register_or_warn(TransferAction::new());
}

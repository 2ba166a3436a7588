//! DexScreener actions: ticker-based token lookups.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::actions::{Action, ActionExample, ActionMetadata, ActionRegistry};
use crate::agent::Agent;

/// Resolve a ticker symbol to the Solana token address of the highest-FDV
/// pair listed on DexScreener.
async fn token_address_from_ticker(agent: &Agent, ticker: &str) -> Result<String> {
    let url = format!(
        "https://api.dexscreener.com/latest/dex/search?q={}",
        urlencoding::encode(ticker),
    );
    let response = agent.http.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!("DexScreener API error: {}", response.status()));
    }
    let data: Value = response.json().await?;

    let mut pairs: Vec<&Value> = data
        .get("pairs")
        .and_then(Value::as_array)
        .map(|pairs| {
            pairs
                .iter()
                .filter(|pair| pair["chainId"].as_str() == Some("solana"))
                .filter(|pair| {
                    pair["baseToken"]["symbol"]
                        .as_str()
                        .is_some_and(|symbol| symbol.eq_ignore_ascii_case(ticker))
                })
                .collect()
        })
        .unwrap_or_default();
    pairs.sort_by(|a, b| {
        let fdv_a = a["fdv"].as_f64().unwrap_or(0.0);
        let fdv_b = b["fdv"].as_f64().unwrap_or(0.0);
        fdv_b.total_cmp(&fdv_a)
    });

    pairs
        .first()
        .and_then(|pair| pair["baseToken"]["address"].as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("token address not found for ticker: {ticker}"))
}

// =============================================================================
// GET_TOKEN_DATA_BY_TICKER - Token data via DexScreener
// =============================================================================

#[derive(Debug)]
pub struct TokenDataByTickerAction {
    meta: ActionMetadata,
}

impl TokenDataByTickerAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Token ticker symbol, e.g. \"USDC\"",
                },
            },
            "required": ["ticker"],
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({ "ticker": "USDC" }),
            output: json!({
                "status": "success",
                "tokenData": [
                    {
                        "chainId": "solana",
                        "baseToken": {
                            "address": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                            "symbol": "USDC",
                        },
                    }
                ],
            }),
            explanation: "Look up USDC token data on DexScreener by its ticker".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "GET_TOKEN_DATA_BY_TICKER".to_string(),
            similes: vec![
                "token data by ticker".to_string(),
                "look up token by symbol".to_string(),
                "dexscreener token data".to_string(),
            ],
            description: "Get token data for a given token ticker symbol, resolved through DexScreener's Solana pairs.".to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for TokenDataByTickerAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Input {
            ticker: String,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let ticker = parsed.ticker.trim();
        let address = token_address_from_ticker(agent, ticker).await?;

        let url = format!("https://api.dexscreener.com/tokens/v1/solana/{address}");
        let response = agent.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(json!({
                "status": "error",
                "message": format!("DexScreener API error: {}", response.status()),
            }));
        }

        let data: Value = response.json().await?;
        Ok(json!({
            "status": "success",
            "tokenData": data,
        }))
    }
}

// =============================================================================
// Register DexScreener actions
// =============================================================================

pub fn register_dexscreener_actions(registry: &mut ActionRegistry) {
    registry.register_or_warn(TokenDataByTickerAction::new());
}

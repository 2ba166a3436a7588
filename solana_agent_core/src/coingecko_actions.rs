//! CoinGecko market-data actions.
//!
//! A pro API key in the agent config routes requests to the pro host; a demo
//! key is appended on the public host when present.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::actions::{Action, ActionExample, ActionMetadata, ActionRegistry};
use crate::agent::Agent;

const COINGECKO_PRO_URL: &str = "https://pro-api.coingecko.com/api/v3";
const COINGECKO_PUBLIC_URL: &str = "https://api.coingecko.com/api/v3";

fn coingecko_url(agent: &Agent, path: &str, params: &[(&str, String)]) -> Result<Url> {
    let pro_key = agent.config.coingecko_pro_api_key.as_deref();
    let base = if pro_key.is_some() {
        COINGECKO_PRO_URL
    } else {
        COINGECKO_PUBLIC_URL
    };

    let mut query: Vec<(String, String)> = params
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect();
    if let Some(key) = pro_key {
        query.push(("x_cg_pro_api_key".to_string(), key.to_string()));
    } else if let Some(key) = agent.config.coingecko_demo_api_key.as_deref() {
        query.push(("x_cg_demo_api_key".to_string(), key.to_string()));
    }

    Ok(Url::parse_with_params(&format!("{base}{path}"), &query)?)
}

// =============================================================================
// GET_COINGECKO_TOKEN_PRICE_DATA - USD prices for Solana token mints
// =============================================================================

#[derive(Debug)]
pub struct GetCoingeckoTokenPriceDataAction {
    meta: ActionMetadata,
}

impl GetCoingeckoTokenPriceDataAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "tokenAddresses": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Solana token mint addresses to price",
                },
            },
            "required": ["tokenAddresses"],
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({
                "tokenAddresses": ["EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"],
            }),
            output: json!({
                "status": "success",
                "result": {
                    "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v": { "usd": 1.0 },
                },
            }),
            explanation: "Get the USD price of USDC by its mint address".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "GET_COINGECKO_TOKEN_PRICE_DATA".to_string(),
            similes: vec![
                "get token price data on coingecko".to_string(),
                "what's the price of this token on coingecko".to_string(),
                "coingecko price".to_string(),
            ],
            description: "Get the price data of one or more tokens on CoinGecko by mint address"
                .to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for GetCoingeckoTokenPriceDataAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Input {
            token_addresses: Vec<String>,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let url = coingecko_url(
            agent,
            "/simple/token_price/solana",
            &[
                ("contract_addresses", parsed.token_addresses.join(",")),
                ("vs_currencies", "usd".to_string()),
            ],
        )?;

        let response = agent.http.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(json!({
                "status": "error",
                "message": format!("CoinGecko API error: {}", response.status()),
            }));
        }

        let data: Value = response.json().await?;
        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// GET_COINGECKO_TRENDING_TOKENS - What's trending on CoinGecko
// =============================================================================

#[derive(Debug)]
pub struct GetCoingeckoTrendingTokensAction {
    meta: ActionMetadata,
}

impl GetCoingeckoTrendingTokensAction {
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
                "result": {
                    "coins": [
                        {
                            "id": "solana",
                            "name": "Solana",
                            "symbol": "SOL",
                            "market_cap_rank": 5,
                        }
                    ],
                },
            }),
            explanation: "Get the trending tokens on CoinGecko".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "GET_COINGECKO_TRENDING_TOKENS".to_string(),
            similes: vec![
                "trending tokens".to_string(),
                "hot tokens".to_string(),
                "coingecko trending".to_string(),
            ],
            description: "Get the trending tokens on CoinGecko - shows what's hot in the market"
                .to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for GetCoingeckoTrendingTokensAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, _input: Value) -> Result<Value> {
        let url = coingecko_url(agent, "/search/trending", &[])?;

        let response = agent.http.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(json!({
                "status": "error",
                "message": format!("CoinGecko API error: {}", response.status()),
            }));
        }

        let data: Value = response.json().await?;
        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// GET_COINGECKO_TOP_GAINERS - Biggest gainers over a time window
// =============================================================================

#[derive(Debug)]
pub struct GetCoingeckoTopGainersAction {
    meta: ActionMetadata,
}

impl GetCoingeckoTopGainersAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "duration": {
                    "type": "string",
                    "description": "Time window: 1h, 24h, 7d, 14d, 30d, 60d, or 1y. Default 24h",
                },
                "topCoins": {
                    "type": "integer",
                    "description": "Restrict to the top N coins by market cap: 300, 500, or 1000. Default 1000",
                },
            },
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({ "duration": "24h", "topCoins": 300 }),
            output: json!({
                "status": "success",
                "result": {
                    "top_gainers": [
                        {
                            "id": "bonk",
                            "symbol": "bonk",
                            "usd_24h_change": 42.0,
                        }
                    ],
                },
            }),
            explanation: "Get the top gainers over the last 24 hours".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "GET_COINGECKO_TOP_GAINERS".to_string(),
            similes: vec![
                "top gainers".to_string(),
                "best performing tokens".to_string(),
                "biggest winners on coingecko".to_string(),
            ],
            description: "Get the top gaining tokens on CoinGecko over a time window".to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for GetCoingeckoTopGainersAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Input {
            #[serde(default)]
            duration: Option<String>,
            #[serde(default)]
            top_coins: Option<u32>,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let duration = parsed.duration.unwrap_or_else(|| "24h".to_string());
        let top_coins = parsed.top_coins.unwrap_or(1000);
        let url = coingecko_url(
            agent,
            "/coins/top_gainers_losers",
            &[
                ("vs_currency", "usd".to_string()),
                ("duration", duration),
                ("top_coins", top_coins.to_string()),
            ],
        )?;

        let response = agent.http.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(json!({
                "status": "error",
                "message": format!("CoinGecko API error: {}", response.status()),
            }));
        }

        let data: Value = response.json().await?;
        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// GET_COINGECKO_LATEST_POOLS - Newest Solana liquidity pools
// =============================================================================

#[derive(Debug)]
pub struct GetCoingeckoLatestPoolsAction {
    meta: ActionMetadata,
}

impl GetCoingeckoLatestPoolsAction {
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
                "result": {
                    "data": [
                        {
                            "id": "solana_FxApoolAddr111111111111111111111111111111",
                            "attributes": { "name": "WIF / SOL" },
                        }
                    ],
                },
            }),
            explanation: "Get the latest pools created on Solana".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "GET_COINGECKO_LATEST_POOLS".to_string(),
            similes: vec![
                "latest pools".to_string(),
                "new pools on solana".to_string(),
                "recently created pools".to_string(),
            ],
            description: "Get the latest liquidity pools created on Solana, from CoinGecko's onchain data".to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for GetCoingeckoLatestPoolsAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, _input: Value) -> Result<Value> {
        let url = coingecko_url(
            agent,
            "/onchain/networks/solana/new_pools",
            &[("include", "base_token,network".to_string())],
        )?;

        let response = agent.http.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(json!({
                "status": "error",
                "message": format!("CoinGecko API error: {}", response.status()),
            }));
        }

        let data: Value = response.json().await?;
        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// GET_COINGECKO_TRENDING_POOLS - Trending Solana pools over a time window
// =============================================================================

#[derive(Debug)]
pub struct GetCoingeckoTrendingPoolsAction {
    meta: ActionMetadata,
}

impl GetCoingeckoTrendingPoolsAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "duration": {
                    "type": "string",
                    "description": "Time window: 5m, 1h, 6h, or 24h. Default 24h",
                },
            },
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({ "duration": "24h" }),
            output: json!({
                "status": "success",
                "result": {
                    "data": [
                        {
                            "id": "solana_BonkpoolAddr11111111111111111111111111111",
                            "attributes": { "name": "BONK / SOL" },
                        }
                    ],
                },
            }),
            explanation: "Get the trending Solana pools over the last 24 hours".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "GET_COINGECKO_TRENDING_POOLS".to_string(),
            similes: vec![
                "trending pools".to_string(),
                "hot pools on solana".to_string(),
            ],
            description: "Get the trending liquidity pools on Solana over a time window, from CoinGecko's onchain data".to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for GetCoingeckoTrendingPoolsAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Input {
            #[serde(default)]
            duration: Option<String>,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let duration = parsed.duration.unwrap_or_else(|| "24h".to_string());
        let url = coingecko_url(
            agent,
            "/onchain/networks/solana/trending_pools",
            &[
                ("include", "base_token,network".to_string()),
                ("duration", duration),
            ],
        )?;

        let response = agent.http.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(json!({
                "status": "error",
                "message": format!("CoinGecko API error: {}", response.status()),
            }));
        }

        let data: Value = response.json().await?;
        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// Register CoinGecko actions
// =============================================================================

pub fn register_coingecko_actions(registry: &mut ActionRegistry) {
    registry.register_or_warn(GetCoingeckoTokenPriceDataAction::new());
    registry.register_or_warn(GetCoingeckoTrendingTokensAction::new());
    registry.register_or_warn(GetCoingeckoTopGainersAction::new());
    registry.register_or_warn(GetCoingeckoLatestPoolsAction::new());
    registry.register_or_warn(GetCoingeckoTrendingPoolsAction::new());
}

//! DefiLlama market-data actions: spot prices and protocol TVL.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::actions::{Action, ActionExample, ActionMetadata, ActionRegistry};
use crate::agent::Agent;

const DEFILLAMA_PRICES_URL: &str = "https://coins.llama.fi";
const DEFILLAMA_BASE_URL: &str = "https://api.llama.fi";

// =============================================================================
// DEFILLAMA_FETCH_PRICE - Current token prices by chain:address identifier
// =============================================================================

#[derive(Debug)]
pub struct FetchPriceAction {
    meta: ActionMetadata,
}

impl FetchPriceAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "chainTokenAddrStrings": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Array of strings in \"chain:token_address\" format (e.g. \"solana:EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v\")",
                },
                "searchWidth": {
                    "type": "string",
                    "description": "Width of the search window for the price data. Default is \"6h\"",
                },
            },
            "required": ["chainTokenAddrStrings"],
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({
                "chainTokenAddrStrings": [
                    "ethereum:0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
                ],
            }),
            output: json!({
                "status": "success",
                "summary": {
                    "prices": {
                        "ethereum:0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2": 1829,
                    },
                },
            }),
            explanation: "Fetch the current USD price of WETH on Ethereum".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "DEFILLAMA_FETCH_PRICE".to_string(),
            similes: vec![
                "get token price".to_string(),
                "fetch price".to_string(),
                "check token price".to_string(),
                "get price from defillama".to_string(),
            ],
            description: "Fetches the price of one or more tokens using the DefiLlama price API. Tokens are specified using chain:address format.".to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for FetchPriceAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Input {
            chain_token_addr_strings: Vec<String>,
            #[serde(default)]
            search_width: Option<String>,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let tokens = parsed.chain_token_addr_strings.join(",");
        let base = format!("{DEFILLAMA_PRICES_URL}/prices/current/{tokens}");
        let url = match parsed.search_width.as_deref() {
            Some(width) => Url::parse_with_params(&base, [("searchWidth", width)])?,
            None => Url::parse(&base)?,
        };

        let response = agent.http.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(json!({
                "status": "error",
                "message": format!("DefiLlama API error: {}", response.status()),
            }));
        }

        let data: Value = response.json().await?;
        Ok(json!({
            "status": "success",
            "summary": {
                "prices": data.get("coins").cloned().unwrap_or(data),
            },
        }))
    }
}

// =============================================================================
// DEFILLAMA_GET_PROTOCOL_TVL - Total value locked for a protocol slug
// =============================================================================

#[derive(Debug)]
pub struct GetProtocolTvlAction {
    meta: ActionMetadata,
}

impl GetProtocolTvlAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "slug": {
                    "type": "string",
                    "description": "DefiLlama protocol slug (e.g. \"aave\", \"uniswap\")",
                },
            },
            "required": ["slug"],
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({ "slug": "uniswap" }),
            output: json!({
                "status": "success",
                "slug": "uniswap",
                "tvl": 4123456789.0,
                "summary": "The TVL for uniswap is 4123456789 USD",
            }),
            explanation: "Get the total value locked for the Uniswap protocol".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "DEFILLAMA_GET_PROTOCOL_TVL".to_string(),
            similes: vec![
                "get protocol tvl".to_string(),
                "total value locked".to_string(),
                "check tvl on defillama".to_string(),
            ],
            description: "Get the current total value locked (TVL) in USD for a protocol, identified by its DefiLlama slug.".to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for GetProtocolTvlAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Input {
            slug: String,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let slug = urlencoding::encode(&parsed.slug);
        let url = format!("{DEFILLAMA_BASE_URL}/tvl/{slug}");

        let response = agent.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(json!({
                "status": "error",
                "message": format!(
                    "DefiLlama API error for slug `{}`: {} (check the protocol slug on defillama.com)",
                    parsed.slug,
                    response.status(),
                ),
            }));
        }

        let tvl: f64 = response.json().await?;
        Ok(json!({
            "status": "success",
            "slug": parsed.slug,
            "tvl": tvl,
            "summary": format!("The TVL for {} is {:.0} USD", parsed.slug, tvl),
        }))
    }
}

// =============================================================================
// Register DefiLlama actions
// =============================================================================

pub fn register_defillama_actions(registry: &mut ActionRegistry) {
    registry.register_or_warn(FetchPriceAction::new());
    registry.register_or_warn(GetProtocolTvlAction::new());
}

//! Elfa AI social-data actions: smart mentions and trending tokens.
//!
//! All endpoints need an Elfa API key in the agent config; a missing key is a
//! handler error and surfaces as an error envelope.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::actions::{Action, ActionExample, ActionMetadata, ActionRegistry};
use crate::agent::Agent;

const ELFA_BASE_URL: &str = "https://api.elfa.ai";

async fn elfa_get(agent: &Agent, path: &str, params: &[(&str, String)]) -> Result<Value> {
    let key = agent
        .config
        .elfa_ai_api_key
        .as_deref()
        .ok_or_else(|| anyhow!("Elfa AI API key is not configured"))?;

    let url = Url::parse_with_params(&format!("{ELFA_BASE_URL}{path}"), params)?;
    let response = agent
        .http
        .get(url)
        .header("x-elfa-api-key", key)
        .send()
        .await?;
    if !response.status().is_success() {
        bail!("Elfa AI API error: {}", response.status());
    }
    Ok(response.json().await?)
}

// =============================================================================
// ELFA_PING - API reachability check
// =============================================================================

#[derive(Debug)]
pub struct ElfaPingAction {
    meta: ActionMetadata,
}

impl ElfaPingAction {
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
                "result": { "message": "pong" },
            }),
            explanation: "Ping the Elfa AI API to confirm the key works".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "ELFA_PING".to_string(),
            similes: vec![
                "ping elfa".to_string(),
                "check elfa api".to_string(),
            ],
            description: "Ping the Elfa AI API to verify connectivity and the configured API key"
                .to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for ElfaPingAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, _input: Value) -> Result<Value> {
        let data = elfa_get(agent, "/v1/ping", &[]).await?;
        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// ELFA_API_KEY_STATUS - Usage and limits for the configured key
// =============================================================================

#[derive(Debug)]
pub struct ElfaApiKeyStatusAction {
    meta: ActionMetadata,
}

impl ElfaApiKeyStatusAction {
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
                    "data": {
                        "status": "active",
                        "usage": 250,
                        "limit": 1000,
                    },
                },
            }),
            explanation: "Check the usage and limits of the configured Elfa AI key".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "ELFA_API_KEY_STATUS".to_string(),
            similes: vec![
                "elfa key status".to_string(),
                "elfa api usage".to_string(),
            ],
            description: "Get the status, usage, and limits of the configured Elfa AI API key"
                .to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for ElfaApiKeyStatusAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, _input: Value) -> Result<Value> {
        let data = elfa_get(agent, "/v1/key-status", &[]).await?;
        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// ELFA_GET_SMART_MENTIONS - Mentions by smart accounts
// =============================================================================

#[derive(Debug)]
pub struct ElfaGetSmartMentionsAction {
    meta: ActionMetadata,
}

impl ElfaGetSmartMentionsAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "description": "Number of mentions to return. Default 100",
                },
                "offset": {
                    "type": "integer",
                    "description": "Pagination offset. Default 0",
                },
            },
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({ "limit": 10, "offset": 0 }),
            output: json!({
                "status": "success",
                "result": {
                    "data": [
                        {
                            "content": "Solana ecosystem heating up",
                            "metrics": { "view_count": 1200, "repost_count": 18 },
                        }
                    ],
                },
            }),
            explanation: "Get the ten most recent smart-account mentions".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "ELFA_GET_SMART_MENTIONS".to_string(),
            similes: vec![
                "smart mentions".to_string(),
                "what are smart accounts saying".to_string(),
                "social mentions".to_string(),
            ],
            description: "Get tweets by smart accounts tracked by Elfa AI, most recent first"
                .to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for ElfaGetSmartMentionsAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Input {
            #[serde(default)]
            limit: Option<u32>,
            #[serde(default)]
            offset: Option<u32>,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let data = elfa_get(
            agent,
            "/v1/mentions",
            &[
                ("limit", parsed.limit.unwrap_or(100).to_string()),
                ("offset", parsed.offset.unwrap_or(0).to_string()),
            ],
        )
        .await?;

        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// ELFA_GET_TOP_MENTIONS_BY_TICKER - Top mentions for one ticker
// =============================================================================

#[derive(Debug)]
pub struct ElfaGetTopMentionsByTickerAction {
    meta: ActionMetadata,
}

impl ElfaGetTopMentionsByTickerAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Ticker symbol to search mentions for, e.g. \"SOL\"",
                },
                "timeWindow": {
                    "type": "string",
                    "description": "Time window, e.g. 1h, 24h, 7d. Default 1h",
                },
                "page": {
                    "type": "integer",
                    "description": "Page number. Default 1",
                },
                "pageSize": {
                    "type": "integer",
                    "description": "Results per page. Default 10",
                },
            },
            "required": ["ticker"],
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({ "ticker": "SOL", "timeWindow": "1h" }),
            output: json!({
                "status": "success",
                "result": {
                    "data": [
                        {
                            "content": "$SOL looking strong",
                            "mentioned_at": "2024-02-15T12:30:00Z",
                        }
                    ],
                    "total": 1,
                },
            }),
            explanation: "Get the top SOL mentions from the last hour".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "ELFA_GET_TOP_MENTIONS_BY_TICKER".to_string(),
            similes: vec![
                "top mentions for ticker".to_string(),
                "who is talking about this token".to_string(),
            ],
            description: "Get the top social mentions for a ticker symbol over a time window"
                .to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for ElfaGetTopMentionsByTickerAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Input {
            ticker: String,
            #[serde(default)]
            time_window: Option<String>,
            #[serde(default)]
            page: Option<u32>,
            #[serde(default)]
            page_size: Option<u32>,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let data = elfa_get(
            agent,
            "/v1/top-mentions",
            &[
                ("ticker", parsed.ticker),
                (
                    "timeWindow",
                    parsed.time_window.unwrap_or_else(|| "1h".to_string()),
                ),
                ("page", parsed.page.unwrap_or(1).to_string()),
                ("pageSize", parsed.page_size.unwrap_or(10).to_string()),
            ],
        )
        .await?;

        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// ELFA_SEARCH_MENTIONS_BY_KEYWORDS - Mentions matching keywords in a date range
// =============================================================================

#[derive(Debug)]
pub struct ElfaSearchMentionsByKeywordsAction {
    meta: ActionMetadata,
}

impl ElfaSearchMentionsByKeywordsAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "keywords": {
                    "type": "string",
                    "description": "Keywords to search for, comma separated",
                },
                "from": {
                    "type": "integer",
                    "description": "Start of the search window as a unix timestamp",
                },
                "to": {
                    "type": "integer",
                    "description": "End of the search window as a unix timestamp",
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of mentions to return. Default 20",
                },
            },
            "required": ["keywords", "from", "to"],
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({
                "keywords": "solana,airdrop",
                "from": 1707000000,
                "to": 1707086400,
                "limit": 20,
            }),
            output: json!({
                "status": "success",
                "result": {
                    "data": [
                        {
                            "content": "New Solana airdrop season",
                            "mentioned_at": "2024-02-04T12:00:00Z",
                        }
                    ],
                },
            }),
            explanation: "Search mentions of solana and airdrop in a one-day window".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "ELFA_SEARCH_MENTIONS_BY_KEYWORDS".to_string(),
            similes: vec![
                "search social mentions".to_string(),
                "find tweets about keywords".to_string(),
            ],
            description: "Search social mentions matching keywords within a date range via Elfa AI"
                .to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for ElfaSearchMentionsByKeywordsAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Input {
            keywords: String,
            from: i64,
            to: i64,
            #[serde(default)]
            limit: Option<u32>,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let data = elfa_get(
            agent,
            "/v1/mentions/search",
            &[
                ("keywords", parsed.keywords),
                ("from", parsed.from.to_string()),
                ("to", parsed.to.to_string()),
                ("limit", parsed.limit.unwrap_or(20).to_string()),
            ],
        )
        .await?;

        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// ELFA_SMART_TWITTER_ACCOUNT_STATS - Smart-follower stats for a username
// =============================================================================

#[derive(Debug)]
pub struct ElfaSmartTwitterAccountStatsAction {
    meta: ActionMetadata,
}

impl ElfaSmartTwitterAccountStatsAction {
    pub fn new() -> Self {
        let input_schema = json!({
            "type": "object",
            "properties": {
                "username": {
                    "type": "string",
                    "description": "Twitter username to look up, without the @",
                },
            },
            "required": ["username"],
            "additionalProperties": false,
        });

        let examples = vec![vec![ActionExample {
            input: json!({ "username": "elonmusk" }),
            output: json!({
                "status": "success",
                "result": {
                    "data": {
                        "smartFollowingCount": 5000,
                        "averageEngagement": 12.5,
                    },
                },
            }),
            explanation: "Get smart-follower statistics for a Twitter account".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "ELFA_SMART_TWITTER_ACCOUNT_STATS".to_string(),
            similes: vec![
                "twitter account stats".to_string(),
                "smart followers for account".to_string(),
            ],
            description: "Get smart-follower and engagement statistics for a Twitter account via Elfa AI".to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for ElfaSmartTwitterAccountStatsAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, input: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Input {
            username: String,
        }

        let parsed: Input = serde_json::from_value(input)?;
        let data = elfa_get(
            agent,
            "/v1/account/smart-stats",
            &[("username", parsed.username)],
        )
        .await?;

        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// ELFA_TRENDING_TOKENS - Tokens trending in smart-account discussion
// =============================================================================

#[derive(Debug)]
pub struct ElfaTrendingTokensAction {
    meta: ActionMetadata,
}

impl ElfaTrendingTokensAction {
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
                        { "token": "SOL", "current_count": 50, "change_percent": 12.5 }
                    ],
                },
            }),
            explanation: "Get tokens trending in smart-account discussions".to_string(),
        }]];

        let meta = ActionMetadata {
            name: "ELFA_TRENDING_TOKENS".to_string(),
            similes: vec![
                "trending on social".to_string(),
                "most discussed tokens".to_string(),
            ],
            description: "Get tokens trending in discussions by smart accounts tracked by Elfa AI"
                .to_string(),
            examples,
            input_schema,
        };

        Self { meta }
    }
}

#[async_trait]
impl Action for ElfaTrendingTokensAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, agent: &Agent, _input: Value) -> Result<Value> {
        let data = elfa_get(agent, "/v1/trending-tokens", &[]).await?;
        Ok(json!({
            "status": "success",
            "result": data,
        }))
    }
}

// =============================================================================
// Register Elfa AI actions
// =============================================================================

pub fn register_elfa_actions(registry: &mut ActionRegistry) {
    registry.register_or_warn(ElfaPingAction::new());
    registry.register_or_warn(ElfaApiKeyStatusAction::new());
    registry.register_or_warn(ElfaGetSmartMentionsAction::new());
    registry.register_or_warn(ElfaGetTopMentionsByTickerAction::new());
    registry.register_or_warn(ElfaSearchMentionsByKeywordsAction::new());
    registry.register_or_warn(ElfaSmartTwitterAccountStatsAction::new());
    registry.register_or_warn(ElfaTrendingTokensAction::new());
}

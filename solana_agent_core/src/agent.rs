use std::sync::Arc;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL, pubkey::Pubkey, system_instruction, transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};

use crate::wallet::Wallet;

/// Fee priority for transaction submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriorityLevel {
    Medium,
    High,
    VeryHigh,
}

/// Optional per-deployment configuration. Supplied by the embedding caller
/// when the agent is constructed; the core never reads process environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    pub coingecko_pro_api_key: Option<String>,
    pub coingecko_demo_api_key: Option<String>,
    pub elfa_ai_api_key: Option<String>,
    pub priority_level: Option<PriorityLevel>,
}

/// Core execution context handed to every action handler: chain connection,
/// signing wallet, API-key configuration, and a shared HTTP client.
/// Read-only after construction; shared by reference across invocations.
pub struct Agent {
    pub client: Arc<RpcClient>,
    pub wallet: Arc<dyn Wallet>,
    pub config: AgentConfig,
    pub http: reqwest::Client,
}

impl Agent {
    pub fn new(wallet: Arc<dyn Wallet>, rpc_url: &str) -> Self {
        Self {
            wallet,
            client: Arc::new(RpcClient::new(rpc_url.to_string())),
            config: AgentConfig::default(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn wallet_address(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    /// Balance of the agent wallet in UI units: SOL when `mint` is `None`,
    /// otherwise the associated token account balance for that mint.
    pub async fn get_balance(&self, mint: Option<Pubkey>) -> anyhow::Result<f64> {
        match mint {
            None => {
                let lamports = self.client.get_balance(&self.wallet.pubkey()).await?;
                Ok(lamports as f64 / LAMPORTS_PER_SOL as f64)
            }
            Some(mint) => {
                let ata = get_associated_token_address(&self.wallet.pubkey(), &mint);
                let balance = self.client.get_token_account_balance(&ata).await?;
                Ok(balance.ui_amount.unwrap_or(0.0))
            }
        }
    }

    /// Transfer SOL or an SPL token to another address. `amount` is in UI
    /// units. Returns the confirmed transaction signature.
    ///
    /// Sequencing of this account's transactions is the chain's concern, not
    /// the dispatch core's; concurrent transfers may land in any order.
    pub async fn transfer(
        &self,
        to: Pubkey,
        amount: f64,
        mint: Option<Pubkey>,
    ) -> anyhow::Result<String> {
        if !amount.is_finite() || amount <= 0.0 {
            bail!("transfer amount must be a positive number, got {amount}");
        }

        let from = self.wallet.pubkey();
        let instructions = match mint {
            None => {
                let lamports = (amount * LAMPORTS_PER_SOL as f64).round() as u64;
                vec![system_instruction::transfer(&from, &to, lamports)]
            }
            Some(mint) => {
                let decimals = self.client.get_token_supply(&mint).await?.decimals;
                let base_amount = (amount * 10f64.powi(i32::from(decimals))).round() as u64;
                let source = get_associated_token_address(&from, &mint);
                let destination = get_associated_token_address(&to, &mint);
                vec![
                    create_associated_token_account_idempotent(&from, &to, &mint, &spl_token::id()),
                    spl_token::instruction::transfer_checked(
                        &spl_token::id(),
                        &source,
                        &mint,
                        &destination,
                        &from,
                        &[],
                        base_amount,
                        decimals,
                    )?,
                ]
            }
        };

        let recent_blockhash = self.client.get_latest_blockhash().await?;
        let mut tx = Transaction::new_with_payer(&instructions, Some(&from));
        self.wallet.sign_transaction(&mut tx, recent_blockhash).await?;
        let signature = self.client.send_and_confirm_transaction(&tx).await?;
        Ok(signature.to_string())
    }
}

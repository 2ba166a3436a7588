use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};

/// Signing capability handlers depend on.
/// Allows for flexible wallet implementations, from local keypairs to remote
/// signers; the dispatch core only requires the capability to exist.
#[async_trait]
pub trait Wallet: Send + Sync + Debug {
    fn pubkey(&self) -> Pubkey;

    async fn sign_message(&self, message: &[u8]) -> anyhow::Result<Signature>;

    /// Sign a transaction in place against the given recent blockhash.
    async fn sign_transaction(
        &self,
        tx: &mut Transaction,
        recent_blockhash: Hash,
    ) -> anyhow::Result<()>;
}

/// Wallet implementation backed by a local Solana keypair.
#[derive(Debug)]
pub struct KeypairWallet {
    pub keypair: Arc<Keypair>,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Build a wallet from a base58-encoded secret key (the common export
    /// format for agent deployments).
    pub fn from_base58(secret: &str) -> anyhow::Result<Self> {
        let bytes = bs58::decode(secret)
            .into_vec()
            .context("secret key is not valid base58")?;
        let keypair = Keypair::from_bytes(&bytes).context("secret key bytes are not a keypair")?;
        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl Wallet for KeypairWallet {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_message(&self, message: &[u8]) -> anyhow::Result<Signature> {
        Ok(self.keypair.sign_message(message))
    }

    async fn sign_transaction(
        &self,
        tx: &mut Transaction,
        recent_blockhash: Hash,
    ) -> anyhow::Result<()> {
        tx.try_sign(&[self.keypair.as_ref()], recent_blockhash)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn base58_roundtrip_preserves_the_pubkey() {
        let keypair = Keypair::new();
        let pubkey = keypair.pubkey();
        let encoded = bs58::encode(keypair.to_bytes()).into_string();

        let wallet = KeypairWallet::from_base58(&encoded).unwrap();
        assert_eq!(wallet.pubkey(), pubkey);
    }

    #[tokio::test]
    async fn signed_messages_verify() {
        let wallet = KeypairWallet::new(Keypair::new());
        let signature = wallet.sign_message(b"hello").await.unwrap();
        assert!(signature.verify(wallet.pubkey().as_ref(), b"hello"));
    }

    #[test]
    fn garbage_secret_keys_are_rejected() {
        assert!(KeypairWallet::from_base58("not base58 !!").is_err());
    }
}

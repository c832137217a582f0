//! Mock-chain badge minting. The ledger is an opaque collaborator that
//! consumes a `Score` as a plain immutable value; this implementation
//! fabricates identifiers locally and never touches a network.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::Score;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintReceipt {
    pub token_id: String,
    pub tx_hash: String,
    pub network: String,
    pub minted_at: DateTime<Utc>,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    async fn mint_badge(&self, owner: &str, score: &Score) -> Result<MintReceipt>;
}

pub struct MockChain {
    network: String,
}

impl MockChain {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
        }
    }

    pub fn testnet() -> Self {
        Self::new("testnet")
    }
}

#[async_trait]
impl Ledger for MockChain {
    async fn mint_badge(&self, owner: &str, score: &Score) -> Result<MintReceipt> {
        let minted_at = Utc::now();

        let mint_material = format!(
            "{}:{}:{}",
            owner,
            score.total,
            minted_at.timestamp_nanos_opt().unwrap_or_default()
        );
        let token_id = hex::encode(&Sha256::digest(mint_material.as_bytes())[..8]).to_uppercase();

        let metadata = serde_json::json!({
            "name": format!("DevScore #{}", token_id),
            "description": "Developer reputation badge",
            "attributes": [
                {"trait_type": "Score", "value": score.total},
                {"trait_type": "Commits", "value": score.commits},
                {"trait_type": "Pull Requests", "value": score.pull_requests},
                {"trait_type": "Issues", "value": score.issues},
                {"trait_type": "Engagement", "value": score.engagement},
                {"trait_type": "Tier", "value": score.tier.to_string()},
            ],
            "minted_at": minted_at.timestamp(),
            "network": self.network.clone(),
        });
        let tx_hash = hex::encode(Sha256::digest(metadata.to_string().as_bytes()));

        tracing::info!(
            "Minted badge #{} for {} (tx {}...)",
            token_id,
            owner,
            &tx_hash[..16]
        );

        Ok(MintReceipt {
            token_id,
            tx_hash,
            network: self.network.clone(),
            minted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;

    fn score(total: u32) -> Score {
        Score {
            commits: total.min(400),
            pull_requests: 0,
            issues: 0,
            engagement: 0,
            total,
            tier: Tier::from_total(total),
        }
    }

    #[tokio::test]
    async fn receipts_carry_well_formed_identifiers() {
        let receipt = MockChain::testnet()
            .mint_badge("WALLET123", &score(640))
            .await
            .unwrap();

        assert_eq!(receipt.token_id.len(), 16);
        assert!(receipt
            .token_id
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_eq!(receipt.tx_hash.len(), 64);
        assert!(receipt.tx_hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(receipt.network, "testnet");
    }

    #[tokio::test]
    async fn different_owners_get_different_tokens() {
        let chain = MockChain::testnet();
        let a = chain.mint_badge("WALLET_A", &score(100)).await.unwrap();
        let b = chain.mint_badge("WALLET_B", &score(100)).await.unwrap();
        assert_ne!(a.token_id, b.token_id);
    }
}

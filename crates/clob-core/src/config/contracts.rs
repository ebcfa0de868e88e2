//! Per-chain contract addresses for the Polymarket exchange and Safe wallets.
//!
//! The table is compiled into the binary and never mutated. Components receive
//! a `&'static ContractConfig` and do not re-query it mid-operation.

use alloy_primitives::{address, Address};

use crate::{Error, Result};

/// Chain ID for Polygon mainnet.
pub const POLYGON_CHAIN_ID: u64 = 137;

/// Chain ID for Polygon Amoy testnet.
pub const POLYGON_AMOY_CHAIN_ID: u64 = 80002;

/// Neg Risk Adapter address on Polygon mainnet.
pub const NEG_RISK_ADAPTER_ADDRESS: Address = address!("d91E80cF2E7be2e162c6513ceD06f1dD0dA35296");

/// Contract addresses for a single chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractConfig {
    pub chain_id: u64,
    /// CTF Exchange.
    pub exchange: Address,
    /// Neg Risk CTF Exchange.
    pub neg_exchange: Address,
    /// Collateral token (USDC.e) for standard markets.
    pub collateral: Address,
    pub neg_collateral: Address,
    /// Conditional Tokens Framework contract.
    pub conditional_tokens: Address,
    pub neg_conditional_tokens: Address,
    /// Polymarket Safe proxy factory.
    pub safe_factory: Address,
    /// Gnosis Safe MultiSend.
    pub safe_multisend: Address,
}

static CONTRACTS: [ContractConfig; 2] = [
    ContractConfig {
        chain_id: POLYGON_CHAIN_ID,
        exchange: address!("4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E"),
        neg_exchange: address!("C5d563A36AE78145C45a50134d48A1215220f80a"),
        collateral: address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
        neg_collateral: address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
        conditional_tokens: address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045"),
        neg_conditional_tokens: address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045"),
        safe_factory: address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b"),
        safe_multisend: address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761"),
    },
    ContractConfig {
        chain_id: POLYGON_AMOY_CHAIN_ID,
        exchange: address!("dFE02Eb6733538f8Ea35D585af8DE5958AD99E40"),
        neg_exchange: address!("d91E80cF2E7be2e162c6513ceD06f1dD0dA35296"),
        collateral: address!("9c4e1703476e875070ee25b56a58b008cfb8fa78"),
        neg_collateral: address!("9c4e1703476e875070ee25b56a58b008cfb8fa78"),
        conditional_tokens: address!("69308FB512518e39F9b16112fA8d994F4e2Bf8bB"),
        neg_conditional_tokens: address!("69308FB512518e39F9b16112fA8d994F4e2Bf8bB"),
        safe_factory: address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b"),
        safe_multisend: address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761"),
    },
];

impl ContractConfig {
    /// Look up the contract set for a chain. Unknown chains are an error.
    pub fn for_chain(chain_id: u64) -> Result<&'static ContractConfig> {
        CONTRACTS
            .iter()
            .find(|c| c.chain_id == chain_id)
            .ok_or_else(|| Error::Config {
                message: format!("invalid chain id: {}", chain_id),
            })
    }

    /// Exchange contract used as the order domain's verifying contract.
    pub fn exchange_for(&self, neg_risk: bool) -> Address {
        if neg_risk {
            self.neg_exchange
        } else {
            self.exchange
        }
    }

    pub fn collateral_for(&self, neg_risk: bool) -> Address {
        if neg_risk {
            self.neg_collateral
        } else {
            self.collateral
        }
    }

    pub fn conditional_tokens_for(&self, neg_risk: bool) -> Address {
        if neg_risk {
            self.neg_conditional_tokens
        } else {
            self.conditional_tokens
        }
    }

    /// All chains with a known contract set.
    pub fn supported_chains() -> impl Iterator<Item = u64> {
        CONTRACTS.iter().map(|c| c.chain_id)
    }
}

//! Call data for the token and CTF calls a Polymarket Safe executes.
//!
//! Token approvals required before the CLOB can move a Safe's funds:
//!
//! 1. USDC.e → approve(spender, MAX) for the CTF, the exchanges and the
//!    Neg Risk Adapter
//! 2. CTF    → setApprovalForAll(operator, true) for the exchanges and the
//!    Neg Risk Adapter

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall};
use clob_core::config::{ContractConfig, NEG_RISK_ADAPTER_ADDRESS, POLYGON_CHAIN_ID};
use clob_core::encoding::{encode_call, Token};
use clob_core::{Error, Result};

use crate::model::SafeTransaction;

sol! {
    function redeemPositions(
        address collateralToken,
        bytes32 parentCollectionId,
        bytes32 conditionId,
        uint256[] indexSets
    );

    function splitPosition(
        address collateralToken,
        bytes32 parentCollectionId,
        bytes32 conditionId,
        uint256[] partition,
        uint256 amount
    );

    function mergePositions(
        address collateralToken,
        bytes32 parentCollectionId,
        bytes32 conditionId,
        uint256[] partition,
        uint256 amount
    );

    function nonce() external view returns (uint256);

    function allowance(address owner, address spender) external view returns (uint256);

    function isApprovedForAll(address account, address operator) external view returns (bool);
}

/// Binary market partition: the YES and NO index sets.
pub const BINARY_PARTITION: [u64; 2] = [1, 2];

/// `approve(spender, amount)` call data.
pub fn encode_approve(spender: Address, amount: U256) -> Result<Vec<u8>> {
    encode_call(
        "approve(address,uint256)",
        &[Token::Address(spender), Token::Uint(amount)],
    )
}

/// `setApprovalForAll(operator, approved)` call data.
pub fn encode_set_approval_for_all(operator: Address, approved: bool) -> Result<Vec<u8>> {
    encode_call(
        "setApprovalForAll(address,bool)",
        &[Token::Address(operator), Token::Bool(approved)],
    )
}

/// ERC-20 `transfer(to, amount)` call data.
pub fn encode_transfer(to: Address, amount: U256) -> Result<Vec<u8>> {
    encode_call(
        "transfer(address,uint256)",
        &[Token::Address(to), Token::Uint(amount)],
    )
}

/// USDC.e spenders that need an unlimited allowance.
pub fn collateral_spenders(config: &ContractConfig) -> Vec<Address> {
    let mut spenders = vec![config.conditional_tokens];
    if config.chain_id == POLYGON_CHAIN_ID {
        spenders.push(NEG_RISK_ADAPTER_ADDRESS);
    }
    spenders.push(config.exchange);
    spenders.push(config.neg_exchange);
    spenders
}

/// CTF operators that need `setApprovalForAll`.
pub fn outcome_token_operators(config: &ContractConfig) -> Vec<Address> {
    let mut operators = vec![config.exchange, config.neg_exchange];
    if config.chain_id == POLYGON_CHAIN_ID {
        operators.push(NEG_RISK_ADAPTER_ADDRESS);
    }
    operators
}

/// Unlimited USDC.e approvals for every collateral spender.
pub fn collateral_approvals(config: &ContractConfig) -> Result<Vec<SafeTransaction>> {
    collateral_spenders(config)
        .into_iter()
        .map(|spender| {
            Ok(SafeTransaction::call(
                config.collateral,
                encode_approve(spender, U256::MAX)?,
            ))
        })
        .collect()
}

/// `setApprovalForAll` on the CTF for every outcome token operator.
pub fn outcome_token_approvals(config: &ContractConfig) -> Result<Vec<SafeTransaction>> {
    outcome_token_operators(config)
        .into_iter()
        .map(|operator| {
            Ok(SafeTransaction::call(
                config.conditional_tokens,
                encode_set_approval_for_all(operator, true)?,
            ))
        })
        .collect()
}

/// Every approval a fresh Safe needs before trading.
pub fn approval_transactions(config: &ContractConfig) -> Result<Vec<SafeTransaction>> {
    let mut transactions = collateral_approvals(config)?;
    transactions.extend(outcome_token_approvals(config)?);
    Ok(transactions)
}

/// USDC.e transfer out of the Safe. `amount` is in base units (6 decimals).
pub fn collateral_transfer(
    config: &ContractConfig,
    to: Address,
    amount: U256,
) -> Result<SafeTransaction> {
    if to == Address::ZERO {
        return Err(Error::validation("transfer target address is required"));
    }
    if amount.is_zero() {
        return Err(Error::validation("transfer amount must be > 0"));
    }
    Ok(SafeTransaction::call(config.collateral, encode_transfer(to, amount)?))
}

/// A split, merge or redeem of one condition's positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionCall {
    pub collateral: Address,
    pub parent_collection_id: B256,
    pub condition_id: B256,
    /// Partition for split/merge, index sets for redeem.
    pub index_sets: Vec<u64>,
}

impl PositionCall {
    /// Top-level binary market position with the given collateral.
    pub fn binary(collateral: Address, condition_id: B256) -> Self {
        Self {
            collateral,
            parent_collection_id: B256::ZERO,
            condition_id,
            index_sets: BINARY_PARTITION.to_vec(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.collateral == Address::ZERO {
            return Err(Error::validation("collateral token is required"));
        }
        if self.condition_id == B256::ZERO {
            return Err(Error::validation("condition id is required"));
        }
        if self.index_sets.is_empty() {
            return Err(Error::validation("index sets are required"));
        }
        Ok(())
    }

    fn index_sets(&self) -> Vec<U256> {
        self.index_sets.iter().map(|i| U256::from(*i)).collect()
    }

    /// `redeemPositions` on the CTF.
    pub fn redeem(&self, config: &ContractConfig) -> Result<SafeTransaction> {
        self.validate()?;
        let data = redeemPositionsCall {
            collateralToken: self.collateral,
            parentCollectionId: self.parent_collection_id,
            conditionId: self.condition_id,
            indexSets: self.index_sets(),
        }
        .abi_encode();
        Ok(SafeTransaction::call(config.conditional_tokens, data))
    }

    /// `splitPosition` of `amount` collateral base units into the partition.
    pub fn split(&self, config: &ContractConfig, amount: U256) -> Result<SafeTransaction> {
        self.validate()?;
        if amount.is_zero() {
            return Err(Error::validation("amount must be > 0"));
        }
        let data = splitPositionCall {
            collateralToken: self.collateral,
            parentCollectionId: self.parent_collection_id,
            conditionId: self.condition_id,
            partition: self.index_sets(),
            amount,
        }
        .abi_encode();
        Ok(SafeTransaction::call(config.conditional_tokens, data))
    }

    /// `mergePositions` of `amount` full sets back into collateral.
    pub fn merge(&self, config: &ContractConfig, amount: U256) -> Result<SafeTransaction> {
        self.validate()?;
        if amount.is_zero() {
            return Err(Error::validation("amount must be > 0"));
        }
        let data = mergePositionsCall {
            collateralToken: self.collateral,
            parentCollectionId: self.parent_collection_id,
            conditionId: self.condition_id,
            partition: self.index_sets(),
            amount,
        }
        .abi_encode();
        Ok(SafeTransaction::call(config.conditional_tokens, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clob_core::config::POLYGON_AMOY_CHAIN_ID;
    use clob_core::encoding::function_selector;

    sol! {
        function approve(address spender, uint256 amount);
        function setApprovalForAll(address operator, bool approved);
        function transfer(address to, uint256 amount);
    }

    fn polygon() -> &'static ContractConfig {
        ContractConfig::for_chain(POLYGON_CHAIN_ID).unwrap()
    }

    fn condition() -> B256 {
        B256::repeat_byte(0xc0)
    }

    #[test]
    fn test_static_calls_match_abi_encoder() {
        let spender = polygon().exchange;
        assert_eq!(
            encode_approve(spender, U256::MAX).unwrap(),
            approveCall {
                spender,
                amount: U256::MAX
            }
            .abi_encode()
        );
        assert_eq!(
            encode_set_approval_for_all(spender, true).unwrap(),
            setApprovalForAllCall {
                operator: spender,
                approved: true
            }
            .abi_encode()
        );
        assert_eq!(
            encode_transfer(spender, U256::from(1_500_000u64)).unwrap(),
            transferCall {
                to: spender,
                amount: U256::from(1_500_000u64)
            }
            .abi_encode()
        );
    }

    #[test]
    fn test_polygon_approval_batch() {
        let txs = approval_transactions(polygon()).unwrap();
        assert_eq!(txs.len(), 7);

        let (usdc, ctf): (Vec<_>, Vec<_>) = txs.iter().partition(|tx| tx.to == polygon().collateral);
        assert_eq!(usdc.len(), 4);
        assert_eq!(ctf.len(), 3);
        assert!(ctf.iter().all(|tx| tx.to == polygon().conditional_tokens));
        assert!(usdc
            .iter()
            .all(|tx| tx.data[..4] == function_selector("approve(address,uint256)")));
        assert!(ctf
            .iter()
            .all(|tx| tx.data[..4] == function_selector("setApprovalForAll(address,bool)")));
        assert!(collateral_spenders(polygon()).contains(&NEG_RISK_ADAPTER_ADDRESS));
    }

    #[test]
    fn test_amoy_skips_mainnet_adapter() {
        let amoy = ContractConfig::for_chain(POLYGON_AMOY_CHAIN_ID).unwrap();
        let spenders = collateral_spenders(amoy);
        assert_eq!(spenders.len(), 3);
        assert_eq!(outcome_token_operators(amoy).len(), 2);
    }

    #[test]
    fn test_redeem_encoding() {
        let call = PositionCall::binary(polygon().collateral, condition());
        let tx = call.redeem(polygon()).unwrap();
        assert_eq!(tx.to, polygon().conditional_tokens);

        let decoded = redeemPositionsCall::abi_decode(&tx.data).unwrap();
        assert_eq!(decoded.conditionId, condition());
        assert_eq!(decoded.parentCollectionId, B256::ZERO);
        assert_eq!(decoded.indexSets, vec![U256::from(1u64), U256::from(2u64)]);
        assert_eq!(
            tx.data[..4],
            function_selector("redeemPositions(address,bytes32,bytes32,uint256[])")
        );
    }

    #[test]
    fn test_split_and_merge_encoding() {
        let call = PositionCall::binary(polygon().collateral, condition());
        let amount = U256::from(10_000_000u64);

        let split = call.split(polygon(), amount).unwrap();
        let decoded = splitPositionCall::abi_decode(&split.data).unwrap();
        assert_eq!(decoded.amount, amount);
        assert_eq!(decoded.partition.len(), 2);

        let merge = call.merge(polygon(), amount).unwrap();
        let decoded = mergePositionsCall::abi_decode(&merge.data).unwrap();
        assert_eq!(decoded.collateralToken, polygon().collateral);
        assert_ne!(split.data, merge.data);
    }

    #[test]
    fn test_position_call_validation() {
        let mut call = PositionCall::binary(polygon().collateral, condition());
        assert!(call.split(polygon(), U256::ZERO).is_err());

        call.index_sets.clear();
        assert!(call.redeem(polygon()).is_err());

        let missing_condition = PositionCall::binary(polygon().collateral, B256::ZERO);
        let err = missing_condition.redeem(polygon()).unwrap_err();
        assert!(err.to_string().contains("condition id is required"));
    }

    #[test]
    fn test_transfer_validation() {
        let to: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();
        assert!(collateral_transfer(polygon(), Address::ZERO, U256::from(1u64)).is_err());
        assert!(collateral_transfer(polygon(), to, U256::ZERO).is_err());
        let tx = collateral_transfer(polygon(), to, U256::from(5u64)).unwrap();
        assert_eq!(tx.to, polygon().collateral);
    }
}

//! Builds and signs CTF Exchange orders.

use alloy_primitives::{Address, U256};
use std::str::FromStr;
use tracing::{debug, info};

use super::amounts::{get_market_order_amounts, get_order_amounts, OrderAmounts};
use super::rounding::{validate_price, TickSize};
use super::types::{generate_salt, MarketOrderArgs, OrderArgs, OrderData, Side, SignatureType, SignedOrder};
use crate::config::ContractConfig;
use crate::signing::WalletSigner;
use crate::{Error, Result};

/// Market metadata an order is built against.
///
/// Both fields are required by the builder. [`crate::api::ClobClient`] fills
/// missing values from the API before building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOrderOptions {
    pub tick_size: Option<TickSize>,
    pub neg_risk: Option<bool>,
}

impl CreateOrderOptions {
    pub fn new(tick_size: TickSize, neg_risk: bool) -> Self {
        Self {
            tick_size: Some(tick_size),
            neg_risk: Some(neg_risk),
        }
    }

    fn resolve(&self) -> Result<(TickSize, bool)> {
        let tick_size = self
            .tick_size
            .ok_or_else(|| Error::precondition("tick size is required to build an order"))?;
        let neg_risk = self
            .neg_risk
            .ok_or_else(|| Error::precondition("neg risk flag is required to build an order"))?;
        Ok((tick_size, neg_risk))
    }
}

/// Turns order intents into signed orders for one signer identity.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    signer: WalletSigner,
    chain_id: u64,
    signature_type: SignatureType,
    funder: Address,
}

impl OrderBuilder {
    /// `funder` defaults to the signer's own address.
    pub fn new(
        signer: WalletSigner,
        chain_id: u64,
        signature_type: SignatureType,
        funder: Option<Address>,
    ) -> Self {
        let funder = funder.unwrap_or_else(|| signer.address());
        Self {
            signer,
            chain_id,
            signature_type,
            funder,
        }
    }

    /// EOA signing for its own funds.
    pub fn eoa(signer: WalletSigner, chain_id: u64) -> Self {
        Self::new(signer, chain_id, SignatureType::Eoa, None)
    }

    /// Custodial account signing for the Safe that holds its funds.
    pub fn for_safe(signer: WalletSigner, chain_id: u64, safe: Address) -> Self {
        Self::new(signer, chain_id, SignatureType::PolyGnosisSafe, Some(safe))
    }

    pub fn signer(&self) -> &WalletSigner {
        &self.signer
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn funder(&self) -> Address {
        self.funder
    }

    pub fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    /// Build the unsigned limit order.
    pub fn build_order(&self, args: &OrderArgs, options: &CreateOrderOptions) -> Result<OrderData> {
        let (tick_size, _) = options.resolve()?;
        validate_price(args.price, tick_size)?;

        let amounts = get_order_amounts(
            args.side,
            args.size,
            args.price,
            tick_size.rounding_profile(),
        )?;

        self.order_data(
            &args.token_id,
            args.side,
            amounts,
            args.taker,
            args.expiration,
            args.nonce,
            args.fee_rate_bps,
        )
    }

    /// Build the unsigned market order. Expiration is always zero.
    pub fn build_market_order(
        &self,
        args: &MarketOrderArgs,
        options: &CreateOrderOptions,
    ) -> Result<OrderData> {
        let (tick_size, _) = options.resolve()?;
        validate_price(args.price, tick_size)?;

        let amounts = get_market_order_amounts(
            args.side,
            args.amount,
            args.price,
            tick_size.rounding_profile(),
        )?;

        self.order_data(
            &args.token_id,
            args.side,
            amounts,
            args.taker,
            0,
            args.nonce,
            args.fee_rate_bps,
        )
    }

    /// Build and sign a limit order.
    pub async fn create_order(
        &self,
        args: &OrderArgs,
        options: &CreateOrderOptions,
    ) -> Result<SignedOrder> {
        let order = self.build_order(args, options)?;
        info!(
            token_id = %args.token_id,
            side = %args.side,
            price = %args.price,
            size = %args.size,
            maker_amount = %order.maker_amount,
            taker_amount = %order.taker_amount,
            "Built limit order"
        );
        self.sign_order(&order, options).await
    }

    /// Build and sign a market order.
    pub async fn create_market_order(
        &self,
        args: &MarketOrderArgs,
        options: &CreateOrderOptions,
    ) -> Result<SignedOrder> {
        let order = self.build_market_order(args, options)?;
        info!(
            token_id = %args.token_id,
            side = %args.side,
            price = %args.price,
            amount = %args.amount,
            maker_amount = %order.maker_amount,
            taker_amount = %order.taker_amount,
            "Built market order"
        );
        self.sign_order(&order, options).await
    }

    /// Sign against the exchange selected by the neg-risk flag.
    pub async fn sign_order(
        &self,
        order: &OrderData,
        options: &CreateOrderOptions,
    ) -> Result<SignedOrder> {
        let (_, neg_risk) = options.resolve()?;
        let exchange = ContractConfig::for_chain(self.chain_id)?.exchange_for(neg_risk);

        let digest = order.digest(self.chain_id, exchange);
        debug!(
            digest = %digest,
            exchange = %exchange,
            neg_risk,
            "Signing order"
        );

        let signature = self.signer.sign_digest(digest).await?;
        Ok(SignedOrder::from_order_data(order, &signature))
    }

    #[allow(clippy::too_many_arguments)]
    fn order_data(
        &self,
        token_id: &str,
        side: Side,
        amounts: OrderAmounts,
        taker: Address,
        expiration: u64,
        nonce: u64,
        fee_rate_bps: u64,
    ) -> Result<OrderData> {
        let token_id = U256::from_str(token_id.trim())
            .map_err(|_| Error::validation(format!("invalid token id: {:?}", token_id)))?;

        Ok(OrderData {
            salt: U256::from(generate_salt()),
            maker: self.funder,
            signer: self.signer.address(),
            taker,
            token_id,
            maker_amount: amounts.maker_amount,
            taker_amount: amounts.taker_amount,
            expiration: U256::from(expiration),
            nonce: U256::from(nonce),
            fee_rate_bps: U256::from(fee_rate_bps),
            side,
            signature_type: self.signature_type,
        })
    }
}

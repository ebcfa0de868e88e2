//! Order types for Polymarket CLOB signing.
//!
//! Defines the canonical order struct hashed for EIP-712 signing and the
//! wire representation submitted to the CLOB API.

use alloy_primitives::{Address, B256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::encoding::{Eip712Domain, StructEncoder, Token};
use crate::signing::RawSignature;
use crate::{Error, Result};

/// EIP-712 type string of the CTF Exchange `Order` struct.
pub const ORDER_TYPE: &str = "Order(uint256 salt,address maker,address signer,address taker,uint256 tokenId,uint256 makerAmount,uint256 takerAmount,uint256 expiration,uint256 nonce,uint256 feeRateBps,uint8 side,uint8 signatureType)";

/// Name of the exchange contract's EIP-712 domain.
pub const EXCHANGE_DOMAIN_NAME: &str = "Polymarket CTF Exchange";

/// Version of the exchange contract's EIP-712 domain.
pub const EXCHANGE_DOMAIN_VERSION: &str = "1";

/// Order side (buy/sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the numeric value for signing.
    pub fn as_u8(&self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(Error::validation(format!(
                "invalid side {:?}: must be BUY or SELL",
                other
            ))),
        }
    }
}

/// Who signs on behalf of the maker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SignatureType {
    /// Externally owned account signing for itself.
    #[default]
    Eoa,
    /// Polymarket proxy wallet.
    PolyProxy,
    /// Gnosis Safe wallet.
    PolyGnosisSafe,
}

impl SignatureType {
    /// Get the numeric value for signing.
    pub fn as_u8(&self) -> u8 {
        match self {
            SignatureType::Eoa => 0,
            SignatureType::PolyProxy => 1,
            SignatureType::PolyGnosisSafe => 2,
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(value: SignatureType) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for SignatureType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SignatureType::Eoa),
            1 => Ok(SignatureType::PolyProxy),
            2 => Ok(SignatureType::PolyGnosisSafe),
            other => Err(Error::validation(format!(
                "invalid signature type: {}",
                other
            ))),
        }
    }
}

/// Order type for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Good-till-cancelled limit order.
    #[default]
    Gtc,
    /// Fill-or-kill market order.
    Fok,
    /// Good-till-date limit order.
    Gtd,
    /// Fill-and-kill market order.
    Fak,
}

impl FromStr for OrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GTC" => Ok(OrderType::Gtc),
            "FOK" => Ok(OrderType::Fok),
            "GTD" => Ok(OrderType::Gtd),
            "FAK" => Ok(OrderType::Fak),
            other => Err(Error::validation(format!("invalid order type: {}", other))),
        }
    }
}

/// Limit order intent. `size` is in outcome tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderArgs {
    /// Outcome token ID (decimal string).
    pub token_id: String,
    pub price: Decimal,
    pub size: Decimal,
    pub side: Side,
    pub fee_rate_bps: u64,
    pub nonce: u64,
    /// Unix seconds, 0 = never.
    pub expiration: u64,
    /// Zero for a public order.
    pub taker: Address,
}

impl OrderArgs {
    pub fn new(token_id: impl Into<String>, price: Decimal, size: Decimal, side: Side) -> Self {
        Self {
            token_id: token_id.into(),
            price,
            size,
            side,
            fee_rate_bps: 0,
            nonce: 0,
            expiration: 0,
            taker: Address::ZERO,
        }
    }

    pub fn with_fee_rate_bps(mut self, fee_rate_bps: u64) -> Self {
        self.fee_rate_bps = fee_rate_bps;
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_expiration(mut self, expiration: u64) -> Self {
        self.expiration = expiration;
        self
    }

    pub fn with_taker(mut self, taker: Address) -> Self {
        self.taker = taker;
        self
    }
}

/// Market order intent. `amount` is collateral for BUY, outcome tokens for SELL.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOrderArgs {
    pub token_id: String,
    pub amount: Decimal,
    pub side: Side,
    /// Worst acceptable price.
    pub price: Decimal,
    pub fee_rate_bps: u64,
    pub nonce: u64,
    pub taker: Address,
    pub order_type: OrderType,
}

impl MarketOrderArgs {
    pub fn new(token_id: impl Into<String>, amount: Decimal, side: Side, price: Decimal) -> Self {
        Self {
            token_id: token_id.into(),
            amount,
            side,
            price,
            fee_rate_bps: 0,
            nonce: 0,
            taker: Address::ZERO,
            order_type: OrderType::Fok,
        }
    }

    pub fn with_fee_rate_bps(mut self, fee_rate_bps: u64) -> Self {
        self.fee_rate_bps = fee_rate_bps;
        self
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }
}

/// Raw order data for EIP-712 signing.
///
/// This matches the struct used by the CTF Exchange contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderData {
    /// Random salt for uniqueness.
    pub salt: U256,
    /// Funding address (Safe for custodial accounts).
    pub maker: Address,
    /// Address whose key signs the order.
    pub signer: Address,
    /// Taker address (zero for any taker).
    pub taker: Address,
    pub token_id: U256,
    /// Maker amount in base units.
    pub maker_amount: U256,
    /// Taker amount in base units.
    pub taker_amount: U256,
    pub expiration: U256,
    pub nonce: U256,
    pub fee_rate_bps: U256,
    pub side: Side,
    pub signature_type: SignatureType,
}

impl OrderData {
    /// Compute the EIP-712 struct hash for this order.
    pub fn struct_hash(&self) -> B256 {
        StructEncoder::new(ORDER_TYPE)
            .fields([
                Token::Uint(self.salt),
                Token::Address(self.maker),
                Token::Address(self.signer),
                Token::Address(self.taker),
                Token::Uint(self.token_id),
                Token::Uint(self.maker_amount),
                Token::Uint(self.taker_amount),
                Token::Uint(self.expiration),
                Token::Uint(self.nonce),
                Token::Uint(self.fee_rate_bps),
                Token::Uint8(self.side.as_u8()),
                Token::Uint8(self.signature_type.as_u8()),
            ])
            .hash()
    }

    /// Signable digest against the given exchange contract.
    pub fn digest(&self, chain_id: u64, exchange: Address) -> B256 {
        exchange_domain(chain_id, exchange).digest(self.struct_hash())
    }
}

/// EIP-712 domain of a CTF Exchange deployment.
pub fn exchange_domain(chain_id: u64, exchange: Address) -> Eip712Domain {
    Eip712Domain::new(
        EXCHANGE_DOMAIN_NAME,
        EXCHANGE_DOMAIN_VERSION,
        chain_id,
        exchange,
    )
}

/// Mask keeping salts within the IEEE 754 safe integer range.
const SALT_MASK: u64 = (1u64 << 53) - 1;

/// Generate a random salt for order uniqueness.
///
/// Current time in nanoseconds scaled by a random fraction, masked to
/// 2^53-1 so it survives JSON number parsing on the server.
pub fn generate_salt() -> u64 {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .unsigned_abs();
    let scaled = (nanos as f64 * rand::random::<f64>()).round() as u64;
    scaled & SALT_MASK
}

/// A signed order ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    /// Order salt (must be a JSON number).
    pub salt: u64,
    pub maker: String,
    pub signer: String,
    pub taker: String,
    pub token_id: String,
    pub maker_amount: String,
    pub taker_amount: String,
    pub expiration: String,
    pub nonce: String,
    pub fee_rate_bps: String,
    pub side: Side,
    pub signature_type: SignatureType,
    /// EIP-712 signature as hex string.
    pub signature: String,
}

impl SignedOrder {
    /// Create from order data and signature.
    pub fn from_order_data(order: &OrderData, signature: &RawSignature) -> Self {
        Self {
            salt: order.salt.saturating_to::<u64>(),
            maker: order.maker.to_checksum(None),
            signer: order.signer.to_checksum(None),
            taker: order.taker.to_checksum(None),
            token_id: order.token_id.to_string(),
            maker_amount: order.maker_amount.to_string(),
            taker_amount: order.taker_amount.to_string(),
            expiration: order.expiration.to_string(),
            nonce: order.nonce.to_string(),
            fee_rate_bps: order.fee_rate_bps.to_string(),
            side: order.side,
            signature_type: order.signature_type,
            signature: signature.to_hex(),
        }
    }
}

/// Request body for posting an order.
#[derive(Debug, Clone, Serialize)]
pub struct PostOrderRequest {
    pub order: SignedOrder,
    /// API key of the order owner.
    pub owner: String,
    #[serde(rename = "orderType")]
    pub order_type: OrderType,
    /// Post-only flag. Omitted when None.
    #[serde(rename = "postOnly", skip_serializing_if = "Option::is_none")]
    pub post_only: Option<bool>,
}

impl PostOrderRequest {
    pub fn new(order: SignedOrder, owner: impl Into<String>, order_type: OrderType) -> Self {
        Self {
            order,
            owner: owner.into(),
            order_type,
            post_only: None,
        }
    }

    /// Serialize once. These exact bytes are both HMAC-signed and sent.
    pub fn to_body(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

//! Order construction: rounding, amount derivation, EIP-712 hashing and signing.
//!
//! ```ignore
//! use clob_core::order::{CreateOrderOptions, OrderArgs, OrderBuilder, Side, TickSize};
//!
//! let builder = OrderBuilder::eoa(signer, 137);
//! let args = OrderArgs::new(token_id, dec!(0.15), dec!(8), Side::Buy);
//! let signed = builder
//!     .create_order(&args, &CreateOrderOptions::new(TickSize::Hundredth, false))
//!     .await?;
//! ```

pub mod amounts;
pub mod builder;
pub mod rounding;
pub mod types;

pub use amounts::{get_market_order_amounts, get_order_amounts, resolve_fee_rate, OrderAmounts};
pub use builder::{CreateOrderOptions, OrderBuilder};
pub use rounding::{
    decimal_places, fix_amount_precision, price_valid, round_down, round_normal, round_up,
    to_token_decimals, validate_price, RoundingProfile, TickSize, TOKEN_DECIMALS,
};
pub use types::{
    exchange_domain, generate_salt, MarketOrderArgs, OrderArgs, OrderData, OrderType,
    PostOrderRequest, Side, SignatureType, SignedOrder, ORDER_TYPE,
};

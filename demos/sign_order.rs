//! Sign a limit order offline and print the request body.
//!
//! Run with: `WALLET_PRIVATE_KEY=0x... cargo run --example sign_order`

use anyhow::Result;
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clob_core::config::Settings;
use clob_core::order::{
    CreateOrderOptions, OrderArgs, OrderBuilder, OrderType, PostOrderRequest, Side, TickSize,
};
use clob_core::signing::LocalSigner;
use safe_relayer::derive_safe_address;

const TOKEN_ID: &str =
    "71321045679252212594626385532706912750332728571942532289631379312455583992563";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clob_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    let signer = LocalSigner::from_env()?;
    let owner = signer.address();
    let safe = derive_safe_address(owner, settings.contracts()?.safe_factory);
    tracing::info!(owner = %owner, safe = %safe, "Signing for Safe");

    let builder = OrderBuilder::for_safe(signer.into(), settings.chain_id, safe);
    let args = OrderArgs::new(TOKEN_ID, Decimal::new(50, 2), Decimal::new(10, 0), Side::Buy);
    let order = builder
        .create_order(&args, &CreateOrderOptions::new(TickSize::Hundredth, false))
        .await?;

    let api_key = settings
        .api_credentials
        .as_ref()
        .map(|c| c.api_key.clone())
        .unwrap_or_default();
    let request = PostOrderRequest::new(order, api_key, OrderType::Gtc);
    println!("{}", request.to_body()?);

    Ok(())
}

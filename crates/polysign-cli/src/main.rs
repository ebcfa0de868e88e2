//! Polysign
//!
//! Offline order signing, request authentication headers and Safe relayer
//! operations for Polymarket.

use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use clob_core::auth::{
    create_level1_headers, create_level2_headers, current_timestamp, AuthHeaders, RequestArgs,
};
use clob_core::config::Settings;
use clob_core::order::{CreateOrderOptions, OrderArgs, OrderBuilder, Side, TickSize};
use clob_core::signing::{LocalSigner, RawSignature, WalletSigner};
use rust_decimal::Decimal;
use safe_relayer::{
    derive_safe_address, pack_safe_signature, PollOutcome, RelayClient, RelayerTransactionState,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Polymarket signing toolkit
#[derive(Debug, Parser)]
#[clap(name = "polysign", version)]
struct Cli {
    /// Settings file (TOML, YAML or JSON). Environment variables otherwise.
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Log as JSON lines
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the Safe address owned by an address
    SafeAddress {
        /// Owner address, defaults to the configured key
        #[clap(long)]
        owner: Option<Address>,
    },
    /// Build and sign a limit order, printing the wire JSON
    SignOrder {
        #[clap(long)]
        token_id: String,
        #[clap(long)]
        price: Decimal,
        #[clap(long)]
        size: Decimal,
        /// BUY or SELL
        #[clap(long)]
        side: Side,
        /// One of 0.1, 0.01, 0.001, 0.0001
        #[clap(long, default_value = "0.01")]
        tick_size: TickSize,
        #[clap(long)]
        neg_risk: bool,
        #[clap(long, default_value_t = 0)]
        fee_rate_bps: u64,
        #[clap(long, default_value_t = 0)]
        nonce: u64,
        /// Unix seconds, 0 for no expiry
        #[clap(long, default_value_t = 0)]
        expiration: u64,
        /// Fund the order from the key's Safe
        #[clap(long)]
        safe: bool,
    },
    /// Print L1 (wallet signature) headers for API key management
    L1Headers {
        #[clap(long, default_value_t = 0)]
        nonce: u64,
    },
    /// Print L2 (HMAC) headers for a request
    L2Headers {
        #[clap(long, default_value = "GET")]
        method: String,
        #[clap(long)]
        path: String,
        #[clap(long)]
        body: Option<String>,
    },
    /// Re-encode a 65-byte signature for Safe `eth_sign` verification
    PackSignature {
        /// 0x-prefixed r || s || v
        signature: String,
    },
    /// Query the relayer for the key's Safe
    SafeStatus,
    /// Deploy the key's Safe through the relayer
    DeploySafe {
        /// Wait for the deployment to be mined
        #[clap(long)]
        wait: bool,
    },
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::from_env().context("failed to load settings from environment")?,
    };
    Ok(settings)
}

fn local_signer(settings: &Settings) -> Result<WalletSigner> {
    let key = settings
        .private_key
        .as_deref()
        .ok_or_else(|| anyhow!("WALLET_PRIVATE_KEY is not set"))?;
    Ok(LocalSigner::from_private_key(key)?.into())
}

fn headers_json(headers: &AuthHeaders) -> serde_json::Value {
    headers
        .iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "polysign=info,clob_core=warn,safe_relayer=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match cli.command {
        Command::PackSignature { signature } => {
            let raw = RawSignature::from_hex(&signature)?;
            println!("{}", pack_safe_signature(&raw)?.to_hex());
        }
        Command::SafeAddress { owner } => {
            let settings = load_settings(cli.config.as_ref())?;
            let owner = match owner {
                Some(owner) => owner,
                None => local_signer(&settings)?.address(),
            };
            let safe = derive_safe_address(owner, settings.contracts()?.safe_factory);
            println!("{}", safe.to_checksum(None));
        }
        Command::SignOrder {
            token_id,
            price,
            size,
            side,
            tick_size,
            neg_risk,
            fee_rate_bps,
            nonce,
            expiration,
            safe,
        } => {
            let settings = load_settings(cli.config.as_ref())?;
            let signer = local_signer(&settings)?;
            let builder = if safe {
                let funder = derive_safe_address(signer.address(), settings.contracts()?.safe_factory);
                OrderBuilder::for_safe(signer, settings.chain_id, funder)
            } else {
                OrderBuilder::eoa(signer, settings.chain_id)
            };

            let args = OrderArgs::new(token_id, price, size, side)
                .with_fee_rate_bps(fee_rate_bps)
                .with_nonce(nonce)
                .with_expiration(expiration);
            let order = builder
                .create_order(&args, &CreateOrderOptions::new(tick_size, neg_risk))
                .await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
        Command::L1Headers { nonce } => {
            let settings = load_settings(cli.config.as_ref())?;
            let signer = local_signer(&settings)?;
            let headers =
                create_level1_headers(&signer, settings.chain_id, current_timestamp(), nonce)
                    .await?;
            println!("{}", serde_json::to_string_pretty(&headers_json(&headers))?);
        }
        Command::L2Headers { method, path, body } => {
            let settings = load_settings(cli.config.as_ref())?;
            let signer = local_signer(&settings)?;
            let credentials = settings
                .api_credentials
                .as_ref()
                .ok_or_else(|| anyhow!("POLY_API_KEY, POLY_API_SECRET and POLY_API_PASSPHRASE are not set"))?;

            let mut request = RequestArgs::new(method.to_uppercase(), path);
            if let Some(body) = body {
                request = request.with_body(body);
            }
            let headers = create_level2_headers(
                signer.address(),
                credentials,
                &request,
                &current_timestamp().to_string(),
            )?;
            println!("{}", serde_json::to_string_pretty(&headers_json(&headers))?);
        }
        Command::SafeStatus => {
            let settings = load_settings(cli.config.as_ref())?;
            let signer = local_signer(&settings)?;
            let owner = signer.address();
            let client = RelayClient::from_settings(&settings, Some(signer))?;
            let safe = client.safe_address(owner);

            let deployed = client.is_deployed(safe).await?;
            let nonce = client.get_nonce(owner).await?;
            let status = serde_json::json!({
                "owner": owner.to_checksum(None),
                "safe": safe.to_checksum(None),
                "deployed": deployed,
                "relayerNonce": nonce.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::DeploySafe { wait } => {
            let settings = load_settings(cli.config.as_ref())?;
            let signer = local_signer(&settings)?;
            let client = RelayClient::from_settings(&settings, Some(signer))?;

            let (safe, response) = client.deploy().await?;
            info!(safe = %safe, transaction_id = %response.transaction_id, "Deployment submitted");

            if wait {
                let outcome = client
                    .poll_until_state(
                        &response.transaction_id,
                        &[RelayerTransactionState::Mined, RelayerTransactionState::Confirmed],
                        RelayerTransactionState::Failed,
                        60,
                        Duration::from_secs(2),
                    )
                    .await?;
                match outcome {
                    PollOutcome::Reached(tx) => {
                        info!(transaction_hash = %tx.transaction_hash, "Safe deployed")
                    }
                    PollOutcome::Failed(tx) => {
                        return Err(anyhow!("deployment {} failed", tx.transaction_id))
                    }
                    PollOutcome::TimedOut => {
                        return Err(anyhow!("timed out waiting for deployment"))
                    }
                }
            }
            println!("{}", safe.to_checksum(None));
        }
    }

    Ok(())
}

//! Benchmarks for the order and Safe signing hot paths.
//!
//! Run with: `cargo bench --bench signing`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;

use alloy_primitives::{Address, U256};
use clob_core::auth::build_hmac_signature;
use clob_core::config::{ContractConfig, POLYGON_CHAIN_ID};
use clob_core::order::{
    get_order_amounts, CreateOrderOptions, OrderArgs, OrderBuilder, Side, TickSize,
};
use clob_core::signing::{LocalSigner, WalletSigner};
use safe_relayer::{aggregate_transactions, derive_safe_address, SafeTransaction, SafeTx};

const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const TOKEN_ID: &str =
    "71321045679252212594626385532706912750332728571942532289631379312455583992563";

fn signer() -> WalletSigner {
    LocalSigner::from_private_key(TEST_PRIVATE_KEY)
        .expect("valid key")
        .into()
}

/// Benchmark amount derivation across tick sizes.
fn bench_order_amounts(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_amounts");

    for tick in TickSize::ALL {
        group.bench_with_input(BenchmarkId::new("buy", tick), &tick, |b, tick| {
            let profile = tick.rounding_profile();
            b.iter(|| {
                get_order_amounts(
                    black_box(Side::Buy),
                    black_box(Decimal::new(12345, 2)),
                    black_box(Decimal::new(5, 1)),
                    profile,
                )
            })
        });
    }

    group.finish();
}

/// Benchmark building, hashing and signing a limit order.
fn bench_order_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_signing");
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let builder = OrderBuilder::eoa(signer(), POLYGON_CHAIN_ID);
    let options = CreateOrderOptions::new(TickSize::Hundredth, false);
    let args = OrderArgs::new(TOKEN_ID, Decimal::new(55, 2), Decimal::new(100, 0), Side::Buy);
    let exchange = ContractConfig::for_chain(POLYGON_CHAIN_ID)
        .expect("polygon")
        .exchange;

    group.bench_function("build_and_digest", |b| {
        b.iter(|| {
            let order = builder.build_order(black_box(&args), &options).expect("order");
            order.digest(POLYGON_CHAIN_ID, exchange)
        })
    });

    group.bench_function("create_order", |b| {
        b.iter(|| runtime.block_on(builder.create_order(black_box(&args), &options)))
    });

    group.finish();
}

/// Benchmark request HMACs with growing bodies.
fn bench_hmac(c: &mut Criterion) {
    let mut group = c.benchmark_group("hmac");
    let secret = "c2VjcmV0LXNlY3JldC1zZWNyZXQ=";

    for size in [0usize, 256, 4096].iter() {
        let body = "x".repeat(*size);
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("post", size), &body, |b, body| {
            b.iter(|| {
                build_hmac_signature(
                    secret,
                    "1700000000",
                    "POST",
                    "/order",
                    Some(black_box(body.as_str())),
                )
            })
        });
    }

    group.finish();
}

/// Benchmark Safe address derivation and SafeTx hashing of MultiSend batches.
fn bench_safe(c: &mut Criterion) {
    let mut group = c.benchmark_group("safe");
    let config = ContractConfig::for_chain(POLYGON_CHAIN_ID).expect("polygon");
    let owner: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        .parse()
        .expect("address");

    group.bench_function("derive_address", |b| {
        b.iter(|| derive_safe_address(black_box(owner), config.safe_factory))
    });

    let safe = derive_safe_address(owner, config.safe_factory);
    for count in [1usize, 7, 32].iter() {
        let calls: Vec<SafeTransaction> = (0..*count)
            .map(|i| SafeTransaction::call(config.collateral, vec![i as u8; 68]))
            .collect();
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("multisend_digest", count), &calls, |b, calls| {
            b.iter(|| {
                let tx = aggregate_transactions(black_box(calls), config.safe_multisend)
                    .expect("batch");
                SafeTx::new(&tx, U256::from(3u64)).digest(POLYGON_CHAIN_ID, safe)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_order_amounts,
    bench_order_signing,
    bench_hmac,
    bench_safe,
);

criterion_main!(benches);

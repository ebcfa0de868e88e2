//! API clients for external services.

pub mod clob;

pub use clob::{
    AccessLevel, CancelOrdersResponse, ClobClient, PostOrderResponse, L1_AUTH_UNAVAILABLE,
    L2_AUTH_UNAVAILABLE,
};

//! Request authentication: `ClobAuth` wallet proofs, L2 HMAC and builder
//! attribution headers.

pub mod credentials;
pub mod headers;
pub mod hmac;

pub use credentials::{ApiCredentials, BuilderConfig};
pub use headers::{
    clob_auth_digest, clob_auth_domain, create_level1_headers, create_level2_headers,
    current_timestamp, AuthHeaders, RequestArgs, CLOB_AUTH_MESSAGE, CLOB_AUTH_TYPE,
};
pub use hmac::{build_hmac_signature, verify_hmac_signature};

pub(crate) use credentials::ApiKeyResponse;

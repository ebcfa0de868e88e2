//! HMAC-SHA256 request signatures for L2 and builder headers.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Decode an API secret. Secrets are issued as padded URL-safe base64;
/// anything else is used as raw bytes.
fn secret_key(secret: &str) -> Vec<u8> {
    URL_SAFE
        .decode(secret)
        .unwrap_or_else(|_| secret.as_bytes().to_vec())
}

fn keyed_mac(
    secret: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: Option<&str>,
) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(&secret_key(secret))
        .map_err(|e| Error::signing(format!("Failed to create HMAC: {}", e)))?;

    // timestamp + method + path + body
    mac.update(timestamp.as_bytes());
    mac.update(method.as_bytes());
    mac.update(request_path.as_bytes());
    if let Some(body) = body {
        mac.update(body.as_bytes());
    }
    Ok(mac)
}

/// Sign a request. `body` must be the exact bytes that go on the wire.
///
/// Output is standard base64 with `+` and `/` swapped for `-` and `_`.
pub fn build_hmac_signature(
    secret: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: Option<&str>,
) -> Result<String> {
    let digest = keyed_mac(secret, timestamp, method, request_path, body)?
        .finalize()
        .into_bytes();
    Ok(STANDARD.encode(digest).replace('+', "-").replace('/', "_"))
}

/// Constant-time check of a signature produced by [`build_hmac_signature`].
pub fn verify_hmac_signature(
    secret: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: Option<&str>,
    signature: &str,
) -> bool {
    let Ok(expected) = URL_SAFE.decode(signature) else {
        return false;
    };
    match keyed_mac(secret, timestamp, method, request_path, body) {
        Ok(mac) => mac.verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}

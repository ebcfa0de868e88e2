//! Safe signature packing.

use clob_core::signing::RawSignature;
use clob_core::{Error, Result};

use crate::model::PackedSafeSignature;

/// Re-encode an ECDSA signature over a personal-message digest for the Safe.
///
/// The Safe treats `v > 30` as an `eth_sign` approval and subtracts 4
/// before recovery, so `v` 0/1 maps to 31/32 and 27/28 maps to 31/32.
/// Any other `v` is rejected.
pub fn pack_safe_signature(signature: &RawSignature) -> Result<PackedSafeSignature> {
    let v = match signature.v() {
        v @ (0 | 1) => v + 31,
        v @ (27 | 28) => v + 4,
        other => {
            return Err(Error::validation(format!(
                "invalid signature v value: {}",
                other
            )))
        }
    };
    Ok(PackedSafeSignature(signature.with_v(v)))
}

//! 65-byte ECDSA signatures in `r ++ s ++ v` layout.

use alloy_primitives::B256;

use crate::encoding::{decode_hex, encode_hex};
use crate::{Error, Result};

/// Raw secp256k1 signature, `r (32) ++ s (32) ++ v (1)`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawSignature([u8; 65]);

impl RawSignature {
    pub const LEN: usize = 65;

    pub fn new(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    /// Build from a byte slice that must be exactly 65 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; 65] = bytes.try_into().map_err(|_| {
            Error::signing(format!(
                "signature must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Parse a `0x`-optional hex signature of exactly 130 hex characters.
    pub fn from_hex(value: &str) -> Result<Self> {
        let digits = value.trim().trim_start_matches("0x");
        if digits.len() != Self::LEN * 2 {
            return Err(Error::signing(format!(
                "signature hex length={} (want {})",
                digits.len(),
                Self::LEN * 2
            )));
        }
        Self::from_slice(&decode_hex(digits)?)
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    pub fn r(&self) -> B256 {
        B256::from_slice(&self.0[..32])
    }

    pub fn s(&self) -> B256 {
        B256::from_slice(&self.0[32..64])
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Copy with a replaced recovery byte.
    pub fn with_v(mut self, v: u8) -> Self {
        self.0[64] = v;
        self
    }

    /// Lift a bare recovery id (0/1) to the 27/28 convention.
    pub fn normalized(self) -> Self {
        if self.v() < 27 {
            let v = self.v() + 27;
            self.with_v(v)
        } else {
            self
        }
    }

    /// `0x` followed by 130 hex characters.
    pub fn to_hex(&self) -> String {
        encode_hex(self.0)
    }
}

impl From<alloy_primitives::Signature> for RawSignature {
    fn from(signature: alloy_primitives::Signature) -> Self {
        Self(signature.as_bytes())
    }
}

impl std::fmt::Debug for RawSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawSignature({})", self.to_hex())
    }
}

impl std::fmt::Display for RawSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(v: u8) -> RawSignature {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&[0x11; 32]);
        bytes[32..64].copy_from_slice(&[0x22; 32]);
        bytes[64] = v;
        RawSignature::new(bytes)
    }

    #[test]
    fn test_components() {
        let sig = sample(27);
        assert_eq!(sig.r(), B256::repeat_byte(0x11));
        assert_eq!(sig.s(), B256::repeat_byte(0x22));
        assert_eq!(sig.v(), 27);
    }

    #[test]
    fn test_hex_roundtrip_and_length() {
        let sig = sample(28);
        let hex = sig.to_hex();
        assert_eq!(hex.len(), 132);
        assert_eq!(RawSignature::from_hex(&hex).unwrap(), sig);
        assert_eq!(RawSignature::from_hex(&hex[2..]).unwrap(), sig);

        let short = &hex[..130];
        assert!(matches!(
            RawSignature::from_hex(short),
            Err(Error::Signing { .. })
        ));
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        assert!(RawSignature::from_slice(&[0u8; 64]).is_err());
        assert!(RawSignature::from_slice(&[0u8; 66]).is_err());
        assert!(RawSignature::from_slice(&[0u8; 65]).is_ok());
    }

    #[test]
    fn test_normalized() {
        assert_eq!(sample(0).normalized().v(), 27);
        assert_eq!(sample(1).normalized().v(), 28);
        assert_eq!(sample(27).normalized().v(), 27);
        assert_eq!(sample(28).normalized().v(), 28);
    }
}

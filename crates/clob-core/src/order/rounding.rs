//! Decimal rounding and tick-size profiles for order amounts.
//!
//! All arithmetic stays in [`Decimal`] until the final conversion to
//! 6-decimal token units. Floats never touch an amount.

use alloy_primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Error, Result};

/// Fixed-point scale of collateral and outcome tokens.
pub const TOKEN_DECIMALS: u32 = 6;

/// Round toward negative infinity at `decimals` places.
pub fn round_down(x: Decimal, decimals: u32) -> Decimal {
    x.round_dp_with_strategy(decimals, RoundingStrategy::ToNegativeInfinity)
}

/// Round half away from zero at `decimals` places.
pub fn round_normal(x: Decimal, decimals: u32) -> Decimal {
    x.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Round toward positive infinity at `decimals` places.
pub fn round_up(x: Decimal, decimals: u32) -> Decimal {
    x.round_dp_with_strategy(decimals, RoundingStrategy::ToPositiveInfinity)
}

/// Number of significant fractional digits, ignoring trailing zeros.
pub fn decimal_places(x: Decimal) -> u32 {
    x.normalize().scale()
}

/// Scale a human amount to 6-decimal base units, rounding half-up.
pub fn to_token_decimals(x: Decimal) -> Result<U256> {
    let scaled = x
        .checked_mul(Decimal::from(10u64.pow(TOKEN_DECIMALS)))
        .ok_or_else(|| Error::validation(format!("amount {} overflows token units", x)))?;
    let units = round_normal(scaled, 0);
    if units.is_sign_negative() && !units.is_zero() {
        return Err(Error::validation(format!("amount cannot be negative: {}", x)));
    }
    let units = units
        .to_u128()
        .ok_or_else(|| Error::validation(format!("amount {} overflows token units", x)))?;
    Ok(U256::from(units))
}

/// Trim a derived amount to `amount_decimals` places.
///
/// Rounds up at four extra places first so values like `0.999999999` settle
/// at the next unit, then rounds down if anything is still left over.
pub fn fix_amount_precision(x: Decimal, amount_decimals: u32) -> Decimal {
    if decimal_places(x) <= amount_decimals {
        return x;
    }
    let widened = round_up(x, amount_decimals + 4);
    if decimal_places(widened) > amount_decimals {
        round_down(widened, amount_decimals)
    } else {
        widened
    }
}

/// Decimal places used for price, size and derived amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingProfile {
    pub price: u32,
    pub size: u32,
    pub amount: u32,
}

impl RoundingProfile {
    pub const fn new(price: u32, size: u32, amount: u32) -> Self {
        Self {
            price,
            size,
            amount,
        }
    }
}

/// Minimum price increment a market accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TickSize {
    Tenth,
    Hundredth,
    Thousandth,
    TenThousandth,
}

impl TickSize {
    pub const ALL: [TickSize; 4] = [
        TickSize::Tenth,
        TickSize::Hundredth,
        TickSize::Thousandth,
        TickSize::TenThousandth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TickSize::Tenth => "0.1",
            TickSize::Hundredth => "0.01",
            TickSize::Thousandth => "0.001",
            TickSize::TenThousandth => "0.0001",
        }
    }

    pub fn as_decimal(&self) -> Decimal {
        match self {
            TickSize::Tenth => Decimal::new(1, 1),
            TickSize::Hundredth => Decimal::new(1, 2),
            TickSize::Thousandth => Decimal::new(1, 3),
            TickSize::TenThousandth => Decimal::new(1, 4),
        }
    }

    /// Rounding table keyed by tick size.
    pub fn rounding_profile(&self) -> RoundingProfile {
        match self {
            TickSize::Tenth => RoundingProfile::new(1, 2, 3),
            TickSize::Hundredth => RoundingProfile::new(2, 2, 4),
            TickSize::Thousandth => RoundingProfile::new(3, 2, 5),
            TickSize::TenThousandth => RoundingProfile::new(4, 2, 6),
        }
    }

    pub fn from_decimal(value: Decimal) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tick| tick.as_decimal() == value)
            .ok_or_else(|| Error::validation(format!("unsupported tick size: {}", value)))
    }
}

impl std::fmt::Display for TickSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TickSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| Error::validation(format!("invalid tick size: {:?}", s)))?;
        Self::from_decimal(value)
    }
}

impl TryFrom<String> for TickSize {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TickSize> for String {
    fn from(value: TickSize) -> Self {
        value.as_str().to_string()
    }
}

/// Whether `price` lies within `[tick, 1 - tick]`.
pub fn price_valid(price: Decimal, tick: TickSize) -> bool {
    let tick = tick.as_decimal();
    price >= tick && price <= Decimal::ONE - tick
}

/// Reject prices outside the tradable band, before and after rounding.
pub fn validate_price(price: Decimal, tick: TickSize) -> Result<()> {
    let rounded = round_normal(price, tick.rounding_profile().price);
    if price_valid(price, tick) && price_valid(rounded, tick) {
        return Ok(());
    }
    Err(Error::validation(format!(
        "invalid price ({}), min: {} - max: {}",
        price,
        tick.as_decimal(),
        Decimal::ONE - tick.as_decimal()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_down() {
        assert_eq!(round_down(dec!(0.5555), 2), dec!(0.55));
        assert_eq!(round_down(dec!(8.999), 2), dec!(8.99));
        assert_eq!(round_down(dec!(8), 2), dec!(8));
    }

    #[test]
    fn test_round_normal_is_half_up() {
        assert_eq!(round_normal(dec!(0.125), 2), dec!(0.13));
        assert_eq!(round_normal(dec!(0.124), 2), dec!(0.12));
        assert_eq!(round_normal(dec!(0.565), 2), dec!(0.57));
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(dec!(0.121), 2), dec!(0.13));
        assert_eq!(round_up(dec!(0.12), 2), dec!(0.12));
    }

    #[test]
    fn test_decimal_places_ignores_trailing_zeros() {
        assert_eq!(decimal_places(dec!(1.2300)), 2);
        assert_eq!(decimal_places(dec!(8)), 0);
        assert_eq!(decimal_places(dec!(8.00)), 0);
        assert_eq!(decimal_places(dec!(0.000001)), 6);
    }

    #[test]
    fn test_to_token_decimals() {
        assert_eq!(to_token_decimals(dec!(8)).unwrap(), U256::from(8_000_000u64));
        assert_eq!(to_token_decimals(dec!(1.2)).unwrap(), U256::from(1_200_000u64));
        assert_eq!(
            to_token_decimals(dec!(1.0676469)).unwrap(),
            U256::from(1_067_647u64)
        );
        assert_eq!(
            to_token_decimals(dec!(0.0000004)).unwrap(),
            U256::ZERO
        );
        assert!(to_token_decimals(dec!(-1)).is_err());
    }

    #[test]
    fn test_fix_amount_precision() {
        // Already within precision
        assert_eq!(fix_amount_precision(dec!(1.2), 4), dec!(1.2));
        // Dust past the guard digits rounds up into the next unit
        assert_eq!(fix_amount_precision(dec!(0.999999999), 4), dec!(1));
        // Dust within the guard digits is truncated
        assert_eq!(fix_amount_precision(dec!(0.99999999), 4), dec!(0.9999));
        // Genuine extra precision is truncated
        assert_eq!(fix_amount_precision(dec!(1.0676469), 4), dec!(1.0676));
    }

    #[test]
    fn test_tick_profiles() {
        assert_eq!(
            TickSize::Tenth.rounding_profile(),
            RoundingProfile::new(1, 2, 3)
        );
        assert_eq!(
            TickSize::Hundredth.rounding_profile(),
            RoundingProfile::new(2, 2, 4)
        );
        assert_eq!(
            TickSize::Thousandth.rounding_profile(),
            RoundingProfile::new(3, 2, 5)
        );
        assert_eq!(
            TickSize::TenThousandth.rounding_profile(),
            RoundingProfile::new(4, 2, 6)
        );
    }

    #[test]
    fn test_tick_size_parse() {
        assert_eq!("0.01".parse::<TickSize>().unwrap(), TickSize::Hundredth);
        assert_eq!("0.010".parse::<TickSize>().unwrap(), TickSize::Hundredth);
        assert_eq!("0.0001".parse::<TickSize>().unwrap(), TickSize::TenThousandth);
        assert!("0.05".parse::<TickSize>().is_err());
        assert!("abc".parse::<TickSize>().is_err());

        let json = serde_json::to_string(&TickSize::Thousandth).unwrap();
        assert_eq!(json, "\"0.001\"");
        let back: TickSize = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TickSize::Thousandth);
    }

    #[test]
    fn test_price_band_is_inclusive() {
        let tick = TickSize::Hundredth;
        assert!(price_valid(dec!(0.01), tick));
        assert!(price_valid(dec!(0.99), tick));
        assert!(!price_valid(dec!(0.009), tick));
        assert!(!price_valid(dec!(0.991), tick));
        assert!(!price_valid(dec!(0), tick));
        assert!(!price_valid(dec!(1), tick));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(dec!(0.15), TickSize::Hundredth).is_ok());
        // Rounds up into the band but is below it as given
        let err = validate_price(dec!(0.005), TickSize::Hundredth).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("min: 0.01"));
        assert!(validate_price(dec!(0.995), TickSize::Hundredth).is_err());
    }
}

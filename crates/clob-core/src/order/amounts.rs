//! Maker/taker amount derivation for limit and market orders.

use alloy_primitives::U256;
use rust_decimal::Decimal;

use super::rounding::{fix_amount_precision, round_down, round_normal, to_token_decimals, RoundingProfile};
use super::types::Side;
use crate::{Error, Result};

/// Amounts in 6-decimal token units, as signed into the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAmounts {
    pub maker_amount: U256,
    pub taker_amount: U256,
}

fn checked_product(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| Error::validation(format!("amount overflow: {} * {}", a, b)))
}

fn to_amounts(raw_maker: Decimal, raw_taker: Decimal) -> Result<OrderAmounts> {
    Ok(OrderAmounts {
        maker_amount: to_token_decimals(raw_maker)?,
        taker_amount: to_token_decimals(raw_taker)?,
    })
}

/// Limit order amounts. `size` is in outcome tokens.
///
/// BUY pays `size * price` collateral for `size` tokens; SELL is the mirror.
pub fn get_order_amounts(
    side: Side,
    size: Decimal,
    price: Decimal,
    profile: RoundingProfile,
) -> Result<OrderAmounts> {
    let raw_price = round_normal(price, profile.price);
    let raw_size = round_down(size, profile.size);
    let raw_quote = fix_amount_precision(checked_product(raw_size, raw_price)?, profile.amount);

    match side {
        Side::Buy => to_amounts(raw_quote, raw_size),
        Side::Sell => to_amounts(raw_size, raw_quote),
    }
}

/// Market order amounts. `amount` is collateral for BUY, outcome tokens for SELL.
pub fn get_market_order_amounts(
    side: Side,
    amount: Decimal,
    price: Decimal,
    profile: RoundingProfile,
) -> Result<OrderAmounts> {
    let raw_price = round_normal(price, profile.price);
    let raw_maker = round_down(amount, profile.size);

    let raw_taker = match side {
        Side::Buy => {
            if raw_price.is_zero() {
                return Err(Error::validation("price cannot be 0"));
            }
            let shares = raw_maker
                .checked_div(raw_price)
                .ok_or_else(|| Error::validation(format!("amount overflow: {} / {}", raw_maker, raw_price)))?;
            fix_amount_precision(shares, profile.amount)
        }
        Side::Sell => fix_amount_precision(checked_product(raw_maker, raw_price)?, profile.amount),
    };

    to_amounts(raw_maker, raw_taker)
}

/// Reconcile a caller-supplied fee rate with the market's.
///
/// Both positive and different is an error; otherwise the market rate wins.
pub fn resolve_fee_rate(market_fee_bps: u64, user_fee_bps: u64) -> Result<u64> {
    if market_fee_bps > 0 && user_fee_bps > 0 && market_fee_bps != user_fee_bps {
        return Err(Error::validation(format!(
            "invalid user provided fee rate: ({}), fee rate for the market must be {}",
            user_fee_bps, market_fee_bps
        )));
    }
    Ok(market_fee_bps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::rounding::TickSize;
    use rust_decimal_macros::dec;

    fn units(n: u64) -> U256 {
        U256::from(n)
    }

    #[test]
    fn test_limit_buy_amounts() {
        let amounts = get_order_amounts(
            Side::Buy,
            dec!(8),
            dec!(0.15),
            TickSize::Hundredth.rounding_profile(),
        )
        .unwrap();
        assert_eq!(amounts.taker_amount, units(8_000_000));
        assert_eq!(amounts.maker_amount, units(1_200_000));
    }

    #[test]
    fn test_limit_sell_amounts() {
        let amounts = get_order_amounts(
            Side::Sell,
            dec!(8),
            dec!(0.15),
            TickSize::Hundredth.rounding_profile(),
        )
        .unwrap();
        assert_eq!(amounts.maker_amount, units(8_000_000));
        assert_eq!(amounts.taker_amount, units(1_200_000));
    }

    #[test]
    fn test_limit_size_rounds_down() {
        let amounts = get_order_amounts(
            Side::Buy,
            dec!(10.129),
            dec!(0.5),
            TickSize::Hundredth.rounding_profile(),
        )
        .unwrap();
        assert_eq!(amounts.taker_amount, units(10_120_000));
        assert_eq!(amounts.maker_amount, units(5_060_000));
    }

    #[test]
    fn test_limit_price_rounds_half_up() {
        // 0.555 rounds to 0.56 at two places
        let amounts = get_order_amounts(
            Side::Buy,
            dec!(100),
            dec!(0.555),
            TickSize::Hundredth.rounding_profile(),
        )
        .unwrap();
        assert_eq!(amounts.maker_amount, units(56_000_000));
    }

    #[test]
    fn test_market_sell_amounts() {
        let profile = RoundingProfile::new(2, 6, 8);
        let amounts =
            get_market_order_amounts(Side::Sell, dec!(3.235293), dec!(0.33), profile).unwrap();
        assert_eq!(amounts.maker_amount, units(3_235_293));
        assert_eq!(amounts.taker_amount, units(1_067_647));
    }

    #[test]
    fn test_market_buy_amounts() {
        let amounts = get_market_order_amounts(
            Side::Buy,
            dec!(100),
            dec!(0.5),
            TickSize::Hundredth.rounding_profile(),
        )
        .unwrap();
        assert_eq!(amounts.maker_amount, units(100_000_000));
        assert_eq!(amounts.taker_amount, units(200_000_000));
    }

    #[test]
    fn test_market_buy_truncates_repeating_quotient() {
        // 10 / 0.3 = 33.333... truncated to four places
        let amounts = get_market_order_amounts(
            Side::Buy,
            dec!(10),
            dec!(0.3),
            TickSize::Hundredth.rounding_profile(),
        )
        .unwrap();
        assert_eq!(amounts.maker_amount, units(10_000_000));
        assert_eq!(amounts.taker_amount, units(33_333_300));
    }

    #[test]
    fn test_market_buy_zero_price() {
        let err = get_market_order_amounts(
            Side::Buy,
            dec!(10),
            dec!(0.001),
            TickSize::Hundredth.rounding_profile(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("price cannot be 0"));
    }

    #[test]
    fn test_resolve_fee_rate() {
        assert_eq!(resolve_fee_rate(0, 0).unwrap(), 0);
        assert_eq!(resolve_fee_rate(0, 25).unwrap(), 0);
        assert_eq!(resolve_fee_rate(100, 0).unwrap(), 100);
        assert_eq!(resolve_fee_rate(100, 100).unwrap(), 100);
        let err = resolve_fee_rate(100, 50).unwrap_err();
        assert!(err.to_string().contains("fee rate for the market must be 100"));
    }
}

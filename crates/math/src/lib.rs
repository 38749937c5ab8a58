use alloy::primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, Zero};

/// Pair liquidity tokens are always minted at 18 decimals.
pub const LP_TOKEN_DECIMALS: u32 = 18;

/// Fallback for tokens whose metadata declares no (or zero) decimals.
pub const DEFAULT_DECIMALS: u32 = 18;

pub fn u256_to_big_int(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}

pub fn exponent_to_big_decimal(decimals: u32) -> BigDecimal {
    BigDecimal::new(BigInt::from(10).pow(decimals), 0)
}

/// Exact conversion of a raw integer amount to its decimal representation
/// at the token's declared precision.
pub fn convert_token_to_decimal(value: U256, decimals: u32) -> BigDecimal {
    BigDecimal::new(u256_to_big_int(value), i64::from(decimals))
}

/// Division with the "substitute zero" policy: a zero denominator yields a
/// zero quotient, never an error value.
pub fn safe_div(numerator: &BigDecimal, denominator: &BigDecimal) -> BigDecimal {
    if denominator.is_zero() {
        BigDecimal::zero()
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn converts_at_token_decimals() {
        let raw = U256::from(1_500_000u64);
        assert_eq!(
            convert_token_to_decimal(raw, 6),
            BigDecimal::from_str("1.5").unwrap()
        );
    }

    #[test]
    fn converts_large_values_exactly() {
        // 12.345678 at 18 decimals, well past u128 when raw
        let raw = U256::from_str("12345678000000000000").unwrap();
        assert_eq!(
            convert_token_to_decimal(raw, 18),
            BigDecimal::from_str("12.345678").unwrap()
        );
    }

    #[test]
    fn zero_decimals_is_identity() {
        let raw = U256::from(42u64);
        assert_eq!(convert_token_to_decimal(raw, 0), BigDecimal::from(42));
    }

    #[test]
    fn safe_div_by_zero_is_zero() {
        let one = BigDecimal::from(1);
        assert_eq!(safe_div(&one, &BigDecimal::zero()), BigDecimal::zero());
        assert_eq!(safe_div(&BigDecimal::from(10), &BigDecimal::from(4)),
            BigDecimal::from_str("2.5").unwrap());
    }

    #[test]
    fn exponent_is_power_of_ten() {
        assert_eq!(exponent_to_big_decimal(3), BigDecimal::from(1000));
    }
}

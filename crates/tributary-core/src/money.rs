//! Integer money arithmetic.
//!
//! All amounts are `u64` cents. Decimal strings cross the boundary exactly
//! once, through [`parse_amount`], which quantizes to cents with round-half-up.
//! Everything downstream is integer math; pools and shares round toward zero
//! via [`scale_floor`].

use crate::constants::{CENTS_PER_UNIT, FACTOR_PRECISION};
use crate::error::MoneyError;

/// Parse a non-negative decimal amount (e.g. `"100"`, `"99.99"`, `"0.005"`)
/// into cents, rounding half-up at the second fractional digit.
///
/// # Examples
///
/// ```
/// use tributary_core::money::parse_amount;
/// assert_eq!(parse_amount("100").unwrap(), 10_000);
/// assert_eq!(parse_amount("99.99").unwrap(), 9_999);
/// assert_eq!(parse_amount("0.005").unwrap(), 1);
/// assert_eq!(parse_amount("0.0049").unwrap(), 0);
/// ```
pub fn parse_amount(input: &str) -> Result<u64, MoneyError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(MoneyError::EmptyAmount);
    }
    if text.starts_with('-') {
        return Err(MoneyError::AmountOutOfRange(input.to_string()));
    }

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(MoneyError::InvalidAmount(input.to_string()));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(MoneyError::InvalidAmount(input.to_string()));
    }

    let units: u64 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| MoneyError::AmountOutOfRange(input.to_string()))?
    };

    let mut cents: u64 = 0;
    let mut digits = frac_part.chars();
    for _ in 0..2 {
        let d = digits.next().map_or(0, |c| c as u64 - '0' as u64);
        cents = cents * 10 + d;
    }
    // Half-up: the first digit past the cent decides.
    if let Some(c) = digits.next() {
        if c as u64 - '0' as u64 >= 5 {
            cents += 1;
        }
    }

    units
        .checked_mul(CENTS_PER_UNIT)
        .and_then(|u| u.checked_add(cents))
        .ok_or_else(|| MoneyError::AmountOutOfRange(input.to_string()))
}

/// Format cents as a decimal string with two fractional digits.
///
/// # Examples
///
/// ```
/// use tributary_core::money::format_amount;
/// assert_eq!(format_amount(10_000), "100.00");
/// assert_eq!(format_amount(3), "0.03");
/// ```
pub fn format_amount(cents: u64) -> String {
    format!("{}.{:02}", cents / CENTS_PER_UNIT, cents % CENTS_PER_UNIT)
}

/// Scale an amount by a fixed-point rate, rounding down to whole cents.
///
/// `rate_ppb` must not exceed [`FACTOR_PRECISION`] (a rate of 1.0); callers
/// clamp rates before scaling.
pub fn scale_floor(amount_cents: u64, rate_ppb: u64) -> u64 {
    debug_assert!(rate_ppb <= FACTOR_PRECISION);
    (amount_cents as u128 * rate_ppb as u128 / FACTOR_PRECISION as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_whole_units() {
        assert_eq!(parse_amount("0").unwrap(), 0);
        assert_eq!(parse_amount("10").unwrap(), 1_000);
        assert_eq!(parse_amount("100.").unwrap(), 10_000);
    }

    #[test]
    fn parses_fractional_digits() {
        assert_eq!(parse_amount("0.1").unwrap(), 10);
        assert_eq!(parse_amount("0.01").unwrap(), 1);
        assert_eq!(parse_amount(".5").unwrap(), 50);
    }

    #[test]
    fn rounds_half_up_at_cent_boundary() {
        assert_eq!(parse_amount("1.005").unwrap(), 101);
        assert_eq!(parse_amount("1.00500").unwrap(), 101);
        assert_eq!(parse_amount("1.0049999").unwrap(), 100);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_amount(""), Err(MoneyError::EmptyAmount)));
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("1.2.3").is_err());
        assert!(parse_amount(".").is_err());
    }

    #[test]
    fn rejects_negative() {
        assert!(matches!(
            parse_amount("-1"),
            Err(MoneyError::AmountOutOfRange(_))
        ));
    }

    #[test]
    fn format_round_trips() {
        assert_eq!(parse_amount(&format_amount(123_456)).unwrap(), 123_456);
        assert_eq!(format_amount(5), "0.05");
    }

    #[test]
    fn scale_floor_rounds_down() {
        // 10.00 * 0.333333333 = 3.33333333 -> 3.33
        assert_eq!(scale_floor(1_000, 333_333_333), 333);
        assert_eq!(scale_floor(1_000, FACTOR_PRECISION), 1_000);
        assert_eq!(scale_floor(0, FACTOR_PRECISION), 0);
    }

    proptest! {
        #[test]
        fn scale_floor_never_exceeds_amount(amount in 0u64..=u64::MAX, rate in 0u64..=FACTOR_PRECISION) {
            prop_assert!(scale_floor(amount, rate) <= amount);
        }

        #[test]
        fn parse_format_round_trip(cents in 0u64..1_000_000_000_000) {
            prop_assert_eq!(parse_amount(&format_amount(cents)).unwrap(), cents);
        }
    }
}

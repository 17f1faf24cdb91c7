//! Parts-per-billion fixed-point factors.
//!
//! Rates, creativity factors, edge weights, and difficulty multipliers are
//! `u64` values with an implicit [`FACTOR_PRECISION`] denominator. Decimal
//! strings with up to nine fractional digits convert exactly; more digits
//! are rejected rather than silently truncated.

use crate::constants::FACTOR_PRECISION;
use crate::error::FixedError;

/// Parse a non-negative decimal factor (e.g. `"0.3"`, `"1.75"`, `"3.75"`)
/// into parts-per-billion.
///
/// # Examples
///
/// ```
/// use tributary_core::fixed::parse_factor_ppb;
/// assert_eq!(parse_factor_ppb("1").unwrap(), 1_000_000_000);
/// assert_eq!(parse_factor_ppb("0.3").unwrap(), 300_000_000);
/// assert_eq!(parse_factor_ppb("3.75").unwrap(), 3_750_000_000);
/// ```
pub fn parse_factor_ppb(input: &str) -> Result<u64, FixedError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(FixedError::EmptyFactor);
    }
    if text.starts_with('-') {
        return Err(FixedError::FactorOutOfRange(input.to_string()));
    }

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(FixedError::InvalidFactor(input.to_string()));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(FixedError::InvalidFactor(input.to_string()));
    }
    if frac_part.len() > 9 {
        return Err(FixedError::TooManyFractionalDigits {
            value: input.to_string(),
            digits: frac_part.len(),
        });
    }

    let units: u64 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| FixedError::FactorOutOfRange(input.to_string()))?
    };

    let mut frac: u64 = 0;
    for i in 0..9 {
        let d = frac_part.chars().nth(i).map_or(0, |c| c as u64 - '0' as u64);
        frac = frac * 10 + d;
    }

    units
        .checked_mul(FACTOR_PRECISION)
        .and_then(|u| u.checked_add(frac))
        .ok_or_else(|| FixedError::FactorOutOfRange(input.to_string()))
}

/// Format a ppb factor as a decimal string, trimming trailing zeros.
///
/// # Examples
///
/// ```
/// use tributary_core::fixed::format_factor_ppb;
/// assert_eq!(format_factor_ppb(300_000_000), "0.3");
/// assert_eq!(format_factor_ppb(1_000_000_000), "1");
/// ```
pub fn format_factor_ppb(ppb: u64) -> String {
    let units = ppb / FACTOR_PRECISION;
    let frac = ppb % FACTOR_PRECISION;
    if frac == 0 {
        return units.to_string();
    }
    let digits = format!("{frac:09}");
    format!("{units}.{}", digits.trim_end_matches('0'))
}

/// Exact ratio `numerator / denominator` in parts-per-billion.
///
/// Returns a `u128` so extreme ratios cannot wrap; callers cap the result
/// before narrowing. `denominator` must be non-zero.
pub fn ratio_ppb(numerator: u64, denominator: u64) -> u128 {
    debug_assert!(denominator > 0);
    numerator as u128 * FACTOR_PRECISION as u128 / denominator as u128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_rates() {
        assert_eq!(parse_factor_ppb("0").unwrap(), 0);
        assert_eq!(parse_factor_ppb("0.5").unwrap(), 500_000_000);
        assert_eq!(parse_factor_ppb("0.85").unwrap(), 850_000_000);
        assert_eq!(parse_factor_ppb("1.75").unwrap(), 1_750_000_000);
        assert_eq!(parse_factor_ppb("10").unwrap(), 10_000_000_000);
    }

    #[test]
    fn nine_digits_are_exact() {
        assert_eq!(parse_factor_ppb("0.000000001").unwrap(), 1);
        assert_eq!(parse_factor_ppb("0.999999999").unwrap(), 999_999_999);
    }

    #[test]
    fn ten_digits_are_rejected() {
        assert!(matches!(
            parse_factor_ppb("0.0000000001"),
            Err(FixedError::TooManyFractionalDigits { digits: 10, .. })
        ));
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert!(parse_factor_ppb("-0.5").is_err());
        assert!(parse_factor_ppb("1.2e3").is_err());
        assert!(parse_factor_ppb("").is_err());
    }

    #[test]
    fn format_trims_zeros() {
        assert_eq!(format_factor_ppb(0), "0");
        assert_eq!(format_factor_ppb(1_750_000_000), "1.75");
        assert_eq!(format_factor_ppb(3_750_000_000), "3.75");
        assert_eq!(format_factor_ppb(1), "0.000000001");
    }

    #[test]
    fn ratio_is_floored() {
        assert_eq!(ratio_ppb(1, 3), 333_333_333);
        assert_eq!(ratio_ppb(300, 100), 3_000_000_000);
        assert_eq!(ratio_ppb(0, 7), 0);
    }
}

//! Time-priority decay factor.

use chrono::{DateTime, Utc};
use tributary_core::constants::{DAYS_PER_YEAR, FACTOR_PRECISION};

/// Time-priority factor for work created at `created_at`, evaluated at `now`.
///
/// Returns `365 × FACTOR_PRECISION / (365 + age_days)` in ppb: 1.0 for
/// brand-new work, 0.5 at one year old, approaching 0 with age.
/// Negative elapsed time (created-in-future input) is clamped to zero days.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use tributary_core::constants::FACTOR_PRECISION;
/// use tributary_weights::time_priority_ppb;
///
/// let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(time_priority_ppb(now, now), FACTOR_PRECISION);
/// assert_eq!(time_priority_ppb(now - Duration::days(365), now), FACTOR_PRECISION / 2);
/// ```
pub fn time_priority_ppb(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let age_days = (now - created_at).num_days().max(0) as u64;
    let numerator = DAYS_PER_YEAR as u128 * FACTOR_PRECISION as u128;
    (numerator / (DAYS_PER_YEAR + age_days) as u128) as u64
}

//! Penny-exact pool apportionment.
//!
//! Splits an integer-cent pool across weighted claimants with the
//! largest-remainder method: floor every proportional share, then hand the
//! leftover cents, one each, to the claimants with the largest fractional
//! remainders (ties broken by ascending id). The shares always sum to
//! exactly the pool.
//!
//! Remainders are compared as exact integers: for claimant weight `w` and
//! total weight `W`, the fractional part of `pool × w / W` is ordered by
//! `pool × w mod W`, which every claimant shares the denominator for.

use tributary_core::error::DistributionError;

struct Share<'a> {
    id: &'a str,
    cents: u64,
    remainder: u128,
}

/// Split `pool` cents across `(id, weight_ppb)` claimants.
///
/// Returns `(id, cents)` pairs sorted by ascending id, summing to exactly
/// `pool`. Zero-weight claimants receive a floor of zero but still compete
/// for remainder cents only with a zero remainder. An empty claimant set or
/// an all-zero weight set yields an empty result; callers decide the
/// fallback (the engine credits the pool to the splitting node's creator).
pub fn split_pool(
    pool: u64,
    claimants: &[(String, u128)],
) -> Result<Vec<(String, u64)>, DistributionError> {
    let mut total: u128 = 0;
    for (_, weight) in claimants {
        total = total
            .checked_add(*weight)
            .ok_or(DistributionError::ArithmeticOverflow)?;
    }
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut shares: Vec<Share<'_>> = Vec::with_capacity(claimants.len());
    let mut floor_sum: u64 = 0;
    for (id, weight) in claimants {
        let product = (pool as u128)
            .checked_mul(*weight)
            .ok_or(DistributionError::ArithmeticOverflow)?;
        let cents = (product / total) as u64;
        floor_sum += cents;
        shares.push(Share {
            id,
            cents,
            remainder: product % total,
        });
    }

    // Leftover cents are provably fewer than the claimant count.
    let mut leftover = pool - floor_sum;
    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        shares[b]
            .remainder
            .cmp(&shares[a].remainder)
            .then_with(|| shares[a].id.cmp(shares[b].id))
    });
    for index in order {
        if leftover == 0 {
            break;
        }
        shares[index].cents += 1;
        leftover -= 1;
    }

    let mut result: Vec<(String, u64)> = shares
        .into_iter()
        .map(|s| (s.id.to_string(), s.cents))
        .collect();
    result.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(result)
}

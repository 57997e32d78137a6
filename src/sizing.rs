//! Bucket-array sizing helpers.
//!
//! Chained tables size their bucket arrays from an ascending table of primes, while the
//! open-addressed table uses power-of-two lengths so that `hash & (len - 1)` replaces the
//! modulo. Both helpers are pure functions.

use crate::error::{TableError, TableResult};

/// Ascending primes, each roughly 1.2x its predecessor, used for chained bucket arrays.
pub const PRIMES: [usize; 72] = [
    3, 7, 11, 17, 23, 29, 37, 47, 59, 71, 89, 107, 131, 163, 197, 239, 293, 353, 431, 521,
    631, 761, 919, 1103, 1327, 1597, 1931, 2333, 2801, 3371, 4049, 4861, 5839, 7013, 8419,
    10103, 12143, 14591, 17519, 21023, 25229, 30293, 36353, 43627, 52361, 62851, 75431,
    90523, 108631, 130363, 156437, 187751, 225307, 270371, 324449, 389357, 467237, 560689,
    672827, 807403, 968897, 1162687, 1395263, 1674319, 2009191, 2411033, 2893249, 3471899,
    4166287, 4999559, 5999471, 7199369,
];

/// Largest capacity a container may be configured with.
///
/// Construction allocates storage proportional to the configured capacity, so larger
/// values are rejected during validation rather than failing in the allocator.
pub const MAX_CAPACITY: usize = 1 << 24;

/// Largest power of two accepted by [`next_power_of_two`].
pub const MAX_POWER_OF_TWO: usize = 1 << (usize::BITS - 2);

/// Returns `true` if `candidate` is prime.
pub fn is_prime(candidate: usize) -> bool {
    if candidate < 2 {
        return false;
    }
    if candidate % 2 == 0 {
        return candidate == 2;
    }
    let mut divisor = 3usize;
    while divisor.saturating_mul(divisor) <= candidate {
        if candidate % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Returns the smallest prime greater than or equal to `min`.
///
/// Values covered by [`PRIMES`] are answered from the table; larger requests fall back to
/// a trial-division search over odd candidates.
pub fn next_prime(min: usize) -> usize {
    if let Some(&prime) = PRIMES.iter().find(|&&prime| prime >= min) {
        return prime;
    }
    let mut candidate = min | 1;
    while !is_prime(candidate) {
        candidate = candidate.saturating_add(2);
    }
    candidate
}

/// Returns the smallest power of two greater than or equal to `n` (at least 1).
///
/// # Errors
///
/// Returns [`TableError::InvalidArgument`] when the result would exceed
/// [`MAX_POWER_OF_TWO`].
pub fn next_power_of_two(n: usize) -> TableResult<usize> {
    match n.max(1).checked_next_power_of_two() {
        Some(size) if size <= MAX_POWER_OF_TWO => Ok(size),
        _ => Err(TableError::invalid_argument(
            "capacity",
            format!("{n} exceeds the largest supported power of two ({MAX_POWER_OF_TWO})"),
        )),
    }
}

/// Bucket count for a chained table expected to hold `capacity` entries at `load_factor`.
///
/// The result is capped near `4 * MAX_CAPACITY`; a table that outgrows its initial
/// buckets grows its index later.
pub(crate) fn chained_bucket_count(capacity: usize, load_factor: f64) -> usize {
    let wanted = (capacity as f64 / load_factor).ceil();
    let ceiling = (MAX_CAPACITY * 4) as f64;
    next_prime(wanted.min(ceiling) as usize)
}

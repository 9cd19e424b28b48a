//! # Transaction Number Generation
//!
//! Human-readable transaction identifiers: `TRX` + `yyyymmdd` + 6 random
//! base36 characters, e.g. `TRX20260830A1B2C3`.
//!
//! ## Uniqueness
//! The 6-character suffix is random, not guaranteed unique. The checkout
//! orchestrator relies on the storage unique constraint and retries with a
//! fresh suffix on collision (bounded retry count). This module only produces
//! candidates.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Prefix carried by every transaction number.
pub const TXN_NUMBER_PREFIX: &str = "TRX";

/// Number of random suffix characters.
pub const TXN_SUFFIX_LEN: usize = 6;

/// Total length of a well-formed transaction number: `TRX` + 8 date digits + suffix.
pub const TXN_NUMBER_LEN: usize = 3 + 8 + TXN_SUFFIX_LEN;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates a candidate transaction number for the current date.
pub fn generate_transaction_number() -> String {
    generate_transaction_number_at(Utc::now(), &mut rand::thread_rng())
}

/// Generates a candidate transaction number for a given instant and RNG.
///
/// Split out for deterministic tests; production callers use
/// [`generate_transaction_number`].
pub fn generate_transaction_number_at<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> String {
    let date_part = now.format("%Y%m%d");

    let suffix: String = (0..TXN_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    format!("{TXN_NUMBER_PREFIX}{date_part}{suffix}")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_format() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 10, 0, 0).unwrap();
        let number = generate_transaction_number_at(now, &mut rand::thread_rng());

        assert_eq!(number.len(), TXN_NUMBER_LEN);
        assert!(number.starts_with("TRX20260830"));

        let suffix = &number[11..];
        assert_eq!(suffix.len(), TXN_SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_suffixes_vary() {
        // Not a uniqueness guarantee (storage enforces that), but 1000 draws
        // from a 36^6 space colliding en masse would indicate a broken RNG hookup.
        let numbers: HashSet<String> = (0..1000).map(|_| generate_transaction_number()).collect();
        assert!(numbers.len() > 990);
    }
}

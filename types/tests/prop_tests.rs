use proptest::prelude::*;

use commune_types::{Address, Timestamp};

proptest! {
    /// Expiry is monotonic in `now`: once a window has expired it stays expired.
    #[test]
    fn expiry_monotonic(start in 0u64..1_000_000, window in 1u64..1_000_000, later in 0u64..1_000_000) {
        let created = Timestamp::new(start);
        let deadline = start + window;
        let now = Timestamp::new(deadline);
        prop_assert!(created.has_expired(window, now));
        prop_assert!(created.has_expired(window, now.plus(later)));
    }

    /// Before the window elapses, nothing is expired.
    #[test]
    fn no_premature_expiry(start in 0u64..1_000_000, window in 1u64..1_000_000) {
        let created = Timestamp::new(start);
        let just_before = Timestamp::new(start + window - 1);
        prop_assert!(!created.has_expired(window, just_before));
    }

    /// Arbitrary non-empty, non-sentinel strings are never the zero address.
    #[test]
    fn nonzero_addresses(raw in "0x[1-9a-f]{8,40}") {
        prop_assert!(!Address::new(raw).is_zero());
    }
}

//! Remaining-Capacity Calculator
//!
//! Pure derivation of how many units of a ticket type are still sellable,
//! accounting for reservation carve-outs. Counts come from the caller; this
//! module never touches storage.

/// One active reservation pool on the ticket type under evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationUsage {
    /// The reservation's secret token
    pub token: String,
    /// Units carved out of general sale
    pub quantity: i64,
    /// Capacity-holding records already drawn through this token
    pub drawn: i64,
}

impl ReservationUsage {
    /// The portion still set aside and invisible to general buyers
    ///
    /// A pool drawn past its quantity (operator shrank it after sales) sets
    /// nothing aside — it never adds capacity back.
    pub fn set_aside(&self) -> i64 {
        (self.quantity - self.drawn).max(0)
    }
}

/// Remaining units available to the caller
///
/// `capacity - settled`, minus the unused portion of every reservation whose
/// token the caller is not presenting. The presented pool's own carve-out is
/// skipped — its holder may draw from it. Transient internal states can make
/// the raw value negative; callers always see it clamped at 0.
pub fn remaining(
    capacity: i64,
    settled: i64,
    reservations: &[ReservationUsage],
    presenting: Option<&str>,
) -> i64 {
    let mut left = capacity - settled;

    for pool in reservations {
        if presenting == Some(pool.token.as_str()) {
            continue;
        }
        left -= pool.set_aside();
    }

    left.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(token: &str, quantity: i64, drawn: i64) -> ReservationUsage {
        ReservationUsage {
            token: token.to_string(),
            quantity,
            drawn,
        }
    }

    #[test]
    fn test_no_reservations() {
        assert_eq!(remaining(10, 3, &[], None), 7);
    }

    #[test]
    fn test_sold_out_clamps_to_zero() {
        assert_eq!(remaining(10, 10, &[], None), 0);
        // over-sold transient state still reports zero
        assert_eq!(remaining(10, 12, &[], None), 0);
    }

    #[test]
    fn test_general_buyer_sees_carve_out() {
        // capacity 10, 0 settled, 3 reserved: general buyer sees 7
        let pools = [pool("tok-b", 3, 0)];
        assert_eq!(remaining(10, 0, &pools, None), 7);
    }

    #[test]
    fn test_holder_draws_from_own_pool() {
        // the reservation holder sees the full 10
        let pools = [pool("tok-b", 3, 0)];
        assert_eq!(remaining(10, 0, &pools, Some("tok-b")), 10);
    }

    #[test]
    fn test_partially_drawn_pool_sets_less_aside() {
        // 2 of 3 reserved units already drawn (and counted in settled):
        // general buyer sees 10 - 2 - 1 = 7
        let pools = [pool("tok-b", 3, 2)];
        assert_eq!(remaining(10, 2, &pools, None), 7);
    }

    #[test]
    fn test_overdrawn_pool_sets_nothing_aside() {
        // operator shrank the pool to 2 after 4 were drawn
        let pools = [pool("tok-b", 2, 4)];
        assert_eq!(pools[0].set_aside(), 0);
        assert_eq!(remaining(10, 4, &pools, None), 6);
    }

    #[test]
    fn test_multiple_pools_only_presented_skipped() {
        let pools = [pool("press", 2, 0), pool("sponsor", 3, 1)];
        // general: 10 - 1 settled - 2 - 2 = 5
        assert_eq!(remaining(10, 1, &pools, None), 5);
        // press holder: 10 - 1 - 2(sponsor set-aside) = 7
        assert_eq!(remaining(10, 1, &pools, Some("press")), 7);
        // unknown token behaves like a general buyer
        assert_eq!(remaining(10, 1, &pools, Some("nope")), 5);
    }

    #[test]
    fn test_carve_outs_exceeding_capacity() {
        // reservations may transiently exceed what is left; clamp at zero
        let pools = [pool("a", 6, 0), pool("b", 6, 0)];
        assert_eq!(remaining(10, 0, &pools, None), 0);
        assert_eq!(remaining(10, 0, &pools, Some("a")), 4);
    }
}

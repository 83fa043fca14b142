//! Coupon Model

use serde::{Deserialize, Serialize};

/// Coupon entity (优惠码)
///
/// Discount is either an absolute minor-unit amount or a percentage.
/// When both are configured the absolute amount wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,
    /// Stored uppercase; lookups are case-insensitive
    pub code: String,
    /// Absolute discount in minor units
    pub amount_off: Option<i64>,
    /// Percentage discount (e.g. 15.0 = 15%)
    pub percent_off: Option<f64>,
    /// Total number of discounted ticket units this coupon may cover
    pub capacity: i64,
    /// Validity window start (Unix millis)
    pub valid_from: Option<i64>,
    /// Validity window end (Unix millis)
    pub valid_until: Option<i64>,
    /// Ticket type ids this coupon applies to; empty = applies to none
    pub ticket_type_ids: Vec<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Coupon {
    /// Normalize a user-supplied code for lookup/storage
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Whether the coupon is active and inside its validity window at `now`
    pub fn is_valid_at(&self, now: i64) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(from) = self.valid_from
            && now < from
        {
            return false;
        }
        if let Some(until) = self.valid_until
            && now >= until
        {
            return false;
        }
        true
    }

    /// Whether the coupon applies to the given ticket type
    pub fn applies_to(&self, ticket_type_id: i64) -> bool {
        self.ticket_type_ids.contains(&ticket_type_id)
    }
}

/// Create coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCreate {
    pub code: String,
    pub amount_off: Option<i64>,
    pub percent_off: Option<f64>,
    pub capacity: i64,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub ticket_type_ids: Vec<i64>,
}

/// Update coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponUpdate {
    pub amount_off: Option<i64>,
    pub percent_off: Option<f64>,
    pub capacity: Option<i64>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub ticket_type_ids: Option<Vec<i64>>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_coupon() -> Coupon {
        Coupon {
            id: 1,
            code: "SAVE5".into(),
            amount_off: Some(500),
            percent_off: None,
            capacity: 10,
            valid_from: Some(100),
            valid_until: Some(200),
            ticket_type_ids: vec![7],
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_code_normalization() {
        assert_eq!(Coupon::normalize_code("  save5 "), "SAVE5");
        assert_eq!(Coupon::normalize_code("SaVe5"), "SAVE5");
    }

    #[test]
    fn test_validity_window() {
        let c = make_coupon();
        assert!(!c.is_valid_at(99));
        assert!(c.is_valid_at(100));
        assert!(!c.is_valid_at(200));
    }

    #[test]
    fn test_inactive_coupon_invalid() {
        let mut c = make_coupon();
        c.is_active = false;
        assert!(!c.is_valid_at(150));
    }

    #[test]
    fn test_eligibility() {
        let c = make_coupon();
        assert!(c.applies_to(7));
        assert!(!c.applies_to(8));
    }
}

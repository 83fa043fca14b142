//! Time helpers

use chrono::Duration;

/// Cutoff timestamp for holds older than `max_age_minutes`
///
/// A draft created at or before the returned instant is considered stale.
pub fn stale_cutoff_millis(now_millis: i64, max_age_minutes: u64) -> i64 {
    now_millis - Duration::minutes(max_age_minutes as i64).num_milliseconds()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_arithmetic() {
        // 24h = 1440 minutes
        assert_eq!(stale_cutoff_millis(100_000_000, 1440), 100_000_000 - 86_400_000);
        assert_eq!(stale_cutoff_millis(60_000, 1), 0);
    }
}

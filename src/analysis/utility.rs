use chrono::Duration;

/// Computes `part / total * 100`, guarded. Returns 0.0 for a zero total.
pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Converts a duration to fractional hours.
pub fn duration_hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(pct(50, 100), 50.0);
        assert_eq!(pct(1, 4), 25.0);
    }

    #[test]
    fn test_duration_hours() {
        assert_eq!(duration_hours(Duration::minutes(90)), 1.5);
        assert_eq!(duration_hours(Duration::zero()), 0.0);
    }
}

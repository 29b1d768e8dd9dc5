// Small formatting helpers shared by the IP overlay.

/// Bucketed relative-time label for the IP overlay.
pub fn time_ago(now_ms: f64, then_ms: f64) -> String {
    let secs = ((now_ms - then_ms) / 1000.0).max(0.0) as u64;
    if secs < 5 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::time_ago;

    #[test]
    fn buckets_match_thresholds() {
        let now = 1_000_000_000.0;
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now, now - 4_999.0), "just now");
        assert_eq!(time_ago(now, now - 5_000.0), "5s ago");
        assert_eq!(time_ago(now, now - 59_000.0), "59s ago");
        assert_eq!(time_ago(now, now - 60_000.0), "1m ago");
        assert_eq!(time_ago(now, now - 59.0 * 60_000.0), "59m ago");
        assert_eq!(time_ago(now, now - 3_600_000.0), "1h ago");
        assert_eq!(time_ago(now, now - 7_500_000.0), "2h ago");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        assert_eq!(time_ago(0.0, 10_000.0), "just now");
    }
}

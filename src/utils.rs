//! Utility functions
//!
//! **Used by**: slider layout (handle labels), CLI output

/// Time label formatting
pub mod time {
    const SECONDS_PER_DAY: f64 = 86_400.0;

    /// `H:MM:SS` from one hour up, `MM:SS` below. Truncates fractions,
    /// wraps at 24h. Negative or non-finite input formats as `00:00`.
    pub fn format_seconds(total_seconds: f64) -> String {
        if !total_seconds.is_finite() || total_seconds < 0.0 {
            return "00:00".to_string();
        }
        let wrapped = total_seconds % SECONDS_PER_DAY;
        let hours = (wrapped / 3600.0) as u32;
        let minutes = ((wrapped % 3600.0) / 60.0) as u32;
        let seconds = (wrapped % 60.0) as u32;

        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{:02}:{:02}", minutes, seconds)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_minutes_seconds() {
            assert_eq!(format_seconds(0.0), "00:00");
            assert_eq!(format_seconds(9.99), "00:09");
            assert_eq!(format_seconds(75.0), "01:15");
        }

        #[test]
        fn test_hours() {
            assert_eq!(format_seconds(3600.0), "1:00:00");
            assert_eq!(format_seconds(3725.5), "1:02:05");
        }

        #[test]
        fn test_wraps_at_day_and_rejects_garbage() {
            assert_eq!(format_seconds(86_400.0 + 61.0), "01:01");
            assert_eq!(format_seconds(-3.0), "00:00");
            assert_eq!(format_seconds(f64::NAN), "00:00");
        }
    }
}

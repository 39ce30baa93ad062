//! Clock formatting for the transport time label.

/// Format seconds as `m:ss`, or `h:mm:ss` from one hour on.
/// Fractions are truncated; negative or non-finite input shows as `0:00`.
pub fn format_clock(time: f64) -> String {
    let total = if time.is_finite() && time > 0.0 {
        time.floor() as u64
    } else {
        0
    };
    let seconds = total % 60;
    let minutes = (total / 60) % 60;
    let hours = total / 3600;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Transport label: `elapsed / duration`
pub fn progress_label(time: f64, duration: f64) -> String {
    format!("{} / {}", format_clock(time), format_clock(duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_and_seconds() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(9.9), "0:09");
        assert_eq!(format_clock(60.0), "1:00");
        assert_eq!(format_clock(1800.0), "30:00");
        assert_eq!(format_clock(3599.0), "59:59");
    }

    #[test]
    fn test_hours() {
        assert_eq!(format_clock(3600.0), "1:00:00");
        assert_eq!(format_clock(3725.0), "1:02:05");
    }

    #[test]
    fn test_bad_input() {
        assert_eq!(format_clock(-5.0), "0:00");
        assert_eq!(format_clock(f64::NAN), "0:00");
    }

    #[test]
    fn test_label() {
        assert_eq!(progress_label(60.0, 1800.0), "1:00 / 30:00");
    }
}

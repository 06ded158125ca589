//! Display helpers shared by every front end.

/// Render seconds as `MM:SS`. Minutes are not capped at 99.
pub fn clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Render a millisecond countdown as `MM:SS`, rounding partial seconds up so
/// the display reads `00:01` until the phase actually ends.
pub fn countdown(ms: u64) -> String {
    clock(ms.div_ceil(1000))
}

/// Text progress ring: `width` cells, filled proportionally to `fraction`.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (fraction * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_minutes_and_seconds() {
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(765), "12:45");
        assert_eq!(clock(6_000), "100:00");
    }

    #[test]
    fn countdown_rounds_up() {
        assert_eq!(countdown(0), "00:00");
        assert_eq!(countdown(1), "00:01");
        assert_eq!(countdown(29_001), "00:30");
    }

    #[test]
    fn progress_bar_clamps() {
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(2.0, 4), "[####]");
        assert_eq!(progress_bar(f64::NAN, 2), "[--]");
    }
}

// crates/mergecut-core/src/helpers/time.rs
//
// Shared time-formatting utilities used by both mergecut-ui and any future
// crates that need human-readable timestamps.

/// Format a position as `MM:SS.ss` (minutes, seconds, hundredths).
///
/// Used on transport readouts and seek bars, where sub-second precision
/// matters. Negative and non-finite inputs render as the zero clock.
///
/// ```
/// use mergecut_core::helpers::time::format_clock;
/// assert_eq!(format_clock(0.0),   "00:00.00");
/// assert_eq!(format_clock(61.5),  "01:01.50");
/// assert_eq!(format_clock(-3.0),  "00:00.00");
/// ```
pub fn format_clock(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "00:00.00".to_string();
    }
    let m  = (secs / 60.0) as u32;
    let s  = secs % 60.0;
    format!("{m:02}:{s:05.2}")
}

/// Compact duration label for timeline rows.
///
/// Sub-minute clips keep a tenth of a second (`7.5s`); anything longer is
/// shown in whole seconds as `M:SS`, growing an hours field when needed
/// (`2:03:04`). Negative and non-finite inputs render as `0.0s`, matching
/// [`format_clock`]'s garbage handling.
///
/// ```
/// use mergecut_core::helpers::time::format_duration;
/// assert_eq!(format_duration(7.5),    "7.5s");
/// assert_eq!(format_duration(245.0),  "4:05");
/// assert_eq!(format_duration(7384.0), "2:03:04");
/// assert_eq!(format_duration(-1.0),   "0.0s");
/// ```
pub fn format_duration(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "0.0s".to_string();
    }
    if secs < 60.0 {
        return format!("{secs:.1}s");
    }
    let whole = secs as u64;
    if whole >= 3600 {
        format!("{}:{:02}:{:02}", whole / 3600, (whole % 3600) / 60, whole % 60)
    } else {
        format!("{}:{:02}", whole / 60, whole % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_both_fields() {
        assert_eq!(format_clock(5.25),  "00:05.25");
        assert_eq!(format_clock(65.0),  "01:05.00");
        assert_eq!(format_clock(600.9), "10:00.90");
    }

    #[test]
    fn clock_handles_garbage_input() {
        assert_eq!(format_clock(f64::NAN),      "00:00.00");
        assert_eq!(format_clock(f64::INFINITY), "00:00.00");
        assert_eq!(format_clock(-0.5),          "00:00.00");
    }

    #[test]
    fn duration_picks_the_right_band() {
        assert_eq!(format_duration(0.0),    "0.0s");
        assert_eq!(format_duration(59.9),   "59.9s");
        assert_eq!(format_duration(60.0),   "1:00");
        assert_eq!(format_duration(3600.0), "1:00:00");
    }

    #[test]
    fn duration_handles_garbage_input() {
        assert_eq!(format_duration(f64::NAN),      "0.0s");
        assert_eq!(format_duration(f64::INFINITY), "0.0s");
        assert_eq!(format_duration(-3.0),          "0.0s");
    }
}

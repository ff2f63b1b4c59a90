// Author: Dustin Pilgrim
// License: MIT

use std::time::Duration;

/// Human form for idle and lock timers. Sub-second values keep their
/// milliseconds so a fresh reset does not read as "0s".
pub fn format_duration(dur: Duration) -> String {
    let secs = dur.as_secs();

    match secs {
        0 => format!("{}ms", dur.as_millis()),
        1..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m {}s", secs / 60, secs % 60),
        _ => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(300)), "5m 0s");
        assert_eq!(format_duration(Duration::from_secs(3_720)), "1h 2m");
    }
}

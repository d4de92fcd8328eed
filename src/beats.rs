//! Swatch Internet Time.
//!
//! A day has 1000 beats of 86.4 seconds each, counted from midnight at the
//! Biel meridian (UTC+1).

use chrono::{DateTime, Timelike, Utc};

/// Biel meridian offset from UTC, in seconds.
pub const BIEL_OFFSET_SECS: f64 = 3600.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const SECONDS_PER_BEAT: f64 = 86.4;

const CENTIBEATS_PER_DAY: u32 = 100_000;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// A time of day in beats, held to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Beats {
    centibeats: u32,
}

impl Beats {
    /// From UTC seconds since midnight, fractional milliseconds included.
    pub fn from_utc_seconds(seconds: f64) -> Beats {
        let biel = (seconds + BIEL_OFFSET_SECS).rem_euclid(SECONDS_PER_DAY);
        let raw = biel / SECONDS_PER_BEAT;
        let mut centibeats = (raw * 100.0).round() as u32;
        // 999.995 and up rounds to 1000.00, which is midnight again
        if centibeats >= CENTIBEATS_PER_DAY {
            centibeats -= CENTIBEATS_PER_DAY;
        }
        Beats { centibeats }
    }

    /// From milliseconds since the Unix epoch.
    pub fn from_unix_millis(millis: i64) -> Beats {
        Beats::from_utc_seconds(millis.rem_euclid(MILLIS_PER_DAY) as f64 / 1000.0)
    }

    pub fn from_datetime(dt: &DateTime<Utc>) -> Beats {
        let millis = dt.timestamp_subsec_millis().min(999);
        Beats::from_utc_seconds(dt.num_seconds_from_midnight() as f64 + millis as f64 / 1000.0)
    }

    pub fn now() -> Beats {
        Beats::from_datetime(&Utc::now())
    }

    /// Beats as a number in `[0, 1000)`.
    pub fn value(&self) -> f64 {
        self.centibeats as f64 / 100.0
    }

    /// Integer part, `0..=999`.
    pub fn whole(&self) -> u32 {
        self.centibeats / 100
    }

    /// Two-digit fractional part, `0..=99`.
    pub fn centi(&self) -> u32 {
        self.centibeats % 100
    }
}

impl std::fmt::Display for Beats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{:03}.{:02}", self.whole(), self.centi())
    }
}

/// Which parts of the reading are visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub hide_at: bool,
    pub hide_centibeats: bool,
    pub add_beats: bool,
}

/// Text for each node of a rendered clock. Hidden parts are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatsText {
    pub at_sign: &'static str,
    pub whole: String,
    pub centibeats: String,
    pub label: &'static str,
}

impl BeatsText {
    pub fn new(beats: Beats, options: DisplayOptions) -> BeatsText {
        BeatsText {
            at_sign: if options.hide_at { "" } else { "@" },
            whole: format!("{:03}", beats.whole()),
            centibeats: if options.hide_centibeats {
                String::new()
            } else {
                format!(".{:02}", beats.centi())
            },
            label: if options.add_beats { "beats" } else { "" },
        }
    }
}

impl std::fmt::Display for BeatsText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.at_sign, self.whole, self.centibeats)?;
        if !self.label.is_empty() {
            write!(f, " {}", self.label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32, ms: u32) -> Beats {
        let dt = Utc
            .with_ymd_and_hms(2025, 11, 28, h, m, s)
            .unwrap()
            .with_nanosecond(ms * 1_000_000)
            .unwrap();
        Beats::from_datetime(&dt)
    }

    #[test]
    fn test_utc_midnight() {
        let b = at(0, 0, 0, 0);
        assert_eq!(b.whole(), 41);
        assert_eq!(b.centi(), 67);
        assert_eq!(b.to_string(), "@041.67");
    }

    #[test]
    fn test_biel_midnight_wraps_to_zero() {
        let b = at(23, 0, 0, 0);
        assert_eq!(b.value(), 0.0);
        assert_eq!(b.to_string(), "@000.00");
    }

    #[test]
    fn test_utc_noon() {
        assert_eq!(at(12, 0, 0, 0).to_string(), "@541.67");
        assert_eq!(at(12, 30, 0, 0).to_string(), "@562.50");
    }

    #[test]
    fn test_rounding_up_to_a_thousand_wraps() {
        let b = at(22, 59, 59, 999);
        assert_eq!(b.whole(), 0);
        assert_eq!(b.centi(), 0);
    }

    #[test]
    fn test_from_unix_millis() {
        // 1970-01-01T00:00:00Z
        assert_eq!(Beats::from_unix_millis(0).to_string(), "@041.67");
        // one beat later
        assert_eq!(Beats::from_unix_millis(86_400).to_string(), "@042.67");
        // before the epoch still lands inside the day
        assert_eq!(Beats::from_unix_millis(-3_600_000).to_string(), "@000.00");
    }

    #[test]
    fn test_display_options() {
        let b = at(12, 30, 0, 0);
        let all = BeatsText::new(b, DisplayOptions::default());
        assert_eq!(all.at_sign, "@");
        assert_eq!(all.whole, "562");
        assert_eq!(all.centibeats, ".50");
        assert_eq!(all.label, "");

        let opts = DisplayOptions {
            hide_at: true,
            hide_centibeats: true,
            add_beats: true,
        };
        let text = BeatsText::new(b, opts);
        assert_eq!(text.at_sign, "");
        assert_eq!(text.centibeats, "");
        assert_eq!(text.to_string(), "562 beats");
    }
}

//! Playback speeds and speed-adjusted timestamps.
//!
//! Every speed is a separately encoded asset, so switching speed means
//! switching media and moving the playhead onto the new asset's timeline.
//! Speeds and remapped times are carried as decimal strings: analytics
//! payloads and media id lookup key off the exact text ("0.75", "80.000").

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;

/// String-encoded playback speed, normalised to two decimals with a
/// trailing ".00" collapsed to ".0" ("1" -> "1.0", "1.5" -> "1.50").
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaybackSpeed(String);

impl PlaybackSpeed {
    /// Parse and normalise a speed string.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: f64 = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid playback speed '{}'", raw))?;
        if !value.is_finite() || value <= 0.0 {
            bail!("Playback speed must be positive, got '{}'", raw);
        }
        let text = format!("{:.2}", value);
        let text = match text.strip_suffix(".00") {
            Some(whole) => format!("{}.0", whole),
            None => text,
        };
        // "0.001" survives the check above but rounds to "0.0"
        if !text.parse::<f64>().is_ok_and(|rate| rate > 0.0) {
            bail!("Playback speed '{}' rounds to zero", raw);
        }
        Ok(Self(text))
    }

    /// Normal speed ("1.0")
    pub fn normal() -> Self {
        Self("1.0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric rate. Always valid: the text was produced by `parse`.
    pub fn rate(&self) -> f64 {
        self.0.parse().unwrap_or(1.0)
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlaybackSpeed {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PlaybackSpeed> for String {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.0
    }
}

/// Timestamp in seconds rendered with exactly three decimals ("80.000").
///
/// Produced by speed remapping and handed verbatim to load/cue commands.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedTime {
    text: String,
    secs: f64,
}

impl FixedTime {
    pub fn from_secs(secs: f64) -> Self {
        let text = format!("{:.3}", secs.max(0.0));
        // Re-parse so `secs()` agrees with what the text says
        let secs = text.parse().unwrap_or(0.0);
        Self { text, secs }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn secs(&self) -> f64 {
        self.secs
    }
}

impl fmt::Display for FixedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Move `time` from the `old` speed's timeline onto the `new` one,
/// keeping the real elapsed time the same.
///
/// `remap_time(60.0, "1.0", "0.75")` is "80.000".
pub fn remap_time(time: f64, old: &PlaybackSpeed, new: &PlaybackSpeed) -> FixedTime {
    FixedTime::from_secs(time * (old.rate() / new.rate()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed(s: &str) -> PlaybackSpeed {
        PlaybackSpeed::parse(s).unwrap()
    }

    #[test]
    fn test_normalise() {
        assert_eq!(speed("1").as_str(), "1.0");
        assert_eq!(speed("1.0").as_str(), "1.0");
        assert_eq!(speed("0.75").as_str(), "0.75");
        assert_eq!(speed("1.5").as_str(), "1.50");
        assert_eq!(speed(" 1.25 ").as_str(), "1.25");
        assert_eq!(speed("2").rate(), 2.0);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(PlaybackSpeed::parse("fast").is_err());
        assert!(PlaybackSpeed::parse("0").is_err());
        assert!(PlaybackSpeed::parse("-1.0").is_err());
        assert!(PlaybackSpeed::parse("NaN").is_err());
    }

    #[test]
    fn test_rejects_speed_rounding_to_zero() {
        assert!(PlaybackSpeed::parse("0.001").is_err());
        assert!(PlaybackSpeed::parse("0.004").is_err());
        assert_eq!(speed("0.006").as_str(), "0.01");
        assert!(speed("0.006").rate() > 0.0);
    }

    #[test]
    fn test_remap_to_slower() {
        let t = remap_time(60.0, &speed("1.0"), &speed("0.75"));
        assert_eq!(t.as_str(), "80.000");
        assert_eq!(t.secs(), 80.0);
    }

    #[test]
    fn test_remap_to_faster() {
        let t = remap_time(90.0, &speed("1.0"), &speed("1.50"));
        assert_eq!(t.as_str(), "60.000");
        let t = remap_time(10.0, &speed("0.75"), &speed("1.25"));
        assert_eq!(t.as_str(), "6.000");
    }

    #[test]
    fn test_remap_there_and_back() {
        let speeds = ["0.75", "1.0", "1.25", "1.50"];
        for &a in &speeds {
            for &b in &speeds {
                for &t in &[0.0, 1.0, 13.37, 60.0, 599.999, 3600.5] {
                    let there = remap_time(t, &speed(a), &speed(b));
                    let back = remap_time(there.secs(), &speed(b), &speed(a));
                    // Each leg rounds to 1ms; the return leg can scale that by b/a
                    assert!(
                        (back.secs() - t).abs() <= 0.003,
                        "{} via {} -> {}: got {}",
                        a,
                        b,
                        t,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn test_fixed_time_clamps_negative() {
        assert_eq!(FixedTime::from_secs(-3.0).as_str(), "0.000");
        assert_eq!(FixedTime::from_secs(1.23456).as_str(), "1.235");
    }

    #[test]
    fn test_serde_roundtrip_normalises() {
        let s: PlaybackSpeed = serde_json::from_str("\"1.5\"").unwrap();
        assert_eq!(s.as_str(), "1.50");
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"1.50\"");
    }
}

//! Tokenizing and report-header helpers shared by the METAR and TAF decoders.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static STATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9]{3}$").unwrap());
static REPORT_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2})(\d{2})Z$").unwrap());

/// Split report text on any whitespace (including line breaks) and drop the
/// `=` end-of-message marker some feeds append.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|token| token.trim_end_matches('='))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Day-of-month and UTC time from a `DDHHMMZ` group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportTime {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl ReportTime {
    pub fn parse(token: &str) -> Option<Self> {
        let caps = REPORT_TIME.captures(token)?;
        let day: u8 = caps[1].parse().ok()?;
        let hour: u8 = caps[2].parse().ok()?;
        let minute: u8 = caps[3].parse().ok()?;
        if !(1..=31).contains(&day) || hour > 23 || minute > 59 {
            return None;
        }
        Some(ReportTime { day, hour, minute })
    }
}

impl fmt::Display for ReportTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}{:02}Z", self.day, self.hour, self.minute)
    }
}

/// First four-character ICAO-style identifier in the token list.
pub fn station_of(tokens: &[&str]) -> Option<String> {
    tokens
        .iter()
        .find(|token| STATION.is_match(token))
        .map(|token| token.to_string())
}

/// First `DDHHMMZ` group in the token list.
pub fn report_time_of(tokens: &[&str]) -> Option<ReportTime> {
    tokens.iter().find_map(|token| ReportTime::parse(token))
}

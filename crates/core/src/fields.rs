//! Visibility and altimeter extraction.
//!
//! Each extractor looks at a single token and reports [`ParseOutcome::Absent`]
//! when the token is not of its kind, so callers can try every token of a
//! report until the first hit.

use std::sync::LazyLock;

use regex::Regex;

pub const METERS_PER_STATUTE_MILE: f64 = 1609.344;
pub const HPA_PER_INCH_HG: f64 = 33.8639;
/// Visibility reported for `CAVOK` (10 km or more)
pub const CAVOK_VISIBILITY_METERS: u32 = 9999;

static ICAO_METERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());
static WHOLE_MILES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,2})SM$").unwrap());
static FRACTION_MILES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^M?(\d{1,2})/(\d{1,2})SM$").unwrap());
static PLUS_MILES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^P(\d{1,2})SM$").unwrap());
static SINGLE_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d$").unwrap());
static QNH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Q(\d{4})$").unwrap());
static INCHES_HG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^A(\d{4})$").unwrap());

/// Result of trying to read one optional report field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    Absent,
}

impl<T> ParseOutcome<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            ParseOutcome::Parsed(value) => Some(value),
            ParseOutcome::Absent => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }
}

impl<T> From<Option<T>> for ParseOutcome<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => ParseOutcome::Parsed(v),
            None => ParseOutcome::Absent,
        }
    }
}

fn miles_to_meters(miles: f64) -> u32 {
    (miles * METERS_PER_STATUTE_MILE).round() as u32
}

fn fraction_miles(token: &str) -> Option<f64> {
    let caps = FRACTION_MILES.captures(token)?;
    let numerator: f64 = caps[1].parse().ok()?;
    let denominator: f64 = caps[2].parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Visibility in meters from `9999`, `10SM`, `1/2SM`, `P6SM` or `CAVOK`.
///
/// `P6SM` is a lower bound and converts like any other mile value.
pub fn extract_visibility(token: &str) -> ParseOutcome<u32> {
    if token == "CAVOK" {
        return ParseOutcome::Parsed(CAVOK_VISIBILITY_METERS);
    }
    if ICAO_METERS.is_match(token) {
        return token.parse::<u32>().ok().into();
    }
    if let Some(caps) = WHOLE_MILES.captures(token) {
        return caps[1].parse::<f64>().ok().map(miles_to_meters).into();
    }
    if let Some(caps) = PLUS_MILES.captures(token) {
        return caps[1].parse::<f64>().ok().map(miles_to_meters).into();
    }
    fraction_miles(token).map(miles_to_meters).into()
}

/// Altimeter setting in hectopascals from `Q1013` or `A2992`.
///
/// Inches of mercury are truncated after conversion, so `A3020` reads 1022.
pub fn extract_altimeter(token: &str) -> ParseOutcome<u32> {
    if let Some(caps) = QNH.captures(token) {
        return caps[1].parse::<u32>().ok().into();
    }
    if let Some(caps) = INCHES_HG.captures(token) {
        return caps[1]
            .parse::<f64>()
            .ok()
            .map(|hundredths| (hundredths / 100.0 * HPA_PER_INCH_HG).trunc() as u32)
            .into();
    }
    ParseOutcome::Absent
}

/// First visibility in a token list. A single-digit token directly before a
/// fraction (`1 1/2SM`) is added to it.
pub fn scan_visibility<S: AsRef<str>>(tokens: &[S]) -> ParseOutcome<u32> {
    for (i, token) in tokens.iter().enumerate() {
        let token = token.as_ref();
        if let Some(fraction) = fraction_miles(token) {
            let whole = i
                .checked_sub(1)
                .map(|prev| tokens[prev].as_ref())
                .filter(|prev| SINGLE_DIGIT.is_match(prev))
                .and_then(|prev| prev.parse::<f64>().ok())
                .unwrap_or(0.0);
            return ParseOutcome::Parsed(miles_to_meters(whole + fraction));
        }
        if let ParseOutcome::Parsed(meters) = extract_visibility(token) {
            return ParseOutcome::Parsed(meters);
        }
    }
    ParseOutcome::Absent
}

/// First altimeter setting in a token list.
pub fn scan_altimeter<S: AsRef<str>>(tokens: &[S]) -> ParseOutcome<u32> {
    tokens
        .iter()
        .find_map(|token| extract_altimeter(token.as_ref()).ok())
        .into()
}

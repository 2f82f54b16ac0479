//! METAR observation decoding.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::category::{classify, FlightCategory};
use crate::clouds::{ceiling_from_layers, parse_layers, CloudLayer};
use crate::fields::{scan_altimeter, scan_visibility};
use crate::tokens::{report_time_of, station_of, tokenize, ReportTime};

static WIND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3}|VRB)(\d{2,3})(?:G(\d{2,3}))?(KT|MPS)$").unwrap());
static TEMPERATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(M?\d{2})/(M?\d{2})?$").unwrap());

/// Groups after which a METAR carries remarks or a trend forecast.
const SECTION_BREAKS: [&str; 4] = ["RMK", "NOSIG", "BECMG", "TEMPO"];

const KNOTS_PER_MPS: f64 = 1.943_844;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindDirection {
    Degrees(u16),
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WindUnit {
    Kt,
    Mps,
}

impl WindUnit {
    fn suffix(&self) -> &'static str {
        match self {
            WindUnit::Kt => "kt",
            WindUnit::Mps => "m/s",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wind {
    pub direction: WindDirection,
    pub speed: u16,
    pub gust: Option<u16>,
    pub unit: WindUnit,
    pub display: String,
}

impl Wind {
    pub fn parse(token: &str) -> Option<Wind> {
        let caps = WIND.captures(token)?;
        let direction = match &caps[1] {
            "VRB" => WindDirection::Variable,
            degrees => WindDirection::Degrees(degrees.parse().ok()?),
        };
        let speed: u16 = caps[2].parse().ok()?;
        let gust = caps.get(3).and_then(|g| g.as_str().parse().ok());
        let unit = if &caps[4] == "MPS" {
            WindUnit::Mps
        } else {
            WindUnit::Kt
        };
        let display = format_wind(direction, speed, gust, unit);
        Some(Wind {
            direction,
            speed,
            gust,
            unit,
            display,
        })
    }

    pub fn is_calm(&self) -> bool {
        self.speed == 0 && self.gust.is_none()
    }

    /// Gust if reported, otherwise the mean speed, in knots.
    pub fn peak_knots(&self) -> f64 {
        let peak = f64::from(self.gust.unwrap_or(self.speed));
        match self.unit {
            WindUnit::Kt => peak,
            WindUnit::Mps => peak * KNOTS_PER_MPS,
        }
    }
}

fn format_wind(direction: WindDirection, speed: u16, gust: Option<u16>, unit: WindUnit) -> String {
    if speed == 0 && gust.is_none() {
        return "Calm".to_string();
    }
    let from = match direction {
        WindDirection::Degrees(d) => format!("{:03}°", d),
        WindDirection::Variable => "Variable".to_string(),
    };
    match gust {
        Some(g) => format!("{} at {}{} gusting {}{}", from, speed, unit.suffix(), g, unit.suffix()),
        None => format!("{} at {}{}", from, speed, unit.suffix()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Temperature {
    pub air_celsius: i16,
    pub dewpoint_celsius: Option<i16>,
}

fn signed_celsius(value: &str) -> Option<i16> {
    match value.strip_prefix('M') {
        Some(magnitude) => magnitude.parse::<i16>().ok().map(|v| -v),
        None => value.parse().ok(),
    }
}

impl Temperature {
    pub fn parse(token: &str) -> Option<Temperature> {
        let caps = TEMPERATURE.captures(token)?;
        Some(Temperature {
            air_celsius: signed_celsius(&caps[1])?,
            dewpoint_celsius: caps.get(2).and_then(|d| signed_celsius(d.as_str())),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetarReport {
    pub station: Option<String>,
    pub observed_at: Option<ReportTime>,
    pub wind: Option<Wind>,
    pub visibility_meters: Option<u32>,
    pub altimeter_hpa: Option<u32>,
    pub temperature: Option<Temperature>,
    pub clouds: Vec<CloudLayer>,
    pub ceiling_feet: Option<u32>,
    pub category: FlightCategory,
    pub raw: String,
}

/// Decode the main body of a METAR; remarks and trend groups are ignored.
pub fn decode_metar(raw: &str) -> MetarReport {
    let tokens = tokenize(raw);
    let body_end = tokens
        .iter()
        .position(|token| SECTION_BREAKS.contains(token))
        .unwrap_or(tokens.len());
    let body = &tokens[..body_end];

    let visibility_meters = scan_visibility(body).ok();
    let clouds = parse_layers(body);
    let ceiling_feet = ceiling_from_layers(&clouds);

    MetarReport {
        station: station_of(body),
        observed_at: report_time_of(body),
        wind: body.iter().find_map(|token| Wind::parse(token)),
        visibility_meters,
        altimeter_hpa: scan_altimeter(body).ok(),
        temperature: body.iter().find_map(|token| Temperature::parse(token)),
        category: classify(visibility_meters, ceiling_feet),
        clouds,
        ceiling_feet,
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_us_metar() {
        let report = decode_metar(
            "METAR KJFK 011651Z 27015G25KT 10SM FEW015 BKN025 OVC040 24/12 A3002 RMK AO2 SLP165",
        );
        assert_eq!(report.station.as_deref(), Some("KJFK"));
        assert_eq!(report.observed_at.unwrap().to_string(), "01/1651Z");
        let wind = report.wind.unwrap();
        assert_eq!(wind.direction, WindDirection::Degrees(270));
        assert_eq!(wind.gust, Some(25));
        assert_eq!(wind.display, "270° at 15kt gusting 25kt");
        assert_eq!(report.visibility_meters, Some(16093));
        assert_eq!(report.altimeter_hpa, Some(1016));
        assert_eq!(
            report.temperature,
            Some(Temperature {
                air_celsius: 24,
                dewpoint_celsius: Some(12)
            })
        );
        assert_eq!(report.clouds.len(), 3);
        assert_eq!(report.ceiling_feet, Some(2500));
        assert_eq!(report.category, FlightCategory::Mvfr);
    }

    #[test]
    fn decodes_icao_metar() {
        let report = decode_metar("EGLL 011650Z 24008MPS 200V280 9999 SCT030 M02/M05 Q1013 NOSIG");
        assert_eq!(report.station.as_deref(), Some("EGLL"));
        assert_eq!(report.wind.as_ref().unwrap().unit, WindUnit::Mps);
        assert_eq!(report.visibility_meters, Some(9999));
        assert_eq!(report.altimeter_hpa, Some(1013));
        assert_eq!(report.temperature.unwrap().air_celsius, -2);
        assert_eq!(report.ceiling_feet, None);
        assert_eq!(report.category, FlightCategory::Vfr);
    }

    #[test]
    fn trend_groups_do_not_leak_into_observation() {
        let report = decode_metar("LFPG 011630Z 18010KT 9999 FEW040 12/08 Q1008 TEMPO 3000 BKN008");
        assert_eq!(report.ceiling_feet, None);
        assert_eq!(report.visibility_meters, Some(9999));
    }

    #[test]
    fn calm_and_variable_wind() {
        let calm = Wind::parse("00000KT").unwrap();
        assert!(calm.is_calm());
        assert_eq!(calm.display, "Calm");
        let vrb = Wind::parse("VRB03KT").unwrap();
        assert_eq!(vrb.direction, WindDirection::Variable);
        assert_eq!(vrb.display, "Variable at 3kt");
        assert!(Wind::parse("27015").is_none());
    }

    #[test]
    fn empty_metar_is_all_absent() {
        let report = decode_metar("");
        assert_eq!(report.station, None);
        assert_eq!(report.wind, None);
        assert_eq!(report.visibility_meters, None);
        assert!(report.clouds.is_empty());
        assert_eq!(report.category, FlightCategory::Unk);
    }
}

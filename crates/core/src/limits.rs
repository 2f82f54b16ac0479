//! Crosswind / tailwind operating limits.
//!
//! The table is supplied by the caller (usually from the config file) and
//! only consulted when a runway is known.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::metar::{Wind, WindDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunwaySurface {
    #[default]
    Dry,
    Wet,
    Contaminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApproachKind {
    #[default]
    Visual,
    Instrument,
}

impl FromStr for RunwaySurface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dry" => Ok(RunwaySurface::Dry),
            "wet" => Ok(RunwaySurface::Wet),
            "contaminated" => Ok(RunwaySurface::Contaminated),
            other => Err(format!(
                "unknown runway surface `{}` (expected dry, wet or contaminated)",
                other
            )),
        }
    }
}

impl FromStr for ApproachKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visual" => Ok(ApproachKind::Visual),
            "instrument" => Ok(ApproachKind::Instrument),
            other => Err(format!(
                "unknown approach kind `{}` (expected visual or instrument)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindLimit {
    pub surface: RunwaySurface,
    pub approach: ApproachKind,
    pub max_crosswind_kt: f64,
    pub max_tailwind_kt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingLimits {
    pub wind: Vec<WindLimit>,
}

impl Default for OperatingLimits {
    fn default() -> Self {
        use ApproachKind::*;
        use RunwaySurface::*;
        let row = |surface, approach, max_crosswind_kt, max_tailwind_kt| WindLimit {
            surface,
            approach,
            max_crosswind_kt,
            max_tailwind_kt,
        };
        OperatingLimits {
            wind: vec![
                row(Dry, Visual, 25.0, 10.0),
                row(Dry, Instrument, 20.0, 10.0),
                row(Wet, Visual, 20.0, 5.0),
                row(Wet, Instrument, 15.0, 5.0),
                row(Contaminated, Visual, 15.0, 0.0),
                row(Contaminated, Instrument, 10.0, 0.0),
            ],
        }
    }
}

impl OperatingLimits {
    pub fn lookup(&self, surface: RunwaySurface, approach: ApproachKind) -> Option<&WindLimit> {
        self.wind
            .iter()
            .find(|limit| limit.surface == surface && limit.approach == approach)
    }
}

/// Runway the crew expects to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunwayContext {
    pub heading_degrees: u16,
    pub surface: RunwaySurface,
    pub approach: ApproachKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindComponents {
    pub crosswind_kt: f64,
    /// Zero when the wind has a headwind component
    pub tailwind_kt: f64,
}

/// Crosswind and tailwind for the peak (gust) wind. Variable winds are counted
/// entirely as crosswind.
pub fn wind_components(wind: &Wind, runway_heading: u16) -> WindComponents {
    let peak = wind.peak_knots();
    match wind.direction {
        WindDirection::Variable => WindComponents {
            crosswind_kt: peak,
            tailwind_kt: 0.0,
        },
        WindDirection::Degrees(from) => {
            let angle = (f64::from(from) - f64::from(runway_heading)).to_radians();
            WindComponents {
                crosswind_kt: (peak * angle.sin()).abs(),
                tailwind_kt: (-peak * angle.cos()).max(0.0),
            }
        }
    }
}

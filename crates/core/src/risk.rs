//! Risk judgment.
//!
//! The baseline judgment only looks at the ceiling. [`assess`] adds observed
//! category, forecast segments and, when a runway is known, wind limits.
//! Levels are a screening aid and carry no operational authority.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::FlightCategory;
use crate::clouds::{ceiling_from_layers, CloudLayer};
use crate::limits::{wind_components, OperatingLimits, RunwayContext};
use crate::metar::{MetarReport, Wind};
use crate::taf::TafTimeline;

/// Ceilings below this raise the level to AMBER
pub const AMBER_CEILING_FEET: u32 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Green,
    Amber,
    Red,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Green => "GREEN",
            RiskLevel::Amber => "AMBER",
            RiskLevel::Red => "RED",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskJudgment {
    pub level: RiskLevel,
    pub reasons: Vec<String>,
    pub ceiling_feet: Option<u32>,
}

impl RiskJudgment {
    fn new(ceiling_feet: Option<u32>) -> Self {
        RiskJudgment {
            level: RiskLevel::Green,
            reasons: vec![],
            ceiling_feet,
        }
    }

    fn raise(&mut self, level: RiskLevel, reason: String) {
        self.level = self.level.max(level);
        self.reasons.push(reason);
    }
}

/// What the full assessment takes into account beyond the ceiling
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RiskPolicy {
    pub runway: Option<RunwayContext>,
    #[serde(default)]
    pub limits: OperatingLimits,
}

pub fn judge(clouds: &[CloudLayer]) -> RiskJudgment {
    judge_ceiling(ceiling_from_layers(clouds))
}

pub fn judge_ceiling(ceiling_feet: Option<u32>) -> RiskJudgment {
    let mut judgment = RiskJudgment::new(ceiling_feet);
    if let Some(ceiling) = ceiling_feet.filter(|c| *c < AMBER_CEILING_FEET) {
        judgment.raise(
            RiskLevel::Amber,
            format!("Ceiling {}ft below {}ft", ceiling, AMBER_CEILING_FEET),
        );
    }
    judgment
}

/// Judge a station from its observation and forecast, either of which may be
/// missing.
///
/// - observed ceiling below 3000ft: AMBER
/// - observed LIFR: RED
/// - observed wind beyond the runway's limits: RED
/// - BASE/FM segment forecast IFR or LIFR: AMBER
/// - BECMG/TEMPO/PROB segment forecast LIFR: AMBER
pub fn assess(
    metar: Option<&MetarReport>,
    taf: Option<&TafTimeline>,
    policy: &RiskPolicy,
) -> RiskJudgment {
    let mut judgment = judge_ceiling(metar.and_then(|m| m.ceiling_feet));

    if let Some(metar) = metar {
        if metar.category == FlightCategory::Lifr {
            judgment.raise(RiskLevel::Red, "Observed conditions LIFR".to_string());
        }
        if let (Some(runway), Some(wind)) = (policy.runway, metar.wind.as_ref()) {
            check_wind_limits(&mut judgment, runway, wind, &policy.limits);
        }
    }

    if let Some(taf) = taf {
        for segment in &taf.segments {
            let flagged = if segment.kind.is_prevailing() {
                segment.category.is_instrument()
            } else {
                segment.category == FlightCategory::Lifr
            };
            if flagged {
                judgment.raise(
                    RiskLevel::Amber,
                    format!("Forecast {} {}", segment.category, segment.label),
                );
            }
        }
    }

    judgment
}

fn check_wind_limits(
    judgment: &mut RiskJudgment,
    runway: RunwayContext,
    wind: &Wind,
    limits: &OperatingLimits,
) {
    let Some(limit) = limits.lookup(runway.surface, runway.approach) else {
        return;
    };
    let components = wind_components(wind, runway.heading_degrees);
    if components.crosswind_kt > limit.max_crosswind_kt {
        judgment.raise(
            RiskLevel::Red,
            format!(
                "Crosswind {:.0}kt exceeds {:.0}kt limit for runway heading {:03}",
                components.crosswind_kt, limit.max_crosswind_kt, runway.heading_degrees
            ),
        );
    }
    if components.tailwind_kt > limit.max_tailwind_kt {
        judgment.raise(
            RiskLevel::Red,
            format!(
                "Tailwind {:.0}kt exceeds {:.0}kt limit for runway heading {:03}",
                components.tailwind_kt, limit.max_tailwind_kt, runway.heading_degrees
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clouds::parse_layers;
    use crate::limits::{ApproachKind, RunwaySurface};
    use crate::metar::decode_metar;
    use crate::taf::segment_taf;

    #[test]
    fn low_ceiling_is_amber() {
        let judgment = judge(&parse_layers(&["BKN020"]));
        assert_eq!(judgment.level, RiskLevel::Amber);
        assert_eq!(judgment.reasons.len(), 1);
        assert!(judgment.reasons[0].contains("2000ft"));
        assert_eq!(judgment.ceiling_feet, Some(2000));
    }

    #[test]
    fn high_or_no_ceiling_is_green() {
        let judgment = judge(&parse_layers(&["SCT250"]));
        assert_eq!(judgment.level, RiskLevel::Green);
        assert!(judgment.reasons.is_empty());
        assert_eq!(judgment.ceiling_feet, None);

        assert_eq!(judge_ceiling(Some(3000)).level, RiskLevel::Green);
    }

    #[test]
    fn observed_lifr_is_red() {
        let metar = decode_metar("KSFO 011556Z 00000KT 1/4SM FG VV001 12/12 A3001");
        let judgment = assess(Some(&metar), None, &RiskPolicy::default());
        assert_eq!(judgment.level, RiskLevel::Red);
        assert_eq!(judgment.reasons.len(), 2);
        assert!(judgment.reasons[0].contains("100ft"));
        assert_eq!(judgment.reasons[1], "Observed conditions LIFR");
    }

    #[test]
    fn forecast_ifr_is_amber() {
        let metar = decode_metar("KBOS 011554Z 20010KT 10SM FEW250 20/10 A3000");
        let taf = segment_taf(
            "TAF KBOS 011130Z 0112/0212 20010KT P6SM FEW250 FM020000 18008KT 2SM BR OVC006",
        );
        let judgment = assess(Some(&metar), Some(&taf), &RiskPolicy::default());
        assert_eq!(judgment.level, RiskLevel::Amber);
        assert_eq!(judgment.reasons.len(), 1);
        assert!(judgment.reasons[0].starts_with("Forecast IFR FM 02/0000Z"));
    }

    #[test]
    fn overlays_only_count_when_lifr() {
        let taf = segment_taf(
            "TAF KBOS 011130Z 0112/0212 P6SM FEW250
             TEMPO 0114/0116 2SM BR BKN008
             PROB30 0120/0122 1/2SM FG VV002",
        );
        let judgment = assess(None, Some(&taf), &RiskPolicy::default());
        assert_eq!(judgment.level, RiskLevel::Amber);
        assert_eq!(judgment.reasons.len(), 1);
        assert!(judgment.reasons[0].contains("PROB30"));
    }

    #[test]
    fn crosswind_over_limit_is_red() {
        let metar = decode_metar("KDEN 011553Z 36025G35KT 10SM SCT080 10/M05 A3010");
        let policy = RiskPolicy {
            runway: Some(RunwayContext {
                heading_degrees: 80,
                surface: RunwaySurface::Wet,
                approach: ApproachKind::Visual,
            }),
            limits: OperatingLimits::default(),
        };
        let judgment = assess(Some(&metar), None, &policy);
        assert_eq!(judgment.level, RiskLevel::Red);
        assert!(judgment.reasons[0].starts_with("Crosswind 34kt exceeds 20kt"));

        let judgment = assess(Some(&metar), None, &RiskPolicy::default());
        assert_eq!(judgment.level, RiskLevel::Green);
    }

    #[test]
    fn nothing_to_judge_is_green() {
        let judgment = assess(None, None, &RiskPolicy::default());
        assert_eq!(judgment.level, RiskLevel::Green);
        assert!(judgment.reasons.is_empty());
    }
}

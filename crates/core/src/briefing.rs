//! One station's decoded observation, forecast and risk.

use serde::Serialize;

use crate::metar::{decode_metar, MetarReport};
use crate::risk::{assess, RiskJudgment, RiskPolicy};
use crate::taf::{decode_taf, TafReport};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Briefing {
    pub station: String,
    pub metar: Option<MetarReport>,
    pub taf: Option<TafReport>,
    pub risk: RiskJudgment,
}

fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Decode both reports for `station` and judge them together. Empty text means
/// the report was not available and leaves that half of the briefing empty.
pub fn brief(station: &str, metar_raw: &str, taf_raw: &str, policy: &RiskPolicy) -> Briefing {
    let metar = non_empty(metar_raw).map(decode_metar);
    let taf = non_empty(taf_raw).map(decode_taf);
    let risk = assess(metar.as_ref(), taf.as_ref().map(|t| &t.timeline), policy);

    Briefing {
        station: station.to_uppercase(),
        metar,
        taf,
        risk,
    }
}

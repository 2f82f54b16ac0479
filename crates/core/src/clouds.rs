//! Cloud layers and ceiling.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::fields::ParseOutcome;

static CLOUD_LAYER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(FEW|SCT|BKN|OVC|VV)(\d{3})(CB|TCU)?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CloudCover {
    Few,
    Sct,
    Bkn,
    Ovc,
    /// Vertical visibility into an obscured sky
    Vv,
}

impl CloudCover {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "FEW" => Some(CloudCover::Few),
            "SCT" => Some(CloudCover::Sct),
            "BKN" => Some(CloudCover::Bkn),
            "OVC" => Some(CloudCover::Ovc),
            "VV" => Some(CloudCover::Vv),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CloudCover::Few => "FEW",
            CloudCover::Sct => "SCT",
            CloudCover::Bkn => "BKN",
            CloudCover::Ovc => "OVC",
            CloudCover::Vv => "VV",
        }
    }

    pub fn forms_ceiling(&self) -> bool {
        matches!(self, CloudCover::Bkn | CloudCover::Ovc | CloudCover::Vv)
    }
}

impl fmt::Display for CloudCover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Convective {
    Cb,
    Tcu,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloudLayer {
    pub kind: CloudCover,
    pub height_hundreds_feet: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convective: Option<Convective>,
    /// Token exactly as it appeared in the report
    pub raw: String,
}

impl CloudLayer {
    pub fn parse(token: &str) -> ParseOutcome<CloudLayer> {
        let Some(caps) = CLOUD_LAYER.captures(token) else {
            return ParseOutcome::Absent;
        };
        let (Some(kind), Ok(height)) = (CloudCover::from_code(&caps[1]), caps[2].parse::<u32>())
        else {
            return ParseOutcome::Absent;
        };
        let convective = caps.get(3).map(|m| match m.as_str() {
            "CB" => Convective::Cb,
            _ => Convective::Tcu,
        });
        ParseOutcome::Parsed(CloudLayer {
            kind,
            height_hundreds_feet: height,
            convective,
            raw: token.to_string(),
        })
    }

    pub fn height_feet(&self) -> u32 {
        self.height_hundreds_feet * 100
    }
}

/// Every cloud-layer token, in report order.
pub fn parse_layers<S: AsRef<str>>(tokens: &[S]) -> Vec<CloudLayer> {
    tokens
        .iter()
        .filter_map(|token| CloudLayer::parse(token.as_ref()).ok())
        .collect()
}

/// Lowest BKN/OVC/VV layer in feet, `None` when no layer forms a ceiling.
pub fn ceiling_from_layers(layers: &[CloudLayer]) -> Option<u32> {
    layers
        .iter()
        .filter(|layer| layer.kind.forms_ceiling())
        .map(CloudLayer::height_feet)
        .min()
}

pub fn ceiling_of<S: AsRef<str>>(tokens: &[S]) -> Option<u32> {
    ceiling_from_layers(&parse_layers(tokens))
}

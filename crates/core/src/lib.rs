//! SkyBrief Core Library
//!
//! Pure decoding engine shared by the briefer service:
//! - Visibility / altimeter token extraction
//! - Cloud layers, ceiling and flight category
//! - TAF validity window and change-group timeline
//! - Risk judgment over observed and forecast conditions
//! - Configuration loading (XDG-compliant)
//!
//! Every decoding function is total over its input: unrecognised tokens leave
//! fields empty instead of returning errors.

pub mod briefing;
pub mod category;
pub mod clouds;
mod config;
pub mod fields;
pub mod limits;
pub mod metar;
pub mod risk;
pub mod taf;
pub mod tokens;

pub use briefing::{brief, Briefing};
pub use category::{classify, FlightCategory};
pub use clouds::{ceiling_from_layers, ceiling_of, parse_layers, CloudCover, CloudLayer};
pub use config::{find_config_file, load_config, load_config_or_default, ConfigSource};
pub use fields::{
    extract_altimeter, extract_visibility, scan_altimeter, scan_visibility, ParseOutcome,
};
pub use limits::{ApproachKind, OperatingLimits, RunwayContext, RunwaySurface, WindLimit};
pub use metar::{decode_metar, MetarReport, Temperature, Wind, WindDirection, WindUnit};
pub use risk::{assess, judge, judge_ceiling, RiskJudgment, RiskLevel, RiskPolicy};
pub use taf::{
    decode_taf, segment_taf, ForecastSegment, SegmentKind, TafReport, TafTimeline,
    ValidityWindow,
};
pub use tokens::{tokenize, ReportTime};

/// Application name used for XDG paths
pub const APP_NAME: &str = "skybrief";

/// Upstream feed serving raw METAR/TAF text
pub const DEFAULT_FEED_URL: &str = "https://aviationweather.gov/api/data";

/// Default per-report fetch timeout
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10;

/// Default watch interval (10 minutes)
pub const DEFAULT_WATCH_INTERVAL: u64 = 600;

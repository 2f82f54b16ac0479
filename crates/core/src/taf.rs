//! TAF validity window and change-group timeline.
//!
//! All times are minute offsets from the start of the validity window. TAFs
//! only carry day-of-month and hour, so offsets come from a flat formula:
//!
//! `((day - start_day) * 24 + (hour - start_hour)) * 60 + minute`
//!
//! A window that crosses a month end (`3118/0106`) therefore yields a negative
//! total and no BASE/FM coverage. Month-aware rollover would need the issue
//! month, which the report does not carry.

use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;
use serde::Serialize;

use crate::category::{classify, FlightCategory};
use crate::clouds::{ceiling_from_layers, parse_layers};
use crate::fields::scan_visibility;
use crate::tokens::{report_time_of, station_of, tokenize, ReportTime};

static DAY_HOUR_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2})/(\d{2})(\d{2})$").unwrap());
static FROM_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^FM(\d{2})(\d{2})(\d{2})$").unwrap());
static PROB_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^PROB(\d{2})$").unwrap());

const UNAVAILABLE_LABEL: &str = "Validity window unavailable";

fn valid_day_hour(day: u8, hour: u8) -> bool {
    (1..=31).contains(&day) && hour <= 24
}

/// A `DDHH/DDHH` span: the report's validity, or a change group's own window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidityWindow {
    pub start_day: u8,
    pub start_hour: u8,
    pub end_day: u8,
    pub end_hour: u8,
}

impl ValidityWindow {
    /// Hours run 0-24, since TAFs commonly close a window at `24`.
    pub fn parse(token: &str) -> Option<Self> {
        let caps = DAY_HOUR_SPAN.captures(token)?;
        let window = ValidityWindow {
            start_day: caps[1].parse().ok()?,
            start_hour: caps[2].parse().ok()?,
            end_day: caps[3].parse().ok()?,
            end_hour: caps[4].parse().ok()?,
        };
        if !valid_day_hour(window.start_day, window.start_hour)
            || !valid_day_hour(window.end_day, window.end_hour)
        {
            return None;
        }
        Some(window)
    }

    pub fn offset_minutes(&self, day: u8, hour: u8, minute: u8) -> i64 {
        ((i64::from(day) - i64::from(self.start_day)) * 24
            + (i64::from(hour) - i64::from(self.start_hour)))
            * 60
            + i64::from(minute)
    }

    pub fn total_minutes(&self) -> i64 {
        self.offset_minutes(self.end_day, self.end_hour, 0)
    }

    /// Offsets of another span's start and end against this window.
    fn span_of(&self, other: &ValidityWindow) -> (i64, i64) {
        (
            self.offset_minutes(other.start_day, other.start_hour, 0),
            self.offset_minutes(other.end_day, other.end_hour, 0),
        )
    }

    /// `DD/HHMMZ` at a given offset, counted forward from the window start.
    fn clock_at(&self, offset: i64) -> String {
        let absolute =
            i64::from(self.start_day) * 1440 + i64::from(self.start_hour) * 60 + offset;
        format!(
            "{:02}/{:02}{:02}Z",
            absolute.div_euclid(1440),
            absolute.rem_euclid(1440) / 60,
            absolute.rem_euclid(60)
        )
    }

    pub fn label(&self) -> String {
        format!(
            "Valid {:02}/{:02}Z to {:02}/{:02}Z",
            self.start_day, self.start_hour, self.end_day, self.end_hour
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SegmentKind {
    Base,
    Fm,
    Becmg,
    Tempo,
    Prob,
}

impl SegmentKind {
    /// BASE and FM replace the prevailing forecast; the others overlay it.
    pub fn is_prevailing(&self) -> bool {
        matches!(self, SegmentKind::Base | SegmentKind::Fm)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastSegment {
    pub kind: SegmentKind,
    pub start_offset_minutes: i64,
    pub end_offset_minutes: i64,
    pub label: String,
    pub condition_text: String,
    pub visibility_meters: Option<u32>,
    pub ceiling_feet: Option<u32>,
    pub category: FlightCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<u8>,
}

impl ForecastSegment {
    pub fn duration_minutes(&self) -> i64 {
        self.end_offset_minutes - self.start_offset_minutes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TafTimeline {
    pub validity: Option<ValidityWindow>,
    pub segments: Vec<ForecastSegment>,
    pub total_offset_minutes: i64,
    pub validity_label: String,
}

impl TafTimeline {
    fn unavailable() -> Self {
        TafTimeline {
            validity: None,
            segments: vec![],
            total_offset_minutes: 0,
            validity_label: UNAVAILABLE_LABEL.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.validity.is_some()
    }

    /// BASE and FM segments, in time order.
    pub fn prevailing(&self) -> impl Iterator<Item = &ForecastSegment> {
        self.segments.iter().filter(|s| s.kind.is_prevailing())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ChangeGroup {
    From { day: u8, hour: u8, minute: u8 },
    Becmg(ValidityWindow),
    Tempo(ValidityWindow),
    Prob {
        percent: u8,
        tempo: bool,
        window: ValidityWindow,
    },
}

struct Marker {
    /// Index of the marker's first token in the body
    at: usize,
    /// Index of the first condition token after the marker
    conditions_from: usize,
    group: ChangeGroup,
}

/// Recognise a change group starting at `tokens[i]`, returning it with the
/// number of tokens it spans.
fn change_group_at(tokens: &[&str], i: usize) -> Option<(ChangeGroup, usize)> {
    let token = tokens[i];
    let window_at = |j: usize| tokens.get(j).and_then(|t| ValidityWindow::parse(t));

    if let Some(caps) = FROM_GROUP.captures(token) {
        let day: u8 = caps[1].parse().ok()?;
        let hour: u8 = caps[2].parse().ok()?;
        let minute: u8 = caps[3].parse().ok()?;
        if !valid_day_hour(day, hour) || minute > 59 {
            return None;
        }
        return Some((ChangeGroup::From { day, hour, minute }, 1));
    }
    match token {
        "BECMG" => return window_at(i + 1).map(|w| (ChangeGroup::Becmg(w), 2)),
        "TEMPO" => return window_at(i + 1).map(|w| (ChangeGroup::Tempo(w), 2)),
        _ => {}
    }
    let percent: u8 = PROB_GROUP.captures(token)?[1].parse().ok()?;
    if tokens.get(i + 1) == Some(&"TEMPO") {
        if let Some(window) = window_at(i + 2) {
            return Some((
                ChangeGroup::Prob {
                    percent,
                    tempo: true,
                    window,
                },
                3,
            ));
        }
    }
    window_at(i + 1).map(|window| {
        (
            ChangeGroup::Prob {
                percent,
                tempo: false,
                window,
            },
            2,
        )
    })
}

fn find_markers(body: &[&str]) -> Vec<Marker> {
    let mut markers = Vec::new();
    let mut i = 0;
    while i < body.len() {
        match change_group_at(body, i) {
            Some((group, len)) => {
                markers.push(Marker {
                    at: i,
                    conditions_from: i + len,
                    group,
                });
                i += len;
            }
            None => i += 1,
        }
    }
    markers
}

struct SegmentSpan {
    kind: SegmentKind,
    start: i64,
    end: i64,
    prefix: String,
    probability: Option<u8>,
}

fn build_segment(
    validity: &ValidityWindow,
    span: SegmentSpan,
    conditions: &[&str],
) -> ForecastSegment {
    let visibility_meters = scan_visibility(conditions).ok();
    let ceiling_feet = ceiling_from_layers(&parse_layers(conditions));
    ForecastSegment {
        kind: span.kind,
        start_offset_minutes: span.start,
        end_offset_minutes: span.end,
        label: format!(
            "{} {}-{}",
            span.prefix,
            validity.clock_at(span.start),
            validity.clock_at(span.end)
        ),
        condition_text: conditions.join(" "),
        visibility_meters,
        ceiling_feet,
        category: classify(visibility_meters, ceiling_feet),
        probability: span.probability,
    }
}

/// Split a raw TAF into its forecast timeline.
///
/// A TAF without a validity window yields an empty timeline. Segments whose
/// end does not exceed their start are dropped.
pub fn segment_taf(raw: &str) -> TafTimeline {
    let tokens = tokenize(raw);
    let Some((validity_at, validity)) = tokens
        .iter()
        .enumerate()
        .find_map(|(i, token)| ValidityWindow::parse(token).map(|w| (i, w)))
    else {
        debug!("no validity window in TAF, timeline unavailable");
        return TafTimeline::unavailable();
    };

    let body = &tokens[validity_at + 1..];
    let markers = find_markers(body);
    let total = validity.total_minutes();

    // FM times outside the window are pinned to its edges
    let from_starts: Vec<i64> = markers
        .iter()
        .filter_map(|m| match m.group {
            ChangeGroup::From { day, hour, minute } => {
                Some(validity.offset_minutes(day, hour, minute).min(total).max(0))
            }
            _ => None,
        })
        .collect();

    let base_conditions_end = markers.first().map(|m| m.at).unwrap_or(body.len());
    let mut segments = vec![build_segment(
        &validity,
        SegmentSpan {
            kind: SegmentKind::Base,
            start: 0,
            end: from_starts.first().copied().unwrap_or(total),
            prefix: "BASE".to_string(),
            probability: None,
        },
        &body[..base_conditions_end],
    )];

    let mut from_seen = 0;
    for (n, marker) in markers.iter().enumerate() {
        let conditions_end = markers.get(n + 1).map(|next| next.at).unwrap_or(body.len());
        let conditions = &body[marker.conditions_from..conditions_end];
        let span = match marker.group {
            ChangeGroup::From { .. } => {
                let start = from_starts[from_seen];
                from_seen += 1;
                SegmentSpan {
                    kind: SegmentKind::Fm,
                    start,
                    end: from_starts.get(from_seen).copied().unwrap_or(total),
                    prefix: "FM".to_string(),
                    probability: None,
                }
            }
            ChangeGroup::Becmg(window) => {
                let (start, end) = validity.span_of(&window);
                SegmentSpan {
                    kind: SegmentKind::Becmg,
                    start,
                    end,
                    prefix: "BECMG".to_string(),
                    probability: None,
                }
            }
            ChangeGroup::Tempo(window) => {
                let (start, end) = validity.span_of(&window);
                SegmentSpan {
                    kind: SegmentKind::Tempo,
                    start,
                    end,
                    prefix: "TEMPO".to_string(),
                    probability: None,
                }
            }
            ChangeGroup::Prob {
                percent,
                tempo,
                window,
            } => {
                let (start, end) = validity.span_of(&window);
                SegmentSpan {
                    kind: SegmentKind::Prob,
                    start,
                    end,
                    prefix: if tempo {
                        format!("PROB{:02} TEMPO", percent)
                    } else {
                        format!("PROB{:02}", percent)
                    },
                    probability: Some(percent),
                }
            }
        };
        segments.push(build_segment(&validity, span, conditions));
    }

    segments.retain(|segment| {
        let keep = segment.end_offset_minutes > segment.start_offset_minutes;
        if !keep {
            trace!("dropping degenerate segment {}", segment.label);
        }
        keep
    });
    // stable, so BASE stays ahead of an FM starting at the same offset
    segments.sort_by_key(|segment| segment.start_offset_minutes);

    TafTimeline {
        validity: Some(validity),
        segments,
        total_offset_minutes: total,
        validity_label: validity.label(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TafReport {
    pub station: Option<String>,
    pub issued_at: Option<ReportTime>,
    pub amended: bool,
    pub timeline: TafTimeline,
    pub raw: String,
}

pub fn decode_taf(raw: &str) -> TafReport {
    let tokens = tokenize(raw);
    // header tokens end at the validity window
    let header_end = tokens
        .iter()
        .position(|token| ValidityWindow::parse(token).is_some())
        .unwrap_or(tokens.len());
    let header = &tokens[..header_end];

    TafReport {
        station: station_of(header),
        issued_at: report_time_of(header),
        amended: header.contains(&"AMD"),
        timeline: segment_taf(raw),
        raw: raw.to_string(),
    }
}

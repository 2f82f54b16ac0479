use skybrief_core::{ForecastSegment, MetarReport, TafReport};

use crate::{OutputFormat, StationBriefing};

pub fn render(briefings: &[StationBriefing], format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(briefings),
        OutputFormat::Text => Ok(briefings
            .iter()
            .map(render_text)
            .collect::<Vec<_>>()
            .join("\n\n")),
    }
}

pub fn render_text(station: &StationBriefing) -> String {
    let briefing = &station.briefing;
    let mut lines = vec![format!("{}  risk {}", briefing.station, briefing.risk.level)];

    match &briefing.metar {
        Some(metar) => metar_lines(metar, &mut lines),
        None => lines.push("  Observed: not available".to_string()),
    }
    match &briefing.taf {
        Some(taf) => taf_lines(taf, &mut lines),
        None => lines.push("  Forecast: not available".to_string()),
    }

    if !briefing.risk.reasons.is_empty() {
        lines.push("  Reasons".to_string());
        lines.extend(briefing.risk.reasons.iter().map(|r| format!("    - {}", r)));
    }
    if !station.notices.is_empty() {
        lines.push("  Notices".to_string());
        lines.extend(station.notices.iter().map(|n| format!("    - {}", n)));
    }
    lines.join("\n")
}

fn metar_lines(metar: &MetarReport, lines: &mut Vec<String>) {
    let observed_at = metar
        .observed_at
        .map(|t| t.to_string())
        .unwrap_or_else(|| "--".to_string());
    lines.push(format!("  Observed {}  {}", observed_at, metar.category));
    if let Some(wind) = &metar.wind {
        lines.push(format!("    Wind {}", wind.display));
    }
    if let Some(visibility) = metar.visibility_meters {
        lines.push(format!("    Visibility {} m", visibility));
    }
    match metar.ceiling_feet {
        Some(ceiling) => lines.push(format!("    Ceiling {} ft", ceiling)),
        None => lines.push("    Ceiling none".to_string()),
    }
    if let Some(altimeter) = metar.altimeter_hpa {
        lines.push(format!("    Altimeter {} hPa", altimeter));
    }
    if let Some(temperature) = metar.temperature {
        match temperature.dewpoint_celsius {
            Some(dewpoint) => lines.push(format!(
                "    Temperature {}°C / dewpoint {}°C",
                temperature.air_celsius, dewpoint
            )),
            None => lines.push(format!("    Temperature {}°C", temperature.air_celsius)),
        }
    }
}

fn taf_lines(taf: &TafReport, lines: &mut Vec<String>) {
    let timeline = &taf.timeline;
    if !timeline.is_available() {
        lines.push("  Forecast: timeline unavailable".to_string());
        return;
    }
    let amended = if taf.amended { " (amended)" } else { "" };
    lines.push(format!("  Forecast {}{}", timeline.validity_label, amended));
    lines.extend(timeline.segments.iter().map(segment_line));
}

fn segment_line(segment: &ForecastSegment) -> String {
    let duration = segment.duration_minutes();
    let mut line = format!(
        "    {}  {}  {}h{:02}m",
        segment.label,
        segment.category,
        duration / 60,
        duration % 60
    );
    if let Some(visibility) = segment.visibility_meters {
        line.push_str(&format!("  vis {} m", visibility));
    }
    if let Some(ceiling) = segment.ceiling_feet {
        line.push_str(&format!("  ceiling {} ft", ceiling));
    }
    line
}

use crate::helpers::{canned_fetcher, spawn_service, KJFK_METAR, KJFK_TAF};
use briefer::{render, render_text, OutputFormat};
use serde_json::Value;

#[tokio::test]
async fn renders_text_briefing() {
    let service = spawn_service(canned_fetcher(Some(KJFK_METAR), Some(KJFK_TAF)));
    let result = service.brief_station("KJFK").await;

    let text = render_text(&result);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "KJFK  risk AMBER");
    assert_eq!(lines[1], "  Observed 01/1651Z  MVFR");
    assert!(text.contains("    Wind 270° at 15kt gusting 25kt"));
    assert!(text.contains("    Ceiling 2500 ft"));
    assert!(text.contains("    Altimeter 1016 hPa"));
    assert!(text.contains("  Forecast Valid 01/12Z to 02/18Z"));
    assert!(text.contains("    BASE 01/1200Z-01/2000Z  VFR  8h00m"));
    assert!(text.contains("    TEMPO 01/2200Z-02/0200Z  MVFR  4h00m"));
    assert!(text.contains("    - Ceiling 2500ft below 3000ft"));
    assert!(!text.contains("Notices"));
}

#[tokio::test]
async fn renders_missing_reports_and_notices() {
    let service = spawn_service(canned_fetcher(None, None));
    let result = service.brief_station("ZZZZ").await;

    let text = render_text(&result);
    assert!(text.contains("  Observed: not available"));
    assert!(text.contains("  Forecast: not available"));
    assert!(text.contains("  Notices\n    - No reports found for ZZZZ; check the identifier"));
}

#[tokio::test]
async fn renders_json_array() {
    let service = spawn_service(canned_fetcher(Some(KJFK_METAR), Some(KJFK_TAF)));
    let results = vec![service.brief_station("KJFK").await];

    let output = render(&results, OutputFormat::Json).unwrap();
    let value: Value = serde_json::from_str(&output).unwrap();
    let first = &value[0];
    assert_eq!(first["station"], "KJFK");
    assert_eq!(first["risk"]["level"], "AMBER");
    assert_eq!(first["metar"]["ceiling_feet"], 2500);
    assert!(first["notices"].as_array().unwrap().is_empty());
    assert!(first["generated_at"].as_str().is_some());
}

use crate::helpers::{canned_fetcher, spawn_service, MockFetcher, KJFK_METAR, KJFK_TAF};
use async_trait::async_trait;
use briefer::{FetchError, ReportFetcher, ReportKind};
use skybrief_core::{FlightCategory, RiskLevel, SegmentKind};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn can_brief_station_from_both_reports() {
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch()
        .times(2)
        .returning(|kind, station| {
            assert_eq!(station, "KJFK");
            Ok(match kind {
                ReportKind::Metar => KJFK_METAR.to_string(),
                ReportKind::Taf => KJFK_TAF.to_string(),
            })
        });
    let service = spawn_service(fetcher);

    let result = service.brief_station("kjfk").await;
    let briefing = &result.briefing;
    assert_eq!(briefing.station, "KJFK");
    assert!(result.notices.is_empty());

    let metar = briefing.metar.as_ref().unwrap();
    assert_eq!(metar.ceiling_feet, Some(2500));
    assert_eq!(metar.category, FlightCategory::Mvfr);

    let timeline = &briefing.taf.as_ref().unwrap().timeline;
    let kinds: Vec<SegmentKind> = timeline.segments.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![SegmentKind::Base, SegmentKind::Fm, SegmentKind::Tempo]
    );
    assert_eq!(timeline.segments[0].end_offset_minutes, 480);

    assert_eq!(briefing.risk.level, RiskLevel::Amber);
    assert_eq!(briefing.risk.ceiling_feet, Some(2500));
}

#[tokio::test]
async fn metar_failure_becomes_notice() {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().returning(|kind, _| match kind {
        ReportKind::Metar => Err(FetchError::Status(503)),
        ReportKind::Taf => Ok(KJFK_TAF.to_string()),
    });
    let service = spawn_service(fetcher);

    let result = service.brief_station("KJFK").await;
    assert!(result.briefing.metar.is_none());
    assert!(result.briefing.taf.is_some());
    assert_eq!(
        result.notices,
        vec!["METAR feed returned HTTP 503 for KJFK".to_string()]
    );
    assert_eq!(result.briefing.risk.level, RiskLevel::Green);
}

#[tokio::test]
async fn unknown_station_gets_single_notice() {
    let service = spawn_service(canned_fetcher(None, None));

    let result = service.brief_station("ZZZZ").await;
    assert!(result.briefing.metar.is_none());
    assert!(result.briefing.taf.is_none());
    assert_eq!(
        result.notices,
        vec!["No reports found for ZZZZ; check the identifier".to_string()]
    );
}

#[tokio::test]
async fn missing_taf_is_noticed() {
    let service = spawn_service(canned_fetcher(Some(KJFK_METAR), None));

    let result = service.brief_station("KJFK").await;
    assert!(result.briefing.metar.is_some());
    assert_eq!(result.notices, vec!["No TAF published for KJFK".to_string()]);
}

#[tokio::test]
async fn taf_without_validity_is_noticed() {
    let service = spawn_service(canned_fetcher(
        Some(KJFK_METAR),
        Some("TAF KJFK 011130Z 27012KT P6SM BKN040"),
    ));

    let result = service.brief_station("KJFK").await;
    let taf = result.briefing.taf.as_ref().unwrap();
    assert!(!taf.timeline.is_available());
    assert!(taf.timeline.segments.is_empty());
    assert_eq!(
        result.notices,
        vec!["TAF for KJFK has no validity window; timeline unavailable".to_string()]
    );
}

struct SlowFetcher;

#[async_trait]
impl ReportFetcher for SlowFetcher {
    async fn fetch(&self, kind: ReportKind, _station: &str) -> Result<String, FetchError> {
        match kind {
            ReportKind::Metar => Ok(KJFK_METAR.to_string()),
            ReportKind::Taf => {
                sleep(Duration::from_secs(30)).await;
                Ok(KJFK_TAF.to_string())
            }
        }
    }
}

#[tokio::test]
async fn slow_report_times_out() {
    let service = spawn_service(SlowFetcher);

    let result = service.brief_station("KJFK").await;
    assert!(result.briefing.metar.is_some());
    assert!(result.briefing.taf.is_none());
    assert_eq!(
        result.notices,
        vec!["TAF request for KJFK timed out".to_string()]
    );
}

#[tokio::test]
async fn brief_all_keeps_station_order() {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().returning(|kind, station| match (kind, station) {
        (ReportKind::Metar, "KSFO") => {
            Ok("KSFO 011556Z 00000KT 1/4SM FG VV001 12/12 A3001".to_string())
        }
        (ReportKind::Metar, "KJFK") => Ok(KJFK_METAR.to_string()),
        _ => Err(FetchError::NotFound),
    });
    let service = spawn_service(fetcher);

    let stations = vec!["KSFO".to_string(), "KJFK".to_string(), "ZZZZ".to_string()];
    let results = service.brief_all(&stations).await;
    let order: Vec<&str> = results.iter().map(|r| r.briefing.station.as_str()).collect();
    assert_eq!(order, vec!["KSFO", "KJFK", "ZZZZ"]);
    assert_eq!(results[0].briefing.risk.level, RiskLevel::Red);
    assert_eq!(results[1].briefing.risk.level, RiskLevel::Amber);
    assert_eq!(results[2].notices.len(), 1);
}

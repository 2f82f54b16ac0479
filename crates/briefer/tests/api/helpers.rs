use async_trait::async_trait;
use briefer::{BriefingService, FetchError, ReportFetcher, ReportKind};
use mockall::mock;
use skybrief_core::RiskPolicy;
use slog::{o, Discard, Logger};
use std::{sync::Arc, time::Duration};

mock! {
    pub Fetcher {}
    #[async_trait]
    impl ReportFetcher for Fetcher {
        async fn fetch(&self, kind: ReportKind, station: &str) -> Result<String, FetchError>;
    }
}

pub const KJFK_METAR: &str =
    "METAR KJFK 011651Z 27015G25KT 10SM FEW015 BKN025 OVC040 24/12 A3002 RMK AO2";
pub const KJFK_TAF: &str = "TAF KJFK 011130Z 0112/0218 27012KT P6SM BKN040 \
     FM012000 28015G25KT P6SM SCT050 \
     TEMPO 0122/0202 3SM SHRA BKN020";

pub fn test_logger() -> Logger {
    Logger::root(Discard, o!())
}

pub fn spawn_service(fetcher: impl ReportFetcher + 'static) -> BriefingService {
    BriefingService::new(
        test_logger(),
        Arc::new(fetcher),
        Duration::from_secs(2),
        RiskPolicy::default(),
    )
}

/// Answers with fixed report text, or NotFound when none is set
pub fn canned_fetcher(metar: Option<&'static str>, taf: Option<&'static str>) -> MockFetcher {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().returning(move |kind, _| {
        let text = match kind {
            ReportKind::Metar => metar,
            ReportKind::Taf => taf,
        };
        text.map(str::to_string).ok_or(FetchError::NotFound)
    });
    fetcher
}

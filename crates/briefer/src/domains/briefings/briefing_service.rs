use futures::future::join_all;
use serde::Serialize;
use skybrief_core::{brief, Briefing, RiskPolicy};
use slog::{debug, info, warn, Logger};
use std::{sync::Arc, time::Duration};
use time::OffsetDateTime;
use tokio::time::timeout;

use crate::{FetchError, ReportFetcher, ReportKind};

/// A decoded briefing plus anything the reader should know about how it was
/// assembled.
#[derive(Debug, Clone, Serialize)]
pub struct StationBriefing {
    #[serde(flatten)]
    pub briefing: Briefing,
    pub notices: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

pub struct BriefingService {
    pub logger: Logger,
    pub fetcher: Arc<dyn ReportFetcher>,
    pub request_timeout: Duration,
    pub policy: RiskPolicy,
}

impl BriefingService {
    pub fn new(
        logger: Logger,
        fetcher: Arc<dyn ReportFetcher>,
        request_timeout: Duration,
        policy: RiskPolicy,
    ) -> Self {
        BriefingService {
            logger,
            fetcher,
            request_timeout,
            policy,
        }
    }

    async fn fetch_report(&self, kind: ReportKind, station: &str) -> Result<String, FetchError> {
        match timeout(self.request_timeout, self.fetcher.fetch(kind, station)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }

    /// Fetch METAR and TAF concurrently and brief whatever came back. Fetch
    /// failures become notices, never errors.
    pub async fn brief_station(&self, station: &str) -> StationBriefing {
        let station = station.trim().to_uppercase();
        info!(self.logger, "briefing {}", station);

        let (metar, taf) = tokio::join!(
            self.fetch_report(ReportKind::Metar, &station),
            self.fetch_report(ReportKind::Taf, &station)
        );

        let mut notices = vec![];
        if matches!(
            (&metar, &taf),
            (Err(FetchError::NotFound), Err(FetchError::NotFound))
        ) {
            warn!(self.logger, "no reports published for {}", station);
            notices.push(format!(
                "No reports found for {}; check the identifier",
                station
            ));
        } else {
            for (kind, result) in [(ReportKind::Metar, &metar), (ReportKind::Taf, &taf)] {
                if let Err(e) = result {
                    warn!(self.logger, "{} fetch for {} failed: {}", kind, station, e);
                    notices.push(notice_for(kind, &station, e));
                }
            }
        }

        let metar_raw = metar.unwrap_or_default();
        let taf_raw = taf.unwrap_or_default();
        let briefing = brief(&station, &metar_raw, &taf_raw, &self.policy);

        if let Some(taf) = &briefing.taf {
            if !taf.timeline.is_available() {
                notices.push(format!(
                    "TAF for {} has no validity window; timeline unavailable",
                    station
                ));
            }
        }
        debug!(
            self.logger,
            "{}: risk {} with {} reason(s)",
            station,
            briefing.risk.level,
            briefing.risk.reasons.len()
        );

        StationBriefing {
            briefing,
            notices,
            generated_at: OffsetDateTime::now_utc(),
        }
    }

    /// Brief every station concurrently, keeping the order they were given in
    pub async fn brief_all(&self, stations: &[String]) -> Vec<StationBriefing> {
        join_all(stations.iter().map(|station| self.brief_station(station))).await
    }
}

pub fn notice_for(kind: ReportKind, station: &str, error: &FetchError) -> String {
    match error {
        FetchError::NotFound => format!("No {} published for {}", kind, station),
        FetchError::Timeout => format!("{} request for {} timed out", kind, station),
        FetchError::RateLimited => format!("{} request for {} was rate limited", kind, station),
        FetchError::Status(code) => {
            format!("{} feed returned HTTP {} for {}", kind, code, station)
        }
        FetchError::Transport(msg) => format!("{} fetch for {} failed: {}", kind, station, msg),
    }
}

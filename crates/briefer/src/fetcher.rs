use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use slog::{debug, Logger};
use std::{fmt, sync::Arc, time::Duration};
use tokio::sync::Mutex;

use crate::RateLimiter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Metar,
    Taf,
}

impl ReportKind {
    fn path(&self) -> &'static str {
        match self {
            ReportKind::Metar => "metar",
            ReportKind::Taf => "taf",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Metar => f.write_str("METAR"),
            ReportKind::Taf => f.write_str("TAF"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("no report published")]
    NotFound,
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("rate limit exceeded after retries")]
    RateLimited,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for FetchError {
    fn from(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => FetchError::Transport(e.to_string()),
        }
    }
}

/// Source of raw report text for a station
#[async_trait]
pub trait ReportFetcher: Send + Sync {
    async fn fetch(&self, kind: ReportKind, station: &str) -> Result<String, FetchError>;
}

/// Raw-text client for the aviationweather.gov data API
pub struct AviationWeatherFetcher {
    logger: Logger,
    base_url: String,
    client: ClientWithMiddleware,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl AviationWeatherFetcher {
    pub fn new(
        logger: Logger,
        base_url: String,
        user_agent: String,
        request_timeout: Duration,
        rate_limiter: Arc<Mutex<RateLimiter>>,
    ) -> Result<Self, anyhow::Error> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(
            Client::builder()
                .user_agent(user_agent)
                .timeout(request_timeout)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self {
            logger,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            rate_limiter,
        })
    }

    pub fn report_url(&self, kind: ReportKind, station: &str) -> String {
        format!(
            "{}/{}?ids={}&format=raw",
            self.base_url,
            kind.path(),
            station
        )
    }
}

#[async_trait]
impl ReportFetcher for AviationWeatherFetcher {
    async fn fetch(&self, kind: ReportKind, station: &str) -> Result<String, FetchError> {
        {
            let mut limiter = self.rate_limiter.lock().await;
            if !limiter.acquire(1.0).await {
                return Err(FetchError::RateLimited);
            }
        }

        let url = self.report_url(kind, station);
        debug!(self.logger, "requesting: {}", url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(FetchError::NotFound);
        }
        debug!(self.logger, "received {} for {}: {} bytes", kind, station, text.len());
        Ok(text.to_string())
    }
}

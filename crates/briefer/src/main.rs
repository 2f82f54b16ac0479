use anyhow::anyhow;
use briefer::{
    get_config_info, render, setup_logger, AviationWeatherFetcher, BriefingService, Cli,
    RateLimiter, RiskTracker,
};
use slog::{error, info, Logger};
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, time::interval};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = get_config_info();
    let logger = setup_logger(&cli);

    let stations = cli.stations();
    if stations.is_empty() {
        return Err(anyhow!(
            "no stations given; pass ICAO identifiers or set `stations` in briefer.toml"
        ));
    }

    info!(logger, "SkyBrief briefer starting...");
    info!(logger, "  Feed URL: {}", cli.feed_url());
    info!(logger, "  Stations: {}", stations.join(", "));
    info!(logger, "  Request timeout: {:?}", cli.request_timeout());

    let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(
        cli.token_capacity(),
        cli.refill_rate(),
    )));
    let fetcher = Arc::new(AviationWeatherFetcher::new(
        logger.clone(),
        cli.feed_url(),
        cli.user_agent(),
        cli.request_timeout(),
        rate_limiter,
    )?);
    let service = BriefingService::new(
        logger.clone(),
        fetcher,
        cli.request_timeout(),
        cli.risk_policy(),
    );

    match cli.watch {
        Some(seconds) => watch(&cli, &logger, &service, &stations, seconds).await,
        None => {
            let briefings = service.brief_all(&stations).await;
            println!("{}", render(&briefings, cli.format())?);
            Ok(())
        }
    }
}

async fn watch(
    cli: &Cli,
    logger: &Logger,
    service: &BriefingService,
    stations: &[String],
    seconds: u64,
) -> Result<(), anyhow::Error> {
    info!(logger, "Watching, re-briefing every {} seconds", seconds);
    let mut tracker = RiskTracker::new();
    let mut check_interval = interval(Duration::from_secs(seconds.max(1)));

    loop {
        tokio::select! {
            _ = check_interval.tick() => {
                let briefings = service.brief_all(stations).await;
                tracker.record(logger, &briefings);
                match render(&briefings, cli.format()) {
                    Ok(output) => println!("{}", output),
                    Err(err) => error!(logger, "Error rendering briefings: {}", err),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!(logger, "Shutting down");
                return Ok(());
            }
        }
    }
}

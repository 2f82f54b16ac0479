use clap::{Parser, ValueEnum};
use skybrief_core::{
    find_config_file, load_config_or_default, ApproachKind, ConfigSource, OperatingLimits,
    RiskPolicy, RunwayContext, RunwaySurface, DEFAULT_FEED_URL, DEFAULT_REQUEST_TIMEOUT,
};
use slog::{o, Drain, Level, Logger};
use std::{
    env,
    time::{Duration, Instant},
};
use tokio::time::sleep;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "SkyBrief - METAR/TAF briefings with forecast timeline and risk screen"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $SKYBRIEF_CONFIG, ./briefer.toml,
    /// $XDG_CONFIG_HOME/skybrief/briefer.toml, /etc/skybrief/briefer.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// ICAO station identifiers to brief, e.g. KJFK EGLL
    #[arg(value_name = "STATION")]
    #[serde(default)]
    pub stations: Vec<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "SKYBRIEF_LEVEL")]
    pub level: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, env = "SKYBRIEF_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Re-brief every N seconds instead of exiting after one run
    #[arg(short, long, env = "SKYBRIEF_WATCH")]
    pub watch: Option<u64>,

    /// Base URL of the raw METAR/TAF feed
    #[arg(short = 'u', long, env = "SKYBRIEF_FEED_URL")]
    pub feed_url: Option<String>,

    /// Per-report fetch timeout in seconds
    #[arg(short, long, env = "SKYBRIEF_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Rate limiter refill rate in tokens per second
    #[arg(long, env = "SKYBRIEF_REFILL_RATE")]
    pub refill_rate: Option<f64>,

    /// Rate limiter token capacity
    #[arg(long, env = "SKYBRIEF_TOKEN_CAPACITY")]
    pub token_capacity: Option<usize>,

    /// HTTP User-Agent header for feed requests
    #[arg(long, env = "SKYBRIEF_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Runway magnetic heading in degrees, enables wind limit checks
    #[arg(short, long, env = "SKYBRIEF_RUNWAY")]
    pub runway: Option<u16>,

    /// Runway surface: dry, wet, contaminated
    #[arg(long, env = "SKYBRIEF_SURFACE")]
    pub surface: Option<RunwaySurface>,

    /// Approach kind: visual, instrument
    #[arg(long, env = "SKYBRIEF_APPROACH")]
    pub approach: Option<ApproachKind>,

    /// Crosswind/tailwind limits table, config file only
    #[arg(skip)]
    pub limits: Option<OperatingLimits>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn stations(&self) -> Vec<String> {
        self.stations
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    pub fn feed_url(&self) -> String {
        self.feed_url
            .clone()
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate.unwrap_or(1.0)
    }

    pub fn token_capacity(&self) -> usize {
        self.token_capacity.unwrap_or(10)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("skybrief-briefer/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn risk_policy(&self) -> RiskPolicy {
        RiskPolicy {
            runway: self.runway.map(|heading_degrees| RunwayContext {
                heading_degrees,
                surface: self.surface.unwrap_or_default(),
                approach: self.approach.unwrap_or_default(),
            }),
            limits: self.limits.clone().unwrap_or_default(),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("SKYBRIEF_CONFIG", "briefer.toml")
    };

    let file_config: Cli = load_config_or_default(&source);
    merge_config(cli_args, file_config)
}

/// CLI args override file config (env vars are handled by clap)
pub fn merge_config(cli_args: Cli, file_config: Cli) -> Cli {
    Cli {
        config: cli_args.config,
        stations: if cli_args.stations.is_empty() {
            file_config.stations
        } else {
            cli_args.stations
        },
        level: cli_args.level.or(file_config.level),
        format: cli_args.format.or(file_config.format),
        watch: cli_args.watch.or(file_config.watch),
        feed_url: cli_args.feed_url.or(file_config.feed_url),
        timeout: cli_args.timeout.or(file_config.timeout),
        refill_rate: cli_args.refill_rate.or(file_config.refill_rate),
        token_capacity: cli_args.token_capacity.or(file_config.token_capacity),
        user_agent: cli_args.user_agent.or(file_config.user_agent),
        runway: cli_args.runway.or(file_config.runway),
        surface: cli_args.surface.or(file_config.surface),
        approach: cli_args.approach.or(file_config.approach),
        limits: file_config.limits,
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// Token bucket shared by every request to the feed
pub struct RateLimiter {
    capacity: usize,
    tokens: f64,
    last_refill: Instant,
    refill_rate: f64,
    max_retries: usize,
}

impl RateLimiter {
    pub fn new(capacity: usize, refill_rate: f64) -> Self {
        RateLimiter {
            capacity,
            tokens: capacity as f64,
            last_refill: Instant::now(),
            // a bucket with an unusable rate never refills
            refill_rate: if refill_rate.is_finite() && refill_rate > 0.0 {
                refill_rate
            } else {
                0.0
            },
            max_retries: 3,
        }
    }

    fn refill_tokens(&mut self) {
        let now = Instant::now();
        let elapsed_time = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed_time * self.refill_rate).min(self.capacity as f64);
        self.last_refill = now;
    }

    pub fn available(&mut self) -> f64 {
        self.refill_tokens();
        self.tokens
    }

    /// Take `tokens`, waiting for the bucket to refill up to `max_retries`
    /// times. Returns false if they never became available.
    pub async fn acquire(&mut self, tokens: f64) -> bool {
        let mut retries = 0;

        loop {
            self.refill_tokens();

            if tokens <= self.tokens {
                self.tokens -= tokens;
                return true;
            }
            if retries >= self.max_retries || self.refill_rate <= 0.0 {
                return false;
            }
            retries += 1;
            let deficit = tokens - self.tokens;
            let Ok(wait) = Duration::try_from_secs_f64(deficit / self.refill_rate) else {
                return false;
            };
            sleep(wait).await;
        }
    }
}

use clap::{Parser, ValueEnum};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::models::ScanParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Poll the REST ticker endpoint once per cycle.
    Rest,
    /// Collect the all-market ticker stream for a short window per cycle.
    Stream,
}

/// Triangular arbitrage scanner over a live ticker snapshot.
#[derive(Debug, Clone, Parser)]
#[command(name = "triangular_scan", version)]
pub struct Settings {
    /// Quote (settlement) currencies, comma separated
    #[arg(long, env = "SCAN_QUOTES", value_delimiter = ',', default_values_t = default_quotes())]
    pub quotes: Vec<String>,

    /// Assets combined into triangles, comma separated
    #[arg(long, env = "SCAN_TARGETS", value_delimiter = ',', default_values_t = default_targets())]
    pub targets: Vec<String>,

    /// Trading fee per leg as a fraction (0.001 = 0.1%)
    #[arg(long, env = "SCAN_FEE", default_value_t = 0.001)]
    pub fee: f64,

    /// Minimum net profit in percent to report
    #[arg(long, env = "SCAN_MIN_PROFIT", default_value_t = 0.05, allow_negative_numbers = true)]
    pub min_profit: f64,

    /// Seconds between scans
    #[arg(long, env = "SCAN_INTERVAL", default_value_t = 2)]
    pub interval: u64,

    /// Seconds before a snapshot fetch is abandoned
    #[arg(long, env = "SCAN_TIMEOUT", default_value_t = 5)]
    pub timeout: u64,

    #[arg(long, value_enum, env = "SCAN_SOURCE", default_value_t = SourceKind::Rest)]
    pub source: SourceKind,

    /// REST API base, `/ticker/price` is appended
    #[arg(long, env = "SCAN_API_URL", default_value = "https://api.binance.com/api/v3")]
    pub api_url: Url,

    #[arg(long, env = "SCAN_WS_URL", default_value = "wss://stream.binance.com:9443/ws/!ticker@arr")]
    pub ws_url: Url,

    /// Seconds of stream data gathered into one snapshot
    #[arg(long, env = "SCAN_WINDOW", default_value_t = 3)]
    pub window: u64,

    /// Capital used for the best-opportunity simulation
    #[arg(long, default_value_t = 1000.0)]
    pub capital: f64,

    /// Rows shown in the ranking table
    #[arg(long, default_value_t = 15)]
    pub top: usize,

    /// Run a single scan and exit
    #[arg(long)]
    pub once: bool,

    /// Serve the latest scan over HTTP on this port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
}

fn default_quotes() -> Vec<String> {
    ["USDT", "BTC", "ETH"].iter().map(|s| s.to_string()).collect()
}

fn default_targets() -> Vec<String> {
    [
        "BTC", "ETH", "BNB", "SOL", "XRP", "DOGE", "ADA", "AVAX", "MATIC", "LINK", "LTC",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn normalize(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Settings {
    /// Checks the settings and derives the core scan parameters.
    pub fn scan_params(&self) -> Result<ScanParams, ConfigError> {
        if !(0.0..1.0).contains(&self.fee) {
            return Err(ConfigError::InvalidFee(self.fee));
        }
        if self.min_profit.is_nan() {
            return Err(ConfigError::InvalidMinProfit(self.min_profit));
        }
        if !(self.capital.is_finite() && self.capital > 0.0) {
            return Err(ConfigError::InvalidCapital(self.capital));
        }
        let quote_currencies = normalize(&self.quotes);
        if quote_currencies.is_empty() {
            return Err(ConfigError::NoQuoteCurrencies);
        }
        let target_assets = normalize(&self.targets);
        if target_assets.len() < 2 {
            return Err(ConfigError::TooFewTargets(target_assets.len()));
        }
        if self.interval == 0 {
            return Err(ConfigError::ZeroDuration("interval"));
        }
        if self.timeout == 0 {
            return Err(ConfigError::ZeroDuration("timeout"));
        }
        if self.source == SourceKind::Stream && self.window == 0 {
            return Err(ConfigError::ZeroDuration("window"));
        }

        Ok(ScanParams {
            quote_currencies,
            target_assets,
            fee_rate: self.fee,
            min_profit_pct: self.min_profit,
        })
    }

    /// `{api_url}/ticker/price`
    pub fn ticker_url(&self) -> Result<Url, ConfigError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(&["ticker", "price"]);
        Ok(url)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

use thiserror::Error;

/// Rejected scanner settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("fee rate must be in [0, 1), got {0}")]
    InvalidFee(f64),

    #[error("minimum profit must be a number, got {0}")]
    InvalidMinProfit(f64),

    #[error("capital must be a positive amount, got {0}")]
    InvalidCapital(f64),

    #[error("at least one quote currency is required")]
    NoQuoteCurrencies,

    #[error("at least two target assets are required, got {0}")]
    TooFewTargets(usize),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("invalid url {0}")]
    InvalidUrl(String),
}

/// Failure to produce a complete price snapshot. The cycle is skipped.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ticker endpoint returned {0}")]
    Status(reqwest::StatusCode),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("stream closed after {0} frames, before the collection window ended")]
    Closed(usize),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("snapshot contained no usable prices")]
    Empty,
}

pub mod binance;

use std::time::Duration;
use url::Url;

use crate::error::FetchError;
use crate::snapshot::PriceSnapshot;

/// Where each cycle's snapshot comes from. A fetch either yields a complete
/// snapshot or an error; the caller skips the cycle on error.
#[derive(Debug, Clone)]
pub enum PriceSource {
    Rest { client: reqwest::Client, url: Url },
    Stream { url: Url, window: Duration, timeout: Duration },
}

impl PriceSource {
    pub fn rest(url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(PriceSource::Rest { client, url })
    }

    pub fn stream(url: Url, window: Duration, timeout: Duration) -> Self {
        PriceSource::Stream { url, window, timeout }
    }

    pub async fn fetch(&self) -> Result<PriceSnapshot, FetchError> {
        match self {
            PriceSource::Rest { client, url } => binance::fetch_rest_snapshot(client, url).await,
            PriceSource::Stream { url, window, timeout } => {
                binance::collect_stream_snapshot(url, *window, *timeout).await
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PriceSource::Rest { url, .. } => format!("rest {}", url),
            PriceSource::Stream { url, window, .. } => format!("stream {} ({}s window)", url, window.as_secs()),
        }
    }
}

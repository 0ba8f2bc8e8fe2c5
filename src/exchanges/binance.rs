use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::{timeout, timeout_at, Duration, Instant};
use tokio_tungstenite::connect_async;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::FetchError;
use crate::snapshot::PriceSnapshot;

/// One entry of `GET /api/v3/ticker/price`.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: String,
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|p| p.is_finite() && *p > 0.0)
}

/// Keeps only entries with a positive finite price.
pub fn snapshot_from_tickers(tickers: Vec<TickerPrice>) -> PriceSnapshot {
    let mut snap = PriceSnapshot::new();
    for t in tickers {
        match parse_price(&t.price) {
            Some(price) => snap.insert(t.symbol.to_uppercase(), price),
            None => debug!("binance: dropping {} with price {:?}", t.symbol, t.price),
        }
    }
    snap
}

/// Fetches the full ticker list in one request.
pub async fn fetch_rest_snapshot(client: &reqwest::Client, url: &Url) -> Result<PriceSnapshot, FetchError> {
    let resp = client.get(url.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    let tickers: Vec<TickerPrice> = resp.json().await?;
    let total = tickers.len();
    let snap = snapshot_from_tickers(tickers);
    if snap.is_empty() {
        return Err(FetchError::Empty);
    }
    debug!("binance: {} tickers, {} usable", total, snap.len());
    Ok(snap)
}

fn ticker_entry(item: &Value) -> Option<(&str, f64)> {
    let sym = item.get("s").and_then(|v| v.as_str())?;
    let price = item
        .get("c")
        .and_then(|v| v.as_str().and_then(parse_price))
        .or_else(|| item.get("c").and_then(|v| v.as_f64()).filter(|p| p.is_finite() && *p > 0.0))?;
    Some((sym, price))
}

/// Merges one `!ticker@arr` frame into `snap`. Accepts the bare array,
/// the combined-stream `data` envelope and single ticker objects.
pub fn apply_ticker_frame(txt: &str, snap: &mut PriceSnapshot) -> usize {
    let v: Value = match serde_json::from_str(txt) {
        Ok(v) => v,
        Err(e) => {
            warn!("binance: json parse failed: {:?}", e);
            return 0;
        }
    };
    let items: Vec<&Value> = match &v {
        Value::Array(arr) => arr.iter().collect(),
        Value::Object(obj) => match obj.get("data") {
            Some(Value::Array(arr)) => arr.iter().collect(),
            Some(data) => vec![data],
            None => vec![&v],
        },
        _ => Vec::new(),
    };

    let mut applied = 0;
    for item in items {
        if let Some((sym, price)) = ticker_entry(item) {
            snap.insert(sym.to_uppercase(), price);
            applied += 1;
        }
    }
    applied
}

/// Listens to the all-market ticker stream for `window` and returns what was
/// seen. Nothing is handed out until the window closes; a stream that ends
/// early is an error, never a partial snapshot.
pub async fn collect_stream_snapshot(
    url: &Url,
    window: Duration,
    connect_timeout: Duration,
) -> Result<PriceSnapshot, FetchError> {
    info!("binance: connecting to {}", url);
    let (mut ws, _) = timeout(connect_timeout, connect_async(url.as_str()))
        .await
        .map_err(|_| FetchError::Timeout(connect_timeout.as_secs()))??;

    let mut snap = PriceSnapshot::new();
    let deadline = Instant::now() + window;
    let mut frames = 0usize;

    loop {
        let msg = match timeout_at(deadline, ws.next()).await {
            Ok(Some(msg)) => msg?,
            Ok(None) => {
                warn!("binance: stream closed after {} frames", frames);
                return Err(FetchError::Closed(frames));
            }
            Err(_) => break,
        };
        if msg.is_close() {
            warn!("binance: server closed stream after {} frames", frames);
            return Err(FetchError::Closed(frames));
        }
        if msg.is_text() {
            let txt = msg.into_text()?;
            apply_ticker_frame(&txt, &mut snap);
            frames += 1;
        }
    }

    if let Err(e) = ws.close(None).await {
        debug!("binance: close failed: {:?}", e);
    }

    info!("binance: collected {} pairs from {} frames", snap.len(), frames);
    if snap.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(snap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::SinkExt;
    use tokio_tungstenite::{accept_async, tungstenite::Message};

    /// Local ticker stream: sends `frames`, then either closes or stays open
    /// until the client hangs up.
    async fn ticker_server(frames: Vec<&'static str>, close_early: bool) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            for f in frames {
                ws.send(Message::Text(f.to_string())).await.unwrap();
            }
            if close_early {
                let _ = ws.close(None).await;
            } else {
                while let Some(Ok(_)) = ws.next().await {}
            }
        });
        format!("ws://{}/ws/!ticker@arr", addr).parse().unwrap()
    }

    #[test]
    fn rest_tickers_drop_unusable_prices() {
        let body = r#"[
            {"symbol":"BTCUSDT","price":"50000.00000000"},
            {"symbol":"ETHBTC","price":"0.06100000"},
            {"symbol":"DEADUSDT","price":"0.00000000"},
            {"symbol":"BADUSDT","price":"n/a"}
        ]"#;
        let tickers: Vec<TickerPrice> = serde_json::from_str(body).unwrap();
        let snap = snapshot_from_tickers(tickers);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.listed("BTCUSDT"), Some(50_000.0));
        assert_eq!(snap.listed("ETHBTC"), Some(0.061));
        assert_eq!(snap.listed("DEADUSDT"), None);
    }

    #[test]
    fn stream_frames_in_all_shapes() {
        let mut snap = PriceSnapshot::new();
        assert_eq!(
            apply_ticker_frame(r#"[{"s":"BTCUSDT","c":"50000.1"},{"s":"ETHUSDT","c":"3000"}]"#, &mut snap),
            2
        );
        assert_eq!(
            apply_ticker_frame(r#"{"stream":"!ticker@arr","data":[{"s":"ETHBTC","c":"0.061"}]}"#, &mut snap),
            1
        );
        assert_eq!(apply_ticker_frame(r#"{"s":"BNBUSDT","c":600.5}"#, &mut snap), 1);
        assert_eq!(snap.len(), 4);
        assert_eq!(snap.listed("BNBUSDT"), Some(600.5));
    }

    #[test]
    fn later_frames_overwrite_and_junk_is_ignored() {
        let mut snap = PriceSnapshot::new();
        apply_ticker_frame(r#"[{"s":"BTCUSDT","c":"50000"}]"#, &mut snap);
        apply_ticker_frame(r#"[{"s":"BTCUSDT","c":"50100"},{"s":"XUSDT","c":"0"}]"#, &mut snap);
        assert_eq!(apply_ticker_frame("not json", &mut snap), 0);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.listed("BTCUSDT"), Some(50_100.0));
    }

    #[tokio::test]
    async fn stream_snapshot_collects_for_the_whole_window() {
        let url = ticker_server(
            vec![
                r#"[{"s":"BTCUSDT","c":"50000"},{"s":"ETHUSDT","c":"3000"}]"#,
                r#"[{"s":"ETHBTC","c":"0.061"}]"#,
            ],
            false,
        )
        .await;
        let window = Duration::from_millis(300);
        let started = Instant::now();
        let snap = collect_stream_snapshot(&url, window, Duration::from_secs(2)).await.unwrap();
        assert!(started.elapsed() >= window);
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.listed("ETHBTC"), Some(0.061));
    }

    #[tokio::test]
    async fn stream_closed_before_window_ends_is_an_error() {
        let url = ticker_server(vec![r#"[{"s":"BTCUSDT","c":"50000"}]"#], true).await;
        let res = collect_stream_snapshot(&url, Duration::from_secs(5), Duration::from_secs(2)).await;
        assert!(matches!(res, Err(FetchError::Closed(1))), "{:?}", res);
    }

    #[tokio::test]
    async fn quiet_stream_yields_empty_error() {
        let url = ticker_server(vec![], false).await;
        let res = collect_stream_snapshot(&url, Duration::from_millis(200), Duration::from_secs(2)).await;
        assert!(matches!(res, Err(FetchError::Empty)), "{:?}", res);
    }
}

use serde::Serialize;
use std::collections::HashMap;

/// Where a resolved price came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    /// Symbol actually listed, e.g. `"BTCETH"` when ETH/BTC was asked for.
    pub symbol: String,
    pub listed_price: f64,
    /// Price of base in quote, `1 / listed_price` when inverted.
    pub price: f64,
    pub inverted: bool,
}

/// Point-in-time symbol -> price map, e.g. `"BTCUSDT" -> 50000.0`.
///
/// The fetch layer only inserts positive finite prices, but lookups still
/// treat anything else as missing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceSnapshot {
    prices: HashMap<String, f64>,
}

impl PriceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, price: f64) {
        self.prices.insert(symbol.into(), price);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Raw listed price, usable or not.
    pub fn listed(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    /// Price of one `base` in `quote`.
    ///
    /// Tries the `BASEQUOTE` listing first, then the reciprocal of
    /// `QUOTEBASE`. Zero, negative and non-finite listings count as absent.
    pub fn resolve_price(&self, base: &str, quote: &str) -> Option<f64> {
        self.resolve_listing(base, quote).map(|l| l.price)
    }

    /// Same lookup as [`resolve_price`](Self::resolve_price), keeping the
    /// source symbol and its listed price.
    pub fn resolve_listing(&self, base: &str, quote: &str) -> Option<Listing> {
        let direct = format!("{}{}", base, quote);
        if let Some(p) = self.usable(&direct) {
            return Some(Listing { symbol: direct, listed_price: p, price: p, inverted: false });
        }
        let inverse = format!("{}{}", quote, base);
        let listed_price = self.usable(&inverse)?;
        let price = 1.0 / listed_price;
        if !price.is_finite() || price <= 0.0 {
            return None;
        }
        Some(Listing { symbol: inverse, listed_price, price, inverted: true })
    }

    fn usable(&self, symbol: &str) -> Option<f64> {
        self.prices
            .get(symbol)
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for PriceSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut snap = PriceSnapshot::new();
        for (sym, price) in iter {
            snap.insert(sym, price);
        }
        snap
    }
}

/// Free-function form of [`PriceSnapshot::resolve_price`].
pub fn resolve_price(base: &str, quote: &str, snapshot: &PriceSnapshot) -> Option<f64> {
    snapshot.resolve_price(base, quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn direct_listing_is_returned_as_is() {
        let snap: PriceSnapshot = [("BTCUSDT", 50_000.0)].into_iter().collect();
        assert_eq!(resolve_price("BTC", "USDT", &snap), Some(50_000.0));
    }

    #[test]
    fn inverse_listing_falls_back_to_reciprocal() {
        for p in [0.061, 1.0, 3000.0, 104_000.0, 2.3e-5] {
            let snap: PriceSnapshot = [("USDTBTC", p)].into_iter().collect();
            let got = snap.resolve_price("BTC", "USDT").unwrap();
            assert!(close(got, 1.0 / p), "{} vs {}", got, 1.0 / p);
        }
    }

    #[test]
    fn direct_listing_wins_over_inverse() {
        let snap: PriceSnapshot = [("ETHBTC", 0.06), ("BTCETH", 20.0)].into_iter().collect();
        assert_eq!(snap.resolve_price("ETH", "BTC"), Some(0.06));
    }

    #[test]
    fn missing_pair_is_unknown() {
        let snap: PriceSnapshot = [("ETHUSDT", 3000.0)].into_iter().collect();
        assert_eq!(snap.resolve_price("BTC", "USDT"), None);
        assert_eq!(PriceSnapshot::new().resolve_price("BTC", "USDT"), None);
    }

    #[test]
    fn zero_prices_are_unknown() {
        let inverse: PriceSnapshot = [("USDTBTC", 0.0)].into_iter().collect();
        assert_eq!(inverse.resolve_price("BTC", "USDT"), None);

        let direct: PriceSnapshot = [("BTCUSDT", 0.0)].into_iter().collect();
        assert_eq!(direct.resolve_price("BTC", "USDT"), None);
    }

    #[test]
    fn unusable_direct_listing_falls_through_to_inverse() {
        let snap: PriceSnapshot = [("BTCUSDT", f64::NAN), ("USDTBTC", 0.5)].into_iter().collect();
        assert_eq!(snap.resolve_price("BTC", "USDT"), Some(2.0));
    }

    #[test]
    fn listing_keeps_source_symbol() {
        let snap: PriceSnapshot = [("BTCUSDT", 50_000.0), ("BTCETH", 16.0)].into_iter().collect();

        let direct = snap.resolve_listing("BTC", "USDT").unwrap();
        assert_eq!(direct.symbol, "BTCUSDT");
        assert!(!direct.inverted);
        assert_eq!(direct.price, direct.listed_price);

        let inverse = snap.resolve_listing("ETH", "BTC").unwrap();
        assert_eq!(inverse.symbol, "BTCETH");
        assert!(inverse.inverted);
        assert_eq!(inverse.listed_price, 16.0);
        assert_eq!(inverse.price, 1.0 / 16.0);
    }

    #[test]
    fn tiny_inverse_that_overflows_is_unknown() {
        let snap: PriceSnapshot = [("USDTBTC", 1e-310)].into_iter().collect();
        assert_eq!(snap.resolve_price("BTC", "USDT"), None);
    }
}

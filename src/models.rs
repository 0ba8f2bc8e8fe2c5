use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quote currency Q plus the two intermediate assets B and C.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub quote: String,
    pub asset_b: String,
    pub asset_c: String,
}

impl Triangle {
    /// Returns `None` unless all three assets are distinct.
    pub fn new(quote: &str, asset_b: &str, asset_c: &str) -> Option<Self> {
        if quote == asset_b || quote == asset_c || asset_b == asset_c {
            return None;
        }
        Some(Self {
            quote: quote.to_string(),
            asset_b: asset_b.to_string(),
            asset_c: asset_c.to_string(),
        })
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.quote, self.asset_b, self.asset_c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Q -> B -> C -> Q, pays off when C/B trades below its fair price.
    Clockwise,
    /// Q -> C -> B -> Q, pays off when C/B trades above its fair price.
    CounterClockwise,
}

impl Direction {
    /// Asset path for this rotation, e.g. `USDT → BTC → ETH → USDT`.
    pub fn path(&self, triangle: &Triangle) -> String {
        let (first, second) = match self {
            Direction::Clockwise => (&triangle.asset_b, &triangle.asset_c),
            Direction::CounterClockwise => (&triangle.asset_c, &triangle.asset_b),
        };
        format!("{q} → {first} → {second} → {q}", q = triangle.quote)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Clockwise => write!(f, "clockwise"),
            Direction::CounterClockwise => write!(f, "counter-clockwise"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Spend the counter asset to acquire `asset`: amount / price.
    Buy,
    /// Give up `asset` for the counter asset: amount * price.
    Sell,
}

/// One conversion of a rotation. `price` is the price of `asset` in `counter`;
/// `symbol` and `listed_price` are the market it trades on as listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeStep {
    pub side: Side,
    pub asset: String,
    pub counter: String,
    pub price: f64,
    pub symbol: String,
    pub listed_price: f64,
    /// Marks the cross-rate leg that captures the mispricing.
    pub arbitrage_leg: bool,
}

impl TradeStep {
    pub fn pair(&self) -> String {
        format!("{}/{}", self.asset, self.counter)
    }

    /// Applies the conversion to `amount`, before fees.
    pub fn convert(&self, amount: f64) -> f64 {
        match self.side {
            Side::Buy => amount / self.price,
            Side::Sell => amount * self.price,
        }
    }

    /// Asset held after this step.
    pub fn receives(&self) -> &str {
        match self.side {
            Side::Buy => &self.asset,
            Side::Sell => &self.counter,
        }
    }
}

impl fmt::Display for TradeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Side::Buy => write!(f, "Buy {} with {}", self.asset, self.counter)?,
            Side::Sell => write!(f, "Sell {} for {}", self.asset, self.counter)?,
        }
        write!(f, " on {} @ {:.8}", self.symbol, self.listed_price)?;
        if self.symbol != format!("{}{}", self.asset, self.counter) {
            write!(f, " (= {:.8} {})", self.price, self.pair())?;
        }
        if self.arbitrage_leg {
            write!(f, " (ARBITRAGE)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub triangle: Triangle,
    pub direction: Direction,
    /// C/B implied by the two quote legs.
    pub fair_price: f64,
    /// C/B as listed.
    pub actual_price: f64,
    pub deviation_pct: f64,
    /// Net round-trip profit after fees, in percent.
    pub profit_pct: f64,
    pub steps: Vec<TradeStep>,
    pub timestamp: DateTime<Utc>,
}

impl Opportunity {
    /// Same opportunity ignoring the capture time.
    pub fn same_as(&self, other: &Opportunity) -> bool {
        self.triangle == other.triangle
            && self.direction == other.direction
            && self.fair_price == other.fair_price
            && self.actual_price == other.actual_price
            && self.deviation_pct == other.deviation_pct
            && self.profit_pct == other.profit_pct
            && self.steps == other.steps
    }
}

/// Result of one scan plus counters separating missing data from missing edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub opportunities: Vec<Opportunity>,
    pub evaluated: usize,
    /// Incomplete or unusable price data, or a degenerate triangle.
    pub skipped: usize,
    /// Priced, but neither rotation beats fees.
    pub unprofitable: usize,
    /// Profitable, but under the configured threshold.
    pub below_threshold: usize,
    pub pairs_in_snapshot: usize,
}

/// Inputs of a scan besides the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanParams {
    pub quote_currencies: Vec<String>,
    pub target_assets: Vec<String>,
    pub fee_rate: f64,
    pub min_profit_pct: f64,
}

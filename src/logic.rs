use crate::models::{Direction, Opportunity, ScanParams, ScanReport, Side, TradeStep, Triangle};
use crate::snapshot::{Listing, PriceSnapshot};
use chrono::Utc;
use tracing::debug;

/// Outcome of evaluating one triangle.
#[derive(Debug, Clone, PartialEq)]
pub enum TriangleOutcome {
    /// Missing or unusable price on some leg, or a degenerate triangle.
    Incomplete,
    /// Both rotations lose money after fees.
    Unprofitable { profit_cw: f64, profit_ccw: f64 },
    Profitable(Opportunity),
}

impl TriangleOutcome {
    pub fn into_opportunity(self) -> Option<Opportunity> {
        match self {
            TriangleOutcome::Profitable(opp) => Some(opp),
            _ => None,
        }
    }
}

/// Percent gained by pushing one unit of the start asset through `legs`,
/// charging `fee_rate` on every conversion.
pub fn rotation_profit(legs: &[TradeStep], fee_rate: f64) -> f64 {
    let fee_mult = 1.0 - fee_rate;
    let end = legs
        .iter()
        .fold(1.0, |amount, leg| leg.convert(amount) * fee_mult);
    (end - 1.0) * 100.0
}

fn leg(side: Side, asset: &str, counter: &str, listing: &Listing, arbitrage_leg: bool) -> TradeStep {
    TradeStep {
        side,
        asset: asset.to_string(),
        counter: counter.to_string(),
        price: listing.price,
        symbol: listing.symbol.clone(),
        listed_price: listing.listed_price,
        arbitrage_leg,
    }
}

/// Legs in execution order for `direction`, given the B/Q, C/Q and C/B listings.
pub fn rotation_legs(
    triangle: &Triangle,
    direction: Direction,
    bq: &Listing,
    cq: &Listing,
    cb: &Listing,
) -> Vec<TradeStep> {
    let Triangle { quote: q, asset_b: b, asset_c: c } = triangle;
    match direction {
        Direction::Clockwise => vec![
            leg(Side::Buy, b, q, bq, false),
            leg(Side::Buy, c, b, cb, true),
            leg(Side::Sell, c, q, cq, false),
        ],
        Direction::CounterClockwise => vec![
            leg(Side::Buy, c, q, cq, false),
            leg(Side::Sell, c, b, cb, true),
            leg(Side::Sell, b, q, bq, false),
        ],
    }
}

/// Full evaluation of (Q, B, C), telling missing data apart from no edge.
pub fn assess_triangle(
    quote: &str,
    asset_b: &str,
    asset_c: &str,
    snapshot: &PriceSnapshot,
    fee_rate: f64,
) -> TriangleOutcome {
    let triangle = match Triangle::new(quote, asset_b, asset_c) {
        Some(t) => t,
        None => return TriangleOutcome::Incomplete,
    };

    let bq = match snapshot.resolve_listing(asset_b, quote) { Some(v) => v, None => return TriangleOutcome::Incomplete };
    let cq = match snapshot.resolve_listing(asset_c, quote) { Some(v) => v, None => return TriangleOutcome::Incomplete };
    let cb = match snapshot.resolve_listing(asset_c, asset_b) { Some(v) => v, None => return TriangleOutcome::Incomplete };
    let (price_bq, price_cq, price_cb) = (bq.price, cq.price, cb.price);

    if price_bq == 0.0 {
        return TriangleOutcome::Incomplete;
    }
    let fair_price = price_cq / price_bq;
    if fair_price == 0.0 || !fair_price.is_finite() {
        return TriangleOutcome::Incomplete;
    }
    let deviation_pct = (price_cb - fair_price) / fair_price * 100.0;

    let cw = rotation_legs(&triangle, Direction::Clockwise, &bq, &cq, &cb);
    let ccw = rotation_legs(&triangle, Direction::CounterClockwise, &bq, &cq, &cb);
    let profit_cw = rotation_profit(&cw, fee_rate);
    let profit_ccw = rotation_profit(&ccw, fee_rate);

    if !deviation_pct.is_finite() || !profit_cw.is_finite() || !profit_ccw.is_finite() {
        return TriangleOutcome::Incomplete;
    }

    let (direction, profit_pct, steps) = if profit_cw > profit_ccw && profit_cw > 0.0 {
        (Direction::Clockwise, profit_cw, cw)
    } else if profit_ccw > 0.0 {
        (Direction::CounterClockwise, profit_ccw, ccw)
    } else {
        return TriangleOutcome::Unprofitable { profit_cw, profit_ccw };
    };

    TriangleOutcome::Profitable(Opportunity {
        triangle,
        direction,
        fair_price,
        actual_price: price_cb,
        deviation_pct,
        profit_pct,
        steps,
        timestamp: Utc::now(),
    })
}

/// Better profitable rotation of (Q, B, C), if any.
pub fn evaluate_triangle(
    quote: &str,
    asset_b: &str,
    asset_c: &str,
    snapshot: &PriceSnapshot,
    fee_rate: f64,
) -> Option<Opportunity> {
    assess_triangle(quote, asset_b, asset_c, snapshot, fee_rate).into_opportunity()
}

/// Walks every (Q, {B, C}) combination once and ranks what clears the threshold.
pub fn scan_report(params: &ScanParams, snapshot: &PriceSnapshot) -> ScanReport {
    let mut report = ScanReport {
        pairs_in_snapshot: snapshot.len(),
        ..ScanReport::default()
    };

    for quote in &params.quote_currencies {
        let coins: Vec<&String> = params.target_assets.iter().filter(|c| *c != quote).collect();

        for (i, b) in coins.iter().enumerate() {
            for c in &coins[i + 1..] {
                report.evaluated += 1;
                match assess_triangle(quote, b, c, snapshot, params.fee_rate) {
                    TriangleOutcome::Incomplete => {
                        debug!("{}-{}-{}: incomplete price data", quote, b, c);
                        report.skipped += 1;
                    }
                    TriangleOutcome::Unprofitable { profit_cw, profit_ccw } => {
                        debug!("{}-{}-{}: cw {:.4}% ccw {:.4}%", quote, b, c, profit_cw, profit_ccw);
                        report.unprofitable += 1;
                    }
                    TriangleOutcome::Profitable(opp) => {
                        if opp.profit_pct >= params.min_profit_pct {
                            report.opportunities.push(opp);
                        } else {
                            report.below_threshold += 1;
                        }
                    }
                }
            }
        }
    }

    // stable: equal profits keep enumeration order
    report
        .opportunities
        .sort_by(|x, y| y.profit_pct.total_cmp(&x.profit_pct));
    report
}

pub fn scan_all(
    quote_currencies: &[String],
    target_assets: &[String],
    snapshot: &PriceSnapshot,
    fee_rate: f64,
    min_profit_pct: f64,
) -> Vec<Opportunity> {
    let params = ScanParams {
        quote_currencies: quote_currencies.to_vec(),
        target_assets: target_assets.to_vec(),
        fee_rate,
        min_profit_pct,
    };
    scan_report(&params, snapshot).opportunities
}

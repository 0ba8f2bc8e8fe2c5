//! Walks a fixed amount of capital through an opportunity's legs.

use serde::Serialize;

use crate::models::{Opportunity, Side, TradeStep};

#[derive(Debug, Clone, Serialize)]
pub struct LegFill {
    pub step: TradeStep,
    pub amount_in: f64,
    pub amount_out: f64,
}

impl LegFill {
    pub fn spent(&self) -> &str {
        match self.step.side {
            Side::Buy => &self.step.counter,
            Side::Sell => &self.step.asset,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Simulation {
    pub capital: f64,
    pub fills: Vec<LegFill>,
    pub final_amount: f64,
    pub profit: f64,
    /// What the arbitrage leg would have returned at the fair C/B price.
    pub fair_leg_amount: Option<f64>,
}

impl Simulation {
    pub fn profit_pct(&self) -> f64 {
        (self.final_amount / self.capital - 1.0) * 100.0
    }

    /// Extra units gained on the arbitrage leg compared to the fair price.
    pub fn arbitrage_edge(&self) -> Option<f64> {
        let fill = self.fills.iter().find(|f| f.step.arbitrage_leg)?;
        self.fair_leg_amount.map(|fair| fill.amount_out - fair)
    }
}

pub fn simulate(opp: &Opportunity, capital: f64, fee_rate: f64) -> Simulation {
    let fee_mult = 1.0 - fee_rate;
    let mut amount = capital;
    let mut fills = Vec::with_capacity(opp.steps.len());
    let mut fair_leg_amount = None;

    for step in &opp.steps {
        let amount_out = step.convert(amount) * fee_mult;
        if step.arbitrage_leg {
            let at_fair = TradeStep {
                price: opp.fair_price,
                ..step.clone()
            };
            fair_leg_amount = Some(at_fair.convert(amount) * fee_mult);
        }
        fills.push(LegFill {
            step: step.clone(),
            amount_in: amount,
            amount_out,
        });
        amount = amount_out;
    }

    Simulation {
        capital,
        fills,
        final_amount: amount,
        profit: amount - capital,
        fair_leg_amount,
    }
}

/// Expected value of `capital` after `profit_pct`.
pub fn expected_return(capital: f64, profit_pct: f64) -> f64 {
    capital * (1.0 + profit_pct / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::evaluate_triangle;
    use crate::snapshot::PriceSnapshot;

    fn opp(cross: f64) -> Opportunity {
        let snap: PriceSnapshot = [("BTCUSDT", 50_000.0), ("ETHUSDT", 3000.0), ("ETHBTC", cross)]
            .into_iter()
            .collect();
        evaluate_triangle("USDT", "BTC", "ETH", &snap, 0.001).unwrap()
    }

    #[test]
    fn simulated_profit_matches_reported_profit() {
        for cross in [0.055, 0.061, 0.065] {
            let o = opp(cross);
            let sim = simulate(&o, 10_000.0, 0.001);
            assert_eq!(sim.fills.len(), 3);
            assert!((sim.profit_pct() - o.profit_pct).abs() < 1e-9);
            assert!((sim.final_amount - expected_return(10_000.0, o.profit_pct)).abs() < 1e-6);
        }
    }

    #[test]
    fn clockwise_fill_chain() {
        let sim = simulate(&opp(0.055), 10_000.0, 0.001);
        let btc = 10_000.0 / 50_000.0 * 0.999;
        assert!((sim.fills[0].amount_out - btc).abs() < 1e-12);
        assert_eq!(sim.fills[0].spent(), "USDT");
        assert_eq!(sim.fills[1].amount_in, sim.fills[0].amount_out);
        assert_eq!(sim.fills[2].spent(), "ETH");
        assert!(sim.arbitrage_edge().unwrap() > 0.0);
    }

    #[test]
    fn counter_clockwise_gains_on_cross_leg() {
        let sim = simulate(&opp(0.065), 10_000.0, 0.001);
        assert_eq!(sim.fills[1].spent(), "ETH");
        assert!(sim.arbitrage_edge().unwrap() > 0.0);
        assert!(sim.profit > 0.0);
    }
}

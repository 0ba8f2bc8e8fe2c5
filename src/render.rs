use chrono::Local;
use crossterm::{
    cursor::MoveTo,
    execute,
    style::Stylize,
    terminal::{Clear, ClearType},
};
use std::fmt::Write;
use std::io;

use crate::models::{Opportunity, ScanParams, ScanReport};
use crate::simulate::{expected_return, simulate};
use crate::stats::ScanStats;
use crate::utils::round2;

const RULE: usize = 74;

fn rule(c: char) -> String {
    std::iter::repeat(c).take(RULE).collect()
}

pub fn clear_screen() -> io::Result<()> {
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))
}

pub fn header(params: &ScanParams, interval_secs: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", " TRIANGULAR ARBITRAGE SCANNER ".bold());
    let _ = writeln!(
        out,
        "  Fee: {:.2}% | Min Profit: {}% | Scan Interval: {}s",
        params.fee_rate * 100.0,
        params.min_profit_pct,
        interval_secs
    );
    let _ = writeln!(out, "  Time: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{}", rule('─'));
    out
}

pub fn scan_line(stats: &ScanStats, report: &ScanReport) -> String {
    format!(
        "  Scan #{} | Total pairs: {} | Triangles: {} ({} no data, {} unprofitable) | Best ever: {:.4}%",
        stats.scans_completed,
        report.pairs_in_snapshot,
        report.evaluated,
        report.skipped,
        report.unprofitable,
        stats.best_profit_ever
    )
}

fn row(index: usize, opp: &Opportunity) -> String {
    let line = format!(
        "  {:<3} {:<25} {:<12} {:<10} {}",
        index,
        opp.triangle.to_string(),
        format!("{:+.3}%", opp.deviation_pct),
        format!("{:.4}%", opp.profit_pct),
        opp.direction.path(&opp.triangle)
    );
    if opp.profit_pct >= 1.0 {
        line.green().to_string()
    } else if opp.profit_pct >= 0.5 {
        line.yellow().to_string()
    } else {
        line
    }
}

pub fn opportunities_table(opps: &[Opportunity], top: usize) -> String {
    let mut out = String::new();
    if opps.is_empty() {
        let _ = writeln!(out, "\n  [!] No profitable opportunities found at this moment.");
        let _ = writeln!(out, "      Market is efficient - keep scanning!");
        return out;
    }

    let _ = writeln!(out, "\n  Found {} profitable opportunities:\n", opps.len());
    let _ = writeln!(
        out,
        "  {:<3} {:<25} {:<12} {:<10} {}",
        "#", "Triangle", "Deviation", "Profit", "Direction"
    );
    let _ = writeln!(out, "  {}", "─".repeat(70));
    for (i, opp) in opps.iter().take(top).enumerate() {
        let _ = writeln!(out, "{}", row(i + 1, opp));
    }
    if opps.len() > top {
        let _ = writeln!(out, "\n  ... and {} more opportunities", opps.len() - top);
    }
    out
}

pub fn best_opportunity(opp: &Opportunity, capital: f64, fee_rate: f64) -> String {
    let t = &opp.triangle;
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule('═'));
    let _ = writeln!(out, "  BEST OPPORTUNITY DETAILS:");
    let _ = writeln!(out, "{}", rule('═'));
    let _ = writeln!(out, "\n  Triangle: {} - {} - {}", t.quote, t.asset_b, t.asset_c);
    let _ = writeln!(out, "  Direction: {} ({})", opp.direction.path(t), opp.direction);
    let _ = writeln!(out, "  Fair Price ({}/{}): {:.8}", t.asset_c, t.asset_b, opp.fair_price);
    let _ = writeln!(out, "  Actual Price: {:.8}", opp.actual_price);
    let cheapness = if opp.deviation_pct < 0.0 { "CHEAP" } else { "EXPENSIVE" };
    let _ = writeln!(
        out,
        "  Deviation: {:+.4}% ({} is {} in {} terms)",
        opp.deviation_pct, t.asset_c, cheapness, t.asset_b
    );
    let _ = writeln!(out, "  Estimated Profit: {:.4}%", opp.profit_pct);

    let _ = writeln!(out, "\n  Trade Steps:");
    for (i, step) in opp.steps.iter().enumerate() {
        let _ = writeln!(out, "     {}. {}", i + 1, step);
    }

    let sim = simulate(opp, capital, fee_rate);
    let _ = writeln!(out, "\n  With {:.2} {} capital:", capital, t.quote);
    for fill in &sim.fills {
        let _ = writeln!(
            out,
            "     {:.8} {} -> {:.8} {}",
            fill.amount_in,
            fill.spent(),
            fill.amount_out,
            fill.step.receives()
        );
    }
    if let (Some(fair), Some(edge)) = (sim.fair_leg_amount, sim.arbitrage_edge()) {
        let _ = writeln!(out, "     (at fair price: {:.8}, extra gained: {:+.8})", fair, edge);
    }
    let ret = expected_return(capital, opp.profit_pct);
    let _ = writeln!(out, "     Expected return: {:.2}", round2(ret));
    let _ = writeln!(out, "     Profit: {:.2}", round2(ret - capital));
    out
}

pub fn session_summary(stats: &ScanStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule('═'));
    let _ = writeln!(out, "  SESSION SUMMARY");
    let _ = writeln!(out, "{}", rule('═'));
    let _ = writeln!(out, "  Total scans: {}", stats.scans_completed);
    let _ = writeln!(out, "  Failed fetches: {}", stats.fetch_failures);
    let _ = writeln!(out, "  Total opportunities found: {}", stats.total_opportunities_found);
    let _ = writeln!(out, "  Best profit seen: {:.4}%", stats.best_profit_ever);
    out
}

/// Full frame for one completed scan.
pub fn frame(
    params: &ScanParams,
    interval_secs: u64,
    stats: &ScanStats,
    report: &ScanReport,
    top: usize,
    capital: f64,
) -> String {
    let mut out = header(params, interval_secs);
    out.push_str(&scan_line(stats, report));
    out.push('\n');
    out.push_str(&opportunities_table(&report.opportunities, top));
    if let Some(best) = report.opportunities.first() {
        out.push_str(&best_opportunity(best, capital, params.fee_rate));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::scan_report;
    use crate::snapshot::PriceSnapshot;

    fn params() -> ScanParams {
        ScanParams {
            quote_currencies: vec!["USDT".into()],
            target_assets: vec!["BTC".into(), "ETH".into(), "BNB".into()],
            fee_rate: 0.001,
            min_profit_pct: 0.0,
        }
    }

    fn report() -> ScanReport {
        let snap: PriceSnapshot = [
            ("BTCUSDT", 50_000.0),
            ("ETHUSDT", 3000.0),
            ("ETHBTC", 0.061),
            ("BNBUSDT", 600.0),
            ("BNBBTC", 0.0118),
        ]
        .into_iter()
        .collect();
        scan_report(&params(), &snap)
    }

    #[test]
    fn empty_table_says_so() {
        assert!(opportunities_table(&[], 15).contains("No profitable opportunities"));
    }

    #[test]
    fn table_is_truncated_to_top() {
        let r = report();
        assert_eq!(r.opportunities.len(), 2);
        let out = opportunities_table(&r.opportunities, 1);
        assert!(out.contains("Found 2 profitable opportunities"));
        assert!(out.contains("... and 1 more"));
        assert!(out.contains(&r.opportunities[0].triangle.to_string()));
    }

    #[test]
    fn frame_includes_best_details_and_steps() {
        let r = report();
        let stats = ScanStats::new().record(&r);
        let out = frame(&params(), 2, &stats, &r, 15, 1000.0);
        assert!(out.contains("Scan #1"));
        assert!(out.contains("BEST OPPORTUNITY DETAILS"));
        assert!(out.contains("(ARBITRAGE)"));
        assert!(out.contains("Expected return"));
    }

    #[test]
    fn summary_lists_totals() {
        let stats = ScanStats::new().record(&report()).record_fetch_failure();
        let out = session_summary(&stats);
        assert!(out.contains("Total scans: 1"));
        assert!(out.contains("Failed fetches: 1"));
        assert!(out.contains("Total opportunities found: 2"));
    }
}

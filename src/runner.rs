use std::io::{self, Write};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use crate::exchanges::PriceSource;
use crate::logic::scan_report;
use crate::models::{ScanParams, ScanReport};
use crate::render;
use crate::routes::SharedAppState;
use crate::stats::ScanStats;

fn write_line<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "{}", text)?;
    out.flush()
}

/// Prints to stdout; a closed or broken stdout is logged, not fatal.
fn say(text: &str) {
    if let Err(e) = write_line(&mut io::stdout().lock(), text) {
        warn!("stdout write failed: {}", e);
    }
}

/// Display options for the terminal frame.
#[derive(Debug, Clone)]
pub struct View {
    pub top: usize,
    pub capital: f64,
    /// Clear the terminal before each frame.
    pub clear: bool,
}

/// Drives fetch -> scan -> render once per interval until interrupted.
pub struct ScanLoop {
    params: ScanParams,
    source: PriceSource,
    every: Duration,
    view: View,
    shared: Option<SharedAppState>,
}

impl ScanLoop {
    pub fn new(params: ScanParams, source: PriceSource, every: Duration, view: View) -> Self {
        Self { params, source, every, view, shared: None }
    }

    /// Publish every completed scan to the HTTP state.
    pub fn with_shared_state(mut self, shared: SharedAppState) -> Self {
        self.shared = Some(shared);
        self
    }

    /// One fetch and scan. A failed fetch skips the scan entirely.
    pub async fn cycle(&self, stats: ScanStats) -> (ScanStats, Option<ScanReport>) {
        let snapshot = match self.source.fetch().await {
            Ok(s) => s,
            Err(e) => {
                warn!("fetch failed, skipping scan: {}", e);
                return (stats.record_fetch_failure(), None);
            }
        };

        let report = scan_report(&self.params, &snapshot);
        let stats = stats.record(&report);
        info!(
            "scan #{}: {} pairs, {} triangles, {} skipped, {} opportunities",
            stats.scans_completed,
            report.pairs_in_snapshot,
            report.evaluated,
            report.skipped,
            report.opportunities.len()
        );

        if let Some(shared) = &self.shared {
            let mut guard = shared.write().await;
            guard.last_report = Some(report.clone());
            guard.stats = stats.clone();
        }
        (stats, Some(report))
    }

    fn show(&self, stats: &ScanStats, report: &ScanReport) {
        if self.view.clear {
            if let Err(e) = render::clear_screen() {
                warn!("clear screen failed: {}", e);
            }
        }
        let frame = render::frame(
            &self.params,
            self.every.as_secs(),
            stats,
            report,
            self.view.top,
            self.view.capital,
        );
        say(&frame);
    }

    /// Runs until Ctrl-C, or after one completed scan when `once` is set.
    /// An interrupted cycle is dropped whole.
    pub async fn run(self, once: bool) -> ScanStats {
        info!("scanning via {}", self.source.describe());
        let mut stats = ScanStats::new();
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let (next, report) = tokio::select! {
                _ = &mut shutdown => break,
                done = self.cycle(stats.clone()) => done,
            };
            stats = next;

            match report {
                Some(report) => {
                    self.show(&stats, &report);
                    if once {
                        break;
                    }
                    say(&format!("\n  Press Ctrl+C to stop. Next scan in {}s...", self.every.as_secs()));
                }
                None if once => break,
                None => say("Failed to fetch prices. Retrying..."),
            }
        }

        stats
    }
}

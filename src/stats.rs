//! Running totals across scan cycles, owned by the scan loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ScanReport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStats {
    pub scans_completed: u64,
    pub fetch_failures: u64,
    pub total_opportunities_found: u64,
    /// Best profit seen since start, in percent. Never below zero.
    pub best_profit_ever: f64,
    pub started_at: DateTime<Utc>,
    pub last_scan_at: Option<DateTime<Utc>>,
}

impl ScanStats {
    pub fn new() -> Self {
        Self {
            scans_completed: 0,
            fetch_failures: 0,
            total_opportunities_found: 0,
            best_profit_ever: 0.0,
            started_at: Utc::now(),
            last_scan_at: None,
        }
    }

    /// Folds one completed scan into the totals.
    pub fn record(mut self, report: &ScanReport) -> Self {
        self.scans_completed += 1;
        self.total_opportunities_found += report.opportunities.len() as u64;
        if let Some(best) = report.opportunities.first() {
            if best.profit_pct > self.best_profit_ever {
                self.best_profit_ever = best.profit_pct;
            }
        }
        self.last_scan_at = Some(Utc::now());
        self
    }

    pub fn record_fetch_failure(mut self) -> Self {
        self.fetch_failures += 1;
        self
    }
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

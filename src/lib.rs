//! Triangular arbitrage detection over a point-in-time price snapshot.
//!
//! The core (`snapshot`, `logic`) is pure and synchronous. Fetching,
//! rendering, the scan loop and the HTTP API sit around it.

pub mod config;
pub mod error;
pub mod exchanges;
pub mod logic;
pub mod models;
pub mod render;
pub mod routes;
pub mod runner;
pub mod simulate;
pub mod snapshot;
pub mod stats;
pub mod utils;

pub use logic::{assess_triangle, evaluate_triangle, scan_all, scan_report, TriangleOutcome};
pub use models::{Direction, Opportunity, ScanParams, ScanReport, Triangle};
pub use snapshot::{resolve_price, PriceSnapshot};
pub use stats::ScanStats;

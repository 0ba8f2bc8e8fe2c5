use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

use triangular_scan::config::{Settings, SourceKind};
use triangular_scan::exchanges::PriceSource;
use triangular_scan::render;
use triangular_scan::routes::{self, AppState};
use triangular_scan::runner::{ScanLoop, View};
use triangular_scan::utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_tracing();

    let settings = Settings::parse();
    let params = settings.scan_params()?;

    let source = match settings.source {
        SourceKind::Rest => PriceSource::rest(settings.ticker_url()?, settings.timeout())
            .context("building http client")?,
        SourceKind::Stream => PriceSource::stream(
            settings.ws_url.clone(),
            std::time::Duration::from_secs(settings.window),
            settings.timeout(),
        ),
    };

    let view = View {
        top: settings.top,
        capital: settings.capital,
        clear: !settings.once,
    };
    let mut scan_loop = ScanLoop::new(params, source, settings.interval(), view);

    if let Some(port) = settings.port {
        let shared = Arc::new(RwLock::new(AppState::default()));
        scan_loop = scan_loop.with_shared_state(shared.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {}", addr))?;
        tracing::info!("listening on {}", addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, routes::router(shared)).await {
                tracing::error!("http server failed: {:?}", e);
            }
        });
    }

    let stats = scan_loop.run(settings.once).await;
    print!("{}", render::session_summary(&stats));
    if settings.once && stats.scans_completed == 0 {
        anyhow::bail!("no scan completed");
    }
    Ok(())
}

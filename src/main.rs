// ██╗    ██╗ █████╗ ████████╗ ██████╗██╗  ██╗██████╗  ██████╗  ██████╗
// ██║    ██║██╔══██╗╚══██╔══╝██╔════╝██║  ██║██╔══██╗██╔═══██╗██╔════╝
// ██║ █╗ ██║███████║   ██║   ██║     ███████║██║  ██║██║   ██║██║  ███╗
// ██║███╗██║██╔══██║   ██║   ██║     ██╔══██║██║  ██║██║   ██║██║   ██║
// ╚███╔███╔╝██║  ██║   ██║   ╚██████╗██║  ██║██████╔╝╚██████╔╝╚██████╔╝
//  ╚══╝╚══╝ ╚═╝  ╚═╝   ╚═╝    ╚═════╝╚═╝  ╚═╝╚═════╝  ╚═════╝  ╚═════╝
//
// E N G I N E
//
// Name a government. Get a report on what its legislature is up to and how
// worried you should be. With an API key the language model writes the
// report; without one you get a very convincing demo.

mod activity;
mod circuit_breaker;
mod config;
mod decoder;
mod demo;
mod gateway;
mod landing;
mod metrics;
mod models;
mod query;
mod relative_time;
mod routes;
mod server;
mod source;
mod suggestions;
mod usage;

use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::Config;
use crate::metrics::MetricsCollector;
use crate::server::AppState;
use crate::usage::UsageCounter;

fn print_banner(mode: &str) {
    let banner = format!(
        r#"

    ╔══════════════════════════════════════════════════════════════════╗
    ║                                                                  ║
    ║     W A T C H D O G   E N G I N E                                ║
    ║                                                                  ║
    ║   Reports:   country | state | city | deep dive                  ║
    ║   Mode:      {mode:<52}║
    ║   Paywall:   session-scoped deep-dive counter                    ║
    ║   Resilience: one attempt per question, circuit breaker on top   ║
    ║                                                                  ║
    ║   "Somebody should be reading these bills."                      ║
    ║                                                                  ║
    ╚══════════════════════════════════════════════════════════════════╝
    "#
    );
    println!("{}", banner);
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(true)
        .init();

    let config = Config::from_env();
    let mode = if config.demo_mode() { "demo" } else { "live" };
    print_banner(mode);

    info!("🏛️ WATCHDOG ENGINE initializing...");
    info!("✅ Configuration loaded: {:?}", config);

    let metrics_collector = Arc::new(MetricsCollector::new(mode));

    let breaker = Arc::new(CircuitBreaker::new(
        "model-provider",
        config.circuit_breaker_failure_threshold,
        config.circuit_breaker_reset_timeout,
        config.circuit_breaker_success_threshold,
    ));

    // The one and only credential check.
    let report_source = source::select(&config, breaker.clone(), metrics_collector.clone())?;

    let usage_counter = Arc::new(UsageCounter::new(config.deep_dive_limit));
    info!("✅ Usage counter ready: {} free deep dives per session", config.deep_dive_limit);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ═══════════════════════════════════════════
    // SPAWN DASHBOARD SERVER
    // ═══════════════════════════════════════════
    let app_state = AppState {
        source: report_source,
        usage: usage_counter,
        metrics: metrics_collector.clone(),
    };
    let listen_addr = config.listen_addr();
    let mut server_shutdown = shutdown_rx.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::run_server(app_state, listen_addr, &mut server_shutdown).await {
            error!("🏛️ Dashboard server error: {}", e);
        }
        info!("🏛️ Dashboard server: OFFLINE");
    });

    // ═══════════════════════════════════════════
    // SPAWN METRICS HTTP SERVER
    // ═══════════════════════════════════════════
    let metrics_for_server = metrics_collector.clone();
    let breaker_for_metrics = (!config.demo_mode()).then(|| breaker.clone());
    let metrics_addr = config.metrics_addr();
    let mut metrics_shutdown = shutdown_rx.clone();
    let metrics_handle = tokio::spawn(async move {
        metrics::run_metrics_server(
            metrics_for_server,
            breaker_for_metrics,
            metrics_addr,
            &mut metrics_shutdown,
        )
        .await;
        info!("📊 Metrics server: OFFLINE");
    });

    info!("═══════════════════════════════════════════════════════");
    info!("  🟢 WATCHDOG ENGINE ACTIVE ({} mode)", mode);
    info!("  🏛️ Dashboards at http://{}/dashboard/<country>", config.listen_addr());
    info!("  📊 Metrics at http://{}", config.metrics_addr());
    info!("  ⚡ Press Ctrl+C for graceful shutdown");
    info!("═══════════════════════════════════════════════════════");

    match signal::ctrl_c().await {
        Ok(()) => {
            warn!("🛑 Shutdown signal received!");
        }
        Err(err) => {
            error!("❌ Signal listener error: {}", err);
        }
    }
    let _ = shutdown_tx.send(true);

    info!("⏳ Waiting for servers to stop (timeout: 10s)...");
    let _ = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        async {
            let _ = tokio::join!(server_handle, metrics_handle);
        }
    ).await;

    info!("WATCHDOG ENGINE: OFFLINE");
    Ok(())
}

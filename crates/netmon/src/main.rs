#![forbid(unsafe_code)]

//! Bandwidth monitor: serves vnstat and arp data for the dashboard's network widget.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use clap::Parser;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod http;
mod probe;
mod service;

use crate::service::NetmonService;

#[derive(Parser, Debug)]
#[command(name = "wallboard-netmon", version)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:3001")]
    listen: SocketAddr,

    /// Overrides the port of `--listen`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// vnstat executable.
    #[arg(long, default_value = "vnstat")]
    vnstat_bin: String,

    /// arp executable.
    #[arg(long, default_value = "arp")]
    arp_bin: String,

    /// Devices reported from the ARP table.
    #[arg(long, default_value_t = 10)]
    max_devices: usize,

    /// Per-probe timeout in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    probe_timeout_ms: u64,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut addr = args.listen;
    if let Some(port) = args.port {
        addr.set_port(port);
    }

    let svc = Arc::new(NetmonService::new(
        args.vnstat_bin,
        args.arp_bin,
        args.max_devices,
        Duration::from_millis(args.probe_timeout_ms),
    ));

    let app = http::router(svc)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!(listen = %addr, "netmon starting");
    tracing::info!("endpoints: GET /api/network/bandwidth, GET /api/health");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}

//! Manufacturing dashboard HTTP server
//!
//! Loads the simulation output once at startup, then serves the rendered
//! page and keeps it up to date as controls change or simulations run.
//!
//! Usage:
//!   ./target/release/dashboard_server [options]
//!
//! Options:
//!   --port PORT           Port to listen on (default: 8080)
//!   --base-url URL        Simulation backend (default: http://localhost:8000)
//!   --data-dir PATH       Serve JSON files from disk instead of the backend
//!
//! Endpoints:
//!   GET  /                                  HTML dashboard
//!   GET  /api/v1/health                     Health check
//!   GET  /api/v1/page                       Full page state
//!   GET  /api/v1/charts/:id                 One chart as SVG
//!   POST /api/v1/controls                   Change a control
//!   POST /api/v1/refresh                    Run a new simulation and reload
//!   POST /api/v1/notifications/:id/dismiss  Dismiss a banner
//!   GET  /api/v1/debug/freshness            Per-dataset timestamps
//!   GET  /api/v1/events                     Server-sent redraw events

use anyhow::Result;
use clap::Parser;
use factory_dashboard::api::{router, AppState};
use factory_dashboard::config::{DashboardConfig, SourceArgs};
use factory_dashboard::dashboard::DashboardController;
use factory_dashboard::logging;
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "dashboard_server")]
#[command(about = "Serve the manufacturing dashboard over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    #[command(flatten)]
    source: SourceArgs,
}

fn print_banner(port: u16, source: &str) {
    println!("============================================================");
    println!("         MANUFACTURING DASHBOARD SERVER");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  Page:     http://localhost:{}/", port);
    println!("  Source:   {}", source);
    println!();
    println!("Endpoints:");
    println!("  GET  /api/v1/health               Health check");
    println!("  GET  /api/v1/page                 Page state");
    println!("  GET  /api/v1/charts/:id           Chart SVG");
    println!("  POST /api/v1/controls             Change a control");
    println!("  POST /api/v1/refresh              Run new simulation");
    println!("  POST /api/v1/notifications/:id/dismiss  Dismiss banner");
    println!("  GET  /api/v1/debug/freshness      Dataset timestamps");
    println!("  GET  /api/v1/events               Redraw events (SSE)");
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let args = Args::parse();
    let config = DashboardConfig::from(args.source);
    let source = config.build_source();
    print_banner(args.port, &source.describe());

    let mut controller = DashboardController::new(source, config.controller_config());
    controller.load().await;

    let app = router(AppState::new(controller));
    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    tracing::info!("Starting dashboard server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Render the manufacturing dashboard to files
//!
//! Usage:
//!   factory_dashboard [SOURCE OPTIONS] <COMMAND>
//!
//! Commands:
//!   render      Load the data once and write every chart as SVG plus dashboard.json
//!   refresh     Run a new simulation on the backend, then render
//!   freshness   Print the timestamp carried by each dataset
//!
//! Source options:
//!   --base-url URL        Simulation backend (default: http://localhost:8000)
//!   --data-dir PATH       Read the JSON files from disk instead
//!   --settle-delay-ms N   Wait after a simulation before reloading (default: 1000)
//!   --width / --height    Chart size in pixels (default: 640 x 320)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use factory_dashboard::aggregate::Granularity;
use factory_dashboard::config::{DashboardConfig, SourceArgs};
use factory_dashboard::dashboard::{DashboardController, Phase, SlotContent};
use factory_dashboard::logging;
use factory_dashboard::state::{ControlEvent, ProductionView, WsMetric};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "factory_dashboard")]
#[command(about = "Render manufacturing simulation results as SVG charts")]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone)]
struct ViewArgs {
    /// Output directory for the SVG files and dashboard.json
    #[arg(long, default_value = "dashboard_out")]
    out: PathBuf,

    /// Production trend granularity: day, week, month, quarter or year
    #[arg(long, default_value = "day")]
    time_range: Granularity,

    /// Workstation metric: downtime, waiting or active
    #[arg(long, default_value = "downtime")]
    ws_metric: WsMetric,

    /// Workstation highlighted in the utilization chart (1-6)
    #[arg(long, default_value = "1")]
    workstation: u8,

    /// Production trend view: production or quality
    #[arg(long, default_value = "production")]
    view: ProductionView,
}

impl ViewArgs {
    fn events(&self) -> [ControlEvent; 4] {
        [
            ControlEvent::TimeRange(self.time_range),
            ControlEvent::WsMetric(self.ws_metric),
            ControlEvent::Workstation(self.workstation),
            ControlEvent::ProductionView(self.view),
        ]
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load once and render every chart
    Render(ViewArgs),
    /// Run a simulation, reload and render
    Refresh(ViewArgs),
    /// Show per-dataset timestamps of a fresh load
    Freshness,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();
    let config = DashboardConfig::from(cli.source);
    let mut controller = config.controller();

    match cli.command {
        Command::Render(view) => {
            for event in view.events() {
                controller.apply(event)?;
            }
            controller.load().await;
            write_outputs(&controller, &view.out).await?;
        }
        Command::Refresh(view) => {
            for event in view.events() {
                controller.apply(event)?;
            }
            controller.refresh().await;
            write_outputs(&controller, &view.out).await?;
        }
        Command::Freshness => {
            controller.load().await;
            let report = controller.freshness();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    let page = controller.page();
    if page.phase == Phase::ReadyWithError || page.active_error_count() > 0 {
        for n in page.active_notifications() {
            eprintln!("{}", n.message);
        }
        bail!("dashboard finished with errors");
    }
    Ok(())
}

async fn write_outputs(controller: &DashboardController, out: &Path) -> Result<()> {
    tokio::fs::create_dir_all(out)
        .await
        .with_context(|| format!("creating {}", out.display()))?;

    let page = controller.page();
    let mut written = 0;
    for slot in page.slots.values() {
        if let SlotContent::Chart { svg } = &slot.content {
            let path = out.join(format!("{}.svg", slot.chart));
            tokio::fs::write(&path, svg)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            written += 1;
        }
    }

    let json_path = out.join("dashboard.json");
    tokio::fs::write(&json_path, serde_json::to_vec_pretty(page)?)
        .await
        .with_context(|| format!("writing {}", json_path.display()))?;
    info!(charts = written, out = %out.display(), "Dashboard written");

    if let Some(headline) = &page.headline {
        println!("{}", headline);
    }
    for slot in page.slots.values() {
        if let Some(insight) = &slot.insight {
            println!("  {:<26} {}", slot.title, insight);
        }
    }
    Ok(())
}

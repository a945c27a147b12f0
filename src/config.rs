//! Runtime configuration and the command line flags that build it

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use crate::dashboard::{ControllerConfig, DashboardController, DataSource, DirSource, HttpSource};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Http { base_url: String },
    Directory { root: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    /// Wait after a simulation before reloading; the backend writes its
    /// files about a second after answering.
    pub settle_delay: Duration,
    pub chart_width: f64,
    pub chart_height: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::Http {
                base_url: DEFAULT_BASE_URL.to_string(),
            },
            settle_delay: Duration::from_secs(1),
            chart_width: 640.0,
            chart_height: 320.0,
        }
    }
}

impl DashboardConfig {
    pub fn build_source(&self) -> Arc<dyn DataSource> {
        match &self.source {
            SourceConfig::Http { base_url } => Arc::new(HttpSource::new(base_url)),
            SourceConfig::Directory { root } => Arc::new(DirSource::new(root.clone())),
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            settle_delay: self.settle_delay,
            chart_width: self.chart_width,
            chart_height: self.chart_height,
        }
    }

    pub fn controller(&self) -> DashboardController {
        DashboardController::new(self.build_source(), self.controller_config())
    }
}

/// Flags shared by the CLI and the server
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Base URL of the simulation backend
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Read the JSON files from this directory instead of over HTTP
    #[arg(long, conflicts_with = "base_url")]
    pub data_dir: Option<PathBuf>,

    /// Delay between a finished simulation and the reload, in milliseconds
    #[arg(long, default_value = "1000")]
    pub settle_delay_ms: u64,

    /// Chart width in pixels
    #[arg(long, default_value = "640")]
    pub width: u32,

    /// Chart height in pixels
    #[arg(long, default_value = "320")]
    pub height: u32,
}

impl From<SourceArgs> for DashboardConfig {
    fn from(args: SourceArgs) -> Self {
        let source = match args.data_dir {
            Some(root) => SourceConfig::Directory { root },
            None => SourceConfig::Http {
                base_url: args.base_url,
            },
        };
        Self {
            source,
            settle_delay: Duration::from_millis(args.settle_delay_ms),
            chart_width: f64::from(args.width),
            chart_height: f64::from(args.height),
        }
    }
}

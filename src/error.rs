//! Error types for loading and refreshing dashboard data

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("request for {resource} failed with HTTP {status}")]
    Http { resource: String, status: u16 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("simulation failed: {0}")]
    Simulation(String),

    #[error("this data source cannot run simulations")]
    SimulationUnsupported,

    #[error("invalid control value: {0}")]
    InvalidControl(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

//! In-memory data source shared by the controller and router tests

use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::page::{DashboardPage, Phase};
use super::source::{DataSource, Resource};
use crate::error::{DashboardError, Result};

pub(crate) fn sample_body(resource: Resource) -> String {
    let value = match resource {
        Resource::DailyProduction => json!([
            {"date": "2025-01-01", "production": 1000, "faulty": 40,
             "workstation_downtime": [1.0, 2.0, 0.5, 6.0, 1.0, 1.5], "timestamp": "2025-03-01 10:00:00"},
            {"date": "2025-01-02", "production": 1100, "faulty": 50,
             "workstation_downtime": [1.5, 2.5, 0.5, 7.0, 1.0, 1.0]},
            {"date": "2025-01-03", "production": 1200, "faulty": 45,
             "workstation_downtime": [1.0, 2.0, 1.0, 8.0, 0.5, 1.0]}
        ]),
        Resource::WorkstationPerformance => {
            let rows: Vec<_> = (1..=6u8)
                .map(|ws| {
                    let down = if ws == 4 { 12.0 } else { 4.0 + f64::from(ws) * 0.5 };
                    json!({
                        "workstation": ws, "downtime": down, "waiting_time": 3.0, "active_time": 40.0,
                        "active_percentage": 75.0, "waiting_percentage": 10.0, "downtime_percentage": 15.0,
                        "failure_probability": 0.02 * f64::from(ws), "timestamp": "2025-03-01 10:00:00"
                    })
                })
                .collect();
            json!(rows)
        }
        Resource::PlantPerformance => json!([
            {"run": 1, "supplier_occupancy": 60.0, "bottleneck_delay": 2.0, "total_production": 30000, "quality_percentage": 94.0},
            {"run": 2, "supplier_occupancy": 70.0, "bottleneck_delay": 3.5, "total_production": 32000, "quality_percentage": 95.5},
            {"run": 3, "supplier_occupancy": 80.0, "bottleneck_delay": 5.0, "total_production": 35000, "quality_percentage": 96.0}
        ]),
        Resource::ProductData => json!([
            {"product_type": "Type A", "production_count": 600, "faulty_count": 20, "quality_rate": 96.7},
            {"product_type": "Type B", "production_count": 400, "faulty_count": 30, "quality_rate": 92.5}
        ]),
        Resource::KpiSummary => json!({
            "avg_daily_production": 1100.0,
            "avg_quality_percentage": 95.6,
            "avg_downtime_hours": 9.2,
            "bottleneck_workstation": 4,
            "timestamp": "2025-03-01 10:00:00"
        }),
    };
    value.to_string()
}

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Body(String),
    Status(u16),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum SimulationReply {
    Succeed,
    Fail,
    Unsupported,
}

/// What the page looked like while a simulation was running
#[derive(Debug, Clone)]
pub(crate) struct Observed {
    pub refresh_enabled: bool,
    pub status_message: Option<String>,
    pub phase: Phase,
}

pub(crate) struct MemorySource {
    replies: Mutex<BTreeMap<Resource, Reply>>,
    simulation: Mutex<SimulationReply>,
    pages: Mutex<Option<watch::Receiver<Arc<DashboardPage>>>>,
    pub observed: Mutex<Vec<Observed>>,
    pub fetches: AtomicUsize,
    pub simulations: AtomicUsize,
}

impl MemorySource {
    pub fn healthy() -> Arc<Self> {
        let replies = Resource::ALL
            .iter()
            .map(|r| (*r, Reply::Body(sample_body(*r))))
            .collect();
        Arc::new(Self {
            replies: Mutex::new(replies),
            simulation: Mutex::new(SimulationReply::Succeed),
            pages: Mutex::new(None),
            observed: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            simulations: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, resource: Resource, reply: Reply) {
        self.replies.lock().unwrap().insert(resource, reply);
    }

    pub fn set_simulation(&self, reply: SimulationReply) {
        *self.simulation.lock().unwrap() = reply;
    }

    /// Record the published page each time a simulation starts.
    pub fn watch(&self, pages: watch::Receiver<Arc<DashboardPage>>) {
        *self.pages.lock().unwrap() = Some(pages);
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch(&self, resource: Resource) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().get(&resource).cloned();
        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(DashboardError::Http {
                resource: resource.name().to_string(),
                status,
            }),
            None => Err(DashboardError::Http {
                resource: resource.name().to_string(),
                status: 404,
            }),
        }
    }

    async fn run_simulation(&self) -> Result<String> {
        self.simulations.fetch_add(1, Ordering::SeqCst);
        if let Some(pages) = self.pages.lock().unwrap().as_ref() {
            let page = pages.borrow();
            self.observed.lock().unwrap().push(Observed {
                refresh_enabled: page.refresh_enabled,
                status_message: page.status_message.clone(),
                phase: page.phase,
            });
        }
        let reply = *self.simulation.lock().unwrap();
        match reply {
            SimulationReply::Succeed => Ok(r#"{"status": "success"}"#.to_string()),
            SimulationReply::Fail => {
                Err(DashboardError::Simulation("backend answered HTTP 500".into()))
            }
            SimulationReply::Unsupported => Err(DashboardError::SimulationUnsupported),
        }
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

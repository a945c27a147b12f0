//! Where the dashboard's JSON comes from
//!
//! [`HttpSource`] talks to the simulation backend; [`DirSource`] reads the
//! files the backend writes straight off disk.

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{DashboardError, Result};

/// The five JSON documents one load fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    DailyProduction,
    WorkstationPerformance,
    PlantPerformance,
    ProductData,
    KpiSummary,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::DailyProduction,
        Resource::WorkstationPerformance,
        Resource::PlantPerformance,
        Resource::ProductData,
        Resource::KpiSummary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::DailyProduction => "daily_production",
            Resource::WorkstationPerformance => "workstation_performance",
            Resource::PlantPerformance => "plant_performance",
            Resource::ProductData => "product_data",
            Resource::KpiSummary => "kpi_summary",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }

    /// Path relative to the server root, e.g. `data/kpi_summary.json`
    pub fn path(&self) -> String {
        format!("data/{}", self.file_name())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Raw body of one resource.
    async fn fetch(&self, resource: Resource) -> Result<String>;

    /// Ask the backend to run a new simulation; returns its response body.
    async fn run_simulation(&self) -> Result<String>;

    fn describe(&self) -> String;
}

// ============================================================================
// HTTP
// ============================================================================

pub const SIMULATION_PATH: &str = "api/run-simulation";

pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET with a unique `t`/`r` query and no-cache headers.
    async fn get_uncached(&self, path: &str, label: &str) -> Result<String> {
        let url = self.url(path);
        let millis = chrono::Utc::now().timestamp_millis();
        let nonce: u32 = rand::thread_rng().gen();
        debug!(url = %url, "Fetching {}", label);

        let response = self
            .client
            .get(&url)
            .query(&[("t", millis.to_string()), ("r", nonce.to_string())])
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Http {
                resource: label.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, resource: Resource) -> Result<String> {
        self.get_uncached(&resource.path(), resource.name()).await
    }

    async fn run_simulation(&self) -> Result<String> {
        let body = self
            .get_uncached(SIMULATION_PATH, "simulation")
            .await
            .map_err(|e| match e {
                DashboardError::Http { status, .. } => {
                    DashboardError::Simulation(format!("backend answered HTTP {}", status))
                }
                other => other,
            })?;
        debug!(body = %body, "Simulation response");
        Ok(body)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

// ============================================================================
// Directory
// ============================================================================

/// Reads `data/<file>` from `<root>/dashboard/data`, falling back to
/// `<root>/data`.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, resource: Resource) -> [PathBuf; 2] {
        let file = resource.file_name();
        [
            self.root.join("dashboard").join("data").join(&file),
            self.root.join("data").join(&file),
        ]
    }
}

#[async_trait]
impl DataSource for DirSource {
    async fn fetch(&self, resource: Resource) -> Result<String> {
        let [preferred, fallback] = self.candidates(resource);
        let path = if tokio::fs::try_exists(&preferred).await.unwrap_or(false) {
            preferred
        } else {
            fallback
        };
        debug!(path = %path.display(), "Reading {}", resource);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| DashboardError::Io { path, source })
    }

    async fn run_simulation(&self) -> Result<String> {
        Err(DashboardError::SimulationUnsupported)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_paths() {
        assert_eq!(Resource::KpiSummary.path(), "data/kpi_summary.json");
        assert_eq!(Resource::ALL.len(), 5);
    }

    #[test]
    fn base_url_is_normalised() {
        let source = HttpSource::new("http://localhost:8000/");
        assert_eq!(source.url("data/x.json"), "http://localhost:8000/data/x.json");
    }

    #[tokio::test]
    async fn directory_source_cannot_simulate() {
        let source = DirSource::new("/nonexistent");
        assert!(matches!(
            source.run_simulation().await,
            Err(DashboardError::SimulationUnsupported)
        ));
        assert!(matches!(
            source.fetch(Resource::ProductData).await,
            Err(DashboardError::Io { .. })
        ));
    }

    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Seen {
        requests: Arc<Mutex<Vec<(HashMap<String, String>, Option<String>, Option<String>)>>>,
    }

    async fn record(
        State(seen): State<Seen>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> String {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        seen.requests
            .lock()
            .unwrap()
            .push((query, header("cache-control"), header("pragma")));
        r#"{"avg_daily_production": 1.0}"#.to_string()
    }

    async fn spawn_backend() -> (String, Seen) {
        let seen = Seen::default();
        let app = Router::new()
            .route("/data/kpi_summary.json", get(record))
            .route("/data/product_data.json", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/api/run-simulation", get(|| async { (StatusCode::BAD_GATEWAY, "traceback") }))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    #[tokio::test]
    async fn http_fetches_bypass_caches() {
        let (base, seen) = spawn_backend().await;
        let source = HttpSource::new(&base);

        let body = source.fetch(Resource::KpiSummary).await.unwrap();
        source.fetch(Resource::KpiSummary).await.unwrap();

        assert!(body.contains("avg_daily_production"));
        let requests = seen.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        for (query, cache_control, pragma) in &requests {
            assert!(query["t"].parse::<i64>().is_ok());
            assert!(query.contains_key("r"));
            assert_eq!(cache_control.as_deref(), Some("no-cache"));
            assert_eq!(pragma.as_deref(), Some("no-cache"));
        }
        assert_ne!(requests[0].0, requests[1].0);
    }

    #[tokio::test]
    async fn http_error_status_is_reported_per_resource() {
        let (base, _) = spawn_backend().await;
        let source = HttpSource::new(&base);

        match source.fetch(Resource::ProductData).await {
            Err(DashboardError::Http { resource, status }) => {
                assert_eq!(resource, "product_data");
                assert_eq!(status, 500);
            }
            other => panic!("unexpected {:?}", other),
        }
        match source.run_simulation().await {
            Err(DashboardError::Simulation(message)) => assert!(message.contains("502")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn directory_source_prefers_dashboard_data() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("dashboard/data")).unwrap();
        std::fs::create_dir_all(root.join("data")).unwrap();
        std::fs::write(root.join("dashboard/data/kpi_summary.json"), "preferred").unwrap();
        std::fs::write(root.join("data/kpi_summary.json"), "fallback").unwrap();
        std::fs::write(root.join("data/product_data.json"), "only here").unwrap();

        let source = DirSource::new(root);
        assert_eq!(source.fetch(Resource::KpiSummary).await.unwrap(), "preferred");
        assert_eq!(source.fetch(Resource::ProductData).await.unwrap(), "only here");
        assert!(source.fetch(Resource::PlantPerformance).await.is_err());
    }
}

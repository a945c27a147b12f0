use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::source::{DataSource, Resource};
use crate::error::{DashboardError, Result};
use crate::models::{Dataset, Snapshot};

/// Fetch and decode one resource.
///
/// A body that is not JSON fails the load; records inside it that do not
/// match `T` are skipped by [`Dataset::from_value`].
pub async fn fetch_dataset<T: DeserializeOwned>(
    source: &dyn DataSource,
    resource: Resource,
) -> Result<Dataset<T>> {
    let body = source.fetch(resource).await?;
    let value: Value = serde_json::from_str(&body).map_err(|source| DashboardError::Decode {
        resource: resource.name().to_string(),
        source,
    })?;
    let dataset = Dataset::from_value(resource.name(), value);
    debug!(
        resource = resource.name(),
        records = dataset.records.len(),
        skipped = dataset.skipped,
        "Decoded"
    );
    Ok(dataset)
}

/// Fetch all five resources concurrently; the first failure aborts the load.
pub async fn load_snapshot(source: &dyn DataSource, generation: u64) -> Result<Snapshot> {
    let (daily, workstations, plant, products, kpi) = tokio::try_join!(
        fetch_dataset(source, Resource::DailyProduction),
        fetch_dataset(source, Resource::WorkstationPerformance),
        fetch_dataset(source, Resource::PlantPerformance),
        fetch_dataset(source, Resource::ProductData),
        fetch_dataset(source, Resource::KpiSummary),
    )?;

    let snapshot = Snapshot {
        generation,
        loaded_at: Utc::now(),
        daily,
        workstations,
        plant,
        products,
        kpi,
    };
    info!(
        generation,
        days = snapshot.daily.records.len(),
        workstations = snapshot.workstations.records.len(),
        runs = snapshot.plant.records.len(),
        products = snapshot.products.records.len(),
        "Snapshot loaded from {}",
        source.describe()
    );
    Ok(snapshot)
}

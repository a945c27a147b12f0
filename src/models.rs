use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// One calendar day of plant output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRecord {
    pub date: String,
    pub production: f64,
    pub faulty: f64,
    /// Downtime hours per workstation, index 0 is workstation 1
    #[serde(default)]
    pub workstation_downtime: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_downtime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_type: Option<String>,
}

/// Per-workstation performance for one simulation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkstationRecord {
    pub workstation: u8,
    pub downtime: f64,
    pub waiting_time: f64,
    pub active_time: f64,
    pub active_percentage: f64,
    pub waiting_percentage: f64,
    pub downtime_percentage: f64,
    pub failure_probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<u32>,
    #[serde(default)]
    pub is_bottleneck: bool,
    #[serde(default)]
    pub is_star_performer: bool,
}

/// Plant-level metrics for one simulation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantRecord {
    pub run: u32,
    pub supplier_occupancy: f64,
    pub bottleneck_delay: f64,
    pub total_production: f64,
    pub quality_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faulty_products: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_downtime: Option<f64>,
}

/// Output and quality of one product type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub product_type: String,
    pub production_count: f64,
    pub faulty_count: f64,
    pub quality_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<u32>,
}

/// Headline numbers shown as KPI cards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KpiSummary {
    pub avg_daily_production: f64,
    pub avg_quality_percentage: f64,
    pub avg_downtime_hours: f64,
    pub bottleneck_workstation: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_scenario: Option<String>,
}

/// Daily records summed over one period label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatedPeriod {
    pub period: String,
    pub production: f64,
    pub faulty: f64,
}

impl AggregatedPeriod {
    /// Share of good parts in percent, `None` when nothing was produced
    pub fn quality_percentage(&self) -> Option<f64> {
        if self.production > 0.0 {
            Some((self.production - self.faulty) / self.production * 100.0)
        } else {
            None
        }
    }
}

/// A decoded payload plus the bookkeeping needed by the freshness check
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dataset<T> {
    pub records: Vec<T>,
    /// Records dropped because a field was missing or malformed
    pub skipped: usize,
    /// `timestamp` carried by the first element, if any
    pub timestamp: Option<String>,
}

impl<T> Default for Dataset<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            timestamp: None,
        }
    }
}

impl<T> Dataset<T> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.records.first()
    }
}

impl<T: DeserializeOwned> Dataset<T> {
    /// Decode a payload that is either a bare object, or an array of objects.
    ///
    /// Elements that do not fit `T` are skipped and counted rather than
    /// failing the whole payload.
    pub fn from_value(resource: &str, value: Value) -> Self {
        let items = match value {
            Value::Array(items) => items,
            other => vec![other],
        };

        let timestamp = items
            .first()
            .and_then(|first| first.get("timestamp"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut records = Vec::with_capacity(items.len());
        let mut skipped = 0;
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<T>(item) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!(resource, index, error = %e, "Skipping malformed record");
                }
            }
        }

        Self {
            records,
            skipped,
            timestamp,
        }
    }
}

/// All five datasets from one successful load.
///
/// Immutable once built; a reload produces a new snapshot with a higher
/// `generation`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub daily: Dataset<DailyRecord>,
    pub workstations: Dataset<WorkstationRecord>,
    pub plant: Dataset<PlantRecord>,
    pub products: Dataset<ProductRecord>,
    pub kpi: Dataset<KpiSummary>,
}

impl Snapshot {
    pub fn kpi(&self) -> Option<&KpiSummary> {
        self.kpi.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_keeps_first_timestamp() {
        let value = json!([
            {"date": "2025-01-01", "production": 120, "faulty": 4,
             "workstation_downtime": [1.0, 2.0], "timestamp": "2025-03-01 10:00:00"},
            {"date": "2025-01-02", "production": 110, "faulty": 3,
             "workstation_downtime": [0.5, 1.5]}
        ]);
        let ds: Dataset<DailyRecord> = Dataset::from_value("daily_production", value);
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.skipped, 0);
        assert_eq!(ds.timestamp.as_deref(), Some("2025-03-01 10:00:00"));
        assert_eq!(ds.records[1].workstation_downtime, vec![0.5, 1.5]);
    }

    #[test]
    fn kpi_object_and_wrapped_object_both_decode() {
        let bare = json!({
            "avg_daily_production": 1180.5,
            "avg_quality_percentage": 93.2,
            "avg_downtime_hours": 7.5,
            "bottleneck_workstation": 4
        });
        let wrapped = Value::Array(vec![bare.clone()]);

        let a: Dataset<KpiSummary> = Dataset::from_value("kpi_summary", bare);
        let b: Dataset<KpiSummary> = Dataset::from_value("kpi_summary", wrapped);
        assert_eq!(a.records, b.records);
        assert_eq!(a.first().map(|k| k.bottleneck_workstation), Some(4));
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let value = json!([
            {"product_type": "Type A", "production_count": 500, "faulty_count": 20, "quality_rate": 96.0},
            {"product_type": "Type B", "production_count": "lots"},
            {"product_type": "Type C", "production_count": 300, "faulty_count": 30, "quality_rate": 90.0}
        ]);
        let ds: Dataset<ProductRecord> = Dataset::from_value("product_data", value);
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.skipped, 1);
        assert_eq!(ds.records[1].product_type, "Type C");
    }

    #[test]
    fn quality_of_empty_period_is_none() {
        let p = AggregatedPeriod { period: "2025-01".into(), production: 0.0, faulty: 0.0 };
        assert_eq!(p.quality_percentage(), None);
        let p = AggregatedPeriod { period: "2025-01".into(), production: 200.0, faulty: 10.0 };
        assert_eq!(p.quality_percentage(), Some(95.0));
    }
}

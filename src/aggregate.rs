//! Time-series bucketing of daily records
//!
//! Period labels sort lexicographically, which is not chronological once
//! week or quarter numbers reach two digits ("Week 10" < "Week 9").

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;
use crate::models::{AggregatedPeriod, DailyRecord};

/// Records shown when no aggregation is applied
pub const DAY_DISPLAY_CAP: usize = 30;

/// Bucket label used for records whose date cannot be parsed
pub const INVALID_DATE: &str = "Invalid Date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "quarter" => Ok(Granularity::Quarter),
            "year" => Ok(Granularity::Year),
            other => Err(DashboardError::InvalidControl(format!("time range '{}'", other))),
        }
    }
}

/// Parse the date formats the data files use: `YYYY-MM-DD`, with or without a time part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Label of the bucket `date` falls into.
pub fn period_label(date: &str, granularity: Granularity) -> String {
    let d = match (granularity, parse_date(date)) {
        (Granularity::Day, _) => return date.to_string(),
        (_, None) => return INVALID_DATE.to_string(),
        (_, Some(d)) => d,
    };

    match granularity {
        Granularity::Day => date.to_string(),
        // Week numbers restart every Jan 1, independent of ISO weeks.
        Granularity::Week => format!("Week {}", d.ordinal().div_ceil(7)),
        Granularity::Month => format!("{:04}-{:02}", d.year(), d.month()),
        Granularity::Quarter => format!("Q{} {:04}", (d.month() - 1) / 3 + 1, d.year()),
        Granularity::Year => format!("{:04}", d.year()),
    }
}

/// Group daily records into periods and sum production and faulty counts.
///
/// `Day` returns the first [`DAY_DISPLAY_CAP`] records in their original
/// order; every other granularity returns buckets sorted by label.
pub fn aggregate(records: &[DailyRecord], granularity: Granularity) -> Vec<AggregatedPeriod> {
    if granularity == Granularity::Day {
        return records
            .iter()
            .take(DAY_DISPLAY_CAP)
            .map(|r| AggregatedPeriod {
                period: r.date.clone(),
                production: r.production,
                faulty: r.faulty,
            })
            .collect();
    }

    let mut buckets: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for record in records {
        let entry = buckets
            .entry(period_label(&record.date, granularity))
            .or_insert((0.0, 0.0));
        entry.0 += record.production;
        entry.1 += record.faulty;
    }

    buckets
        .into_iter()
        .map(|(period, (production, faulty))| AggregatedPeriod {
            period,
            production,
            faulty,
        })
        .collect()
}

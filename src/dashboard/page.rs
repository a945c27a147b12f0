//! What the dashboard currently shows
//!
//! The page is plain data: the controller mutates it and publishes a copy
//! after every transition, the front-ends only read it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::source::Resource;
use crate::insights::{DOWNTIME_TARGET_HOURS, PRODUCTION_TARGET_PER_DAY, QUALITY_TARGET_PCT};
use crate::models::{KpiSummary, Snapshot};
use crate::render::{format_count, format_hours, format_pct, ChartId};
use crate::state::UiState;

pub const LOAD_ERROR_PLACEHOLDER: &str = "Unable to load data. Please try refreshing.";
pub const REFRESH_STATUS: &str = "Running simulation... This may take a few seconds.";

/// Oldest notifications are dropped beyond this many
pub const MAX_NOTIFICATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    SimulationRunning,
    Ready,
    ReadyWithError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotContent {
    Empty,
    Chart { svg: String },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub chart: ChartId,
    pub title: &'static str,
    pub content: SlotContent,
    pub insight: Option<String>,
    /// Snapshot generation the content was drawn from
    pub generation: u64,
}

impl Slot {
    fn empty(chart: ChartId) -> Self {
        Self {
            chart,
            title: chart.title(),
            content: SlotContent::Empty,
            insight: None,
            generation: 0,
        }
    }

    pub fn svg(&self) -> Option<&str> {
        match &self.content {
            SlotContent::Chart { svg } => Some(svg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    OnTarget,
    OffTarget,
    Neutral,
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiCard {
    pub label: &'static str,
    pub value: String,
    pub status: KpiStatus,
}

impl KpiCard {
    pub fn from_summary(kpi: &KpiSummary) -> Vec<KpiCard> {
        let against = |ok: bool| if ok { KpiStatus::OnTarget } else { KpiStatus::OffTarget };
        vec![
            KpiCard {
                label: "Avg Daily Production",
                value: format_count(kpi.avg_daily_production),
                status: against(kpi.avg_daily_production >= PRODUCTION_TARGET_PER_DAY),
            },
            KpiCard {
                label: "Avg Quality",
                value: format_pct(kpi.avg_quality_percentage),
                status: against(kpi.avg_quality_percentage >= QUALITY_TARGET_PCT),
            },
            KpiCard {
                label: "Avg Downtime",
                value: format_hours(kpi.avg_downtime_hours),
                status: against(kpi.avg_downtime_hours <= DOWNTIME_TARGET_HOURS),
            },
            KpiCard {
                label: "Bottleneck",
                value: format!("Workstation {}", kpi.bottleneck_workstation),
                status: KpiStatus::Neutral,
            },
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardPage {
    pub phase: Phase,
    pub slots: BTreeMap<ChartId, Slot>,
    pub kpi_cards: Vec<KpiCard>,
    pub headline: Option<String>,
    pub notifications: Vec<Notification>,
    /// Blocking status text shown while a simulation runs
    pub status_message: Option<String>,
    pub refresh_enabled: bool,
    pub state: UiState,
    pub generation: u64,
    /// Bumped on every published change
    pub revision: u64,
    pub last_redrawn: Vec<ChartId>,
    #[serde(skip)]
    next_notification: u64,
}

impl Default for DashboardPage {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            slots: ChartId::ALL.into_iter().map(|id| (id, Slot::empty(id))).collect(),
            kpi_cards: Vec::new(),
            headline: None,
            notifications: Vec::new(),
            status_message: None,
            refresh_enabled: true,
            state: UiState::default(),
            generation: 0,
            revision: 0,
            last_redrawn: Vec::new(),
            next_notification: 1,
        }
    }
}

impl DashboardPage {
    pub fn slot(&self, chart: ChartId) -> Option<&Slot> {
        self.slots.get(&chart)
    }

    pub fn slot_mut(&mut self, chart: ChartId) -> &mut Slot {
        self.slots.entry(chart).or_insert_with(|| Slot::empty(chart))
    }

    /// Push a notification and return its id.
    pub fn notify(&mut self, level: Level, message: impl Into<String>) -> u64 {
        let id = self.next_notification;
        self.next_notification += 1;
        self.notifications.push(Notification {
            id,
            level,
            message: message.into(),
        });
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
        id
    }

    /// Remove a notification. Returns false for unknown or already dismissed ids.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    pub fn active_notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn active_error_count(&self) -> usize {
        self.active_notifications().filter(|n| n.level == Level::Error).count()
    }

    /// Replace every chart with the load error placeholder.
    pub fn set_error_all(&mut self) {
        for slot in self.slots.values_mut() {
            slot.content = SlotContent::Error {
                message: LOAD_ERROR_PLACEHOLDER.to_string(),
            };
            slot.insight = None;
        }
        self.kpi_cards.clear();
        self.headline = None;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceFreshness {
    pub resource: &'static str,
    /// `timestamp` of the first record, as written by the backend
    pub timestamp: Option<String>,
    pub records: usize,
    pub skipped: usize,
}

/// Debug view of when each dataset in the committed snapshot was produced
#[derive(Debug, Clone, Serialize)]
pub struct FreshnessReport {
    pub generation: u64,
    pub loaded_at: Option<DateTime<Utc>>,
    pub resources: Vec<ResourceFreshness>,
}

impl FreshnessReport {
    pub fn empty() -> Self {
        Self {
            generation: 0,
            loaded_at: None,
            resources: Vec::new(),
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let entry = |resource: Resource, timestamp: &Option<String>, records, skipped| {
            ResourceFreshness {
                resource: resource.name(),
                timestamp: timestamp.clone(),
                records,
                skipped,
            }
        };
        Self {
            generation: snapshot.generation,
            loaded_at: Some(snapshot.loaded_at),
            resources: vec![
                entry(
                    Resource::DailyProduction,
                    &snapshot.daily.timestamp,
                    snapshot.daily.records.len(),
                    snapshot.daily.skipped,
                ),
                entry(
                    Resource::WorkstationPerformance,
                    &snapshot.workstations.timestamp,
                    snapshot.workstations.records.len(),
                    snapshot.workstations.skipped,
                ),
                entry(
                    Resource::PlantPerformance,
                    &snapshot.plant.timestamp,
                    snapshot.plant.records.len(),
                    snapshot.plant.skipped,
                ),
                entry(
                    Resource::ProductData,
                    &snapshot.products.timestamp,
                    snapshot.products.records.len(),
                    snapshot.products.skipped,
                ),
                entry(
                    Resource::KpiSummary,
                    &snapshot.kpi.timestamp,
                    snapshot.kpi.records.len(),
                    snapshot.kpi.skipped,
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_page_has_an_empty_slot_per_chart() {
        let page = DashboardPage::default();
        assert_eq!(page.slots.len(), ChartId::ALL.len());
        assert!(page.slots.values().all(|s| s.content == SlotContent::Empty));
        assert!(page.refresh_enabled);
        assert_eq!(page.phase, Phase::Idle);
    }

    #[test]
    fn notifications_get_unique_ids_and_dismiss_once() {
        let mut page = DashboardPage::default();
        let a = page.notify(Level::Error, "first");
        let b = page.notify(Level::Info, "second");
        assert_ne!(a, b);
        assert_eq!(page.active_error_count(), 1);
        assert!(page.dismiss(a));
        assert!(!page.dismiss(a));
        assert!(!page.dismiss(999));
        assert_eq!(page.active_error_count(), 0);
        assert_eq!(page.active_notifications().count(), 1);
        assert_eq!(page.notifications.len(), 1);
    }

    #[test]
    fn notification_list_is_bounded() {
        let mut page = DashboardPage::default();
        let ids: Vec<u64> = (0..MAX_NOTIFICATIONS + 5)
            .map(|i| page.notify(Level::Error, format!("failure {}", i)))
            .collect();
        assert_eq!(page.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(page.notifications[0].id, ids[5]);
        assert!(!page.dismiss(ids[0]));
        assert!(page.dismiss(ids[MAX_NOTIFICATIONS + 4]));
        assert_eq!(page.notifications.len(), MAX_NOTIFICATIONS - 1);
    }

    #[test]
    fn error_all_replaces_every_slot() {
        let mut page = DashboardPage::default();
        page.slot_mut(ChartId::ProductMix).content = SlotContent::Chart { svg: "<svg/>".into() };
        page.slot_mut(ChartId::ProductMix).insight = Some("text".into());
        page.set_error_all();
        for slot in page.slots.values() {
            assert_eq!(
                slot.content,
                SlotContent::Error { message: LOAD_ERROR_PLACEHOLDER.to_string() }
            );
            assert!(slot.insight.is_none());
        }
    }

    #[test]
    fn kpi_cards_compare_against_targets() {
        let cards = KpiCard::from_summary(&KpiSummary {
            avg_daily_production: 1250.0,
            avg_quality_percentage: 93.0,
            avg_downtime_hours: 6.0,
            bottleneck_workstation: 3,
            performance_scenario: None,
        });
        let statuses: Vec<KpiStatus> = cards.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![KpiStatus::OnTarget, KpiStatus::OffTarget, KpiStatus::OnTarget, KpiStatus::Neutral]
        );
        assert_eq!(cards[0].value, "1,250");
        assert_eq!(cards[3].value, "Workstation 3");
    }

    #[test]
    fn page_serialises_slots_by_chart_name() {
        let page = DashboardPage::default();
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["slots"]["product_mix"]["content"]["kind"], "empty");
        assert_eq!(json["phase"], "idle");
        assert!(json.get("next_notification").is_none());
    }
}

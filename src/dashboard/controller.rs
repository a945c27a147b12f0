use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::loader::load_snapshot;
use super::page::{
    DashboardPage, FreshnessReport, KpiCard, Level, Phase, SlotContent, REFRESH_STATUS,
};
use super::source::DataSource;
use crate::error::Result;
use crate::insights::{insight_for, kpi_headline};
use crate::models::Snapshot;
use crate::render::surface::SvgSurface;
use crate::render::{default_renderers, ChartId, ChartRenderer, RenderOutcome};
use crate::state::{ControlEvent, UiState};

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Pause between a finished simulation and the reload
    pub settle_delay: Duration,
    pub chart_width: f64,
    pub chart_height: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            chart_width: 640.0,
            chart_height: 320.0,
        }
    }
}

/// Owns the UI state, the committed snapshot and the page.
///
/// Operations take `&mut self`, so a load, a control event and a refresh
/// never interleave on one controller. Every transition publishes a fresh
/// copy of the page to subscribers.
pub struct DashboardController {
    source: Arc<dyn DataSource>,
    config: ControllerConfig,
    renderers: Vec<Box<dyn ChartRenderer>>,
    state: UiState,
    snapshot: Option<Arc<Snapshot>>,
    page: DashboardPage,
    next_generation: u64,
    page_tx: watch::Sender<Arc<DashboardPage>>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
}

impl DashboardController {
    pub fn new(source: Arc<dyn DataSource>, config: ControllerConfig) -> Self {
        let page = DashboardPage::default();
        let (page_tx, _) = watch::channel(Arc::new(page.clone()));
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            source,
            config,
            renderers: default_renderers(),
            state: UiState::default(),
            snapshot: None,
            page,
            next_generation: 1,
            page_tx,
            snapshot_tx,
        }
    }

    pub fn page(&self) -> &DashboardPage {
        &self.page
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.page.phase
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardPage>> {
        self.page_tx.subscribe()
    }

    /// Committed snapshots, `None` after a failed load.
    pub fn subscribe_snapshot(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.snapshot_tx.subscribe()
    }

    /// Fetch all datasets and redraw the whole page.
    ///
    /// Failures are not returned: every slot shows the error placeholder and
    /// one error notification is raised.
    pub async fn load(&mut self) {
        self.page.phase = Phase::Loading;
        self.publish(Vec::new());

        let generation = self.next_generation;
        match load_snapshot(self.source.as_ref(), generation).await {
            Ok(snapshot) => {
                self.next_generation += 1;
                let snapshot = Arc::new(snapshot);
                self.commit(Some(snapshot.clone()));

                for chart in ChartId::ALL {
                    self.render_chart(&snapshot, chart);
                }
                self.page.kpi_cards = snapshot
                    .kpi()
                    .map(KpiCard::from_summary)
                    .unwrap_or_default();
                self.page.headline = kpi_headline(&snapshot);
                self.page.generation = generation;
                self.page.phase = Phase::Ready;
                info!(generation, "Dashboard ready");
            }
            Err(e) => {
                error!(error = %e, "Failed to load dashboard data");
                self.commit(None);
                self.page.set_error_all();
                self.page.notify(Level::Error, format!("Error loading data: {}", e));
                self.page.phase = Phase::ReadyWithError;
            }
        }
        self.publish(ChartId::ALL.to_vec());
    }

    /// Apply a control change and redraw the charts that read it.
    ///
    /// Returns the redrawn charts; empty when nothing is loaded yet.
    pub fn apply(&mut self, event: ControlEvent) -> Result<Vec<ChartId>> {
        self.state.apply(event)?;
        debug!(?event, "Control changed");

        let redrawn = match self.snapshot.clone() {
            Some(snapshot) => {
                let affected = event.affected().to_vec();
                for chart in &affected {
                    self.render_chart(&snapshot, *chart);
                }
                affected
            }
            None => Vec::new(),
        };
        self.publish(redrawn.clone());
        Ok(redrawn)
    }

    /// Run a new simulation on the backend, then reload.
    ///
    /// The refresh control is re-enabled and the status cleared even when
    /// the returned future is dropped before it completes.
    pub async fn refresh(&mut self) {
        let previous = self.page.phase;
        self.page.refresh_enabled = false;
        self.page.status_message = Some(REFRESH_STATUS.to_string());
        self.page.phase = Phase::SimulationRunning;
        self.publish(Vec::new());
        info!("Running simulation via {}", self.source.describe());

        let mut guard = RefreshGuard {
            controller: self,
            finished: false,
        };
        let controller = &mut *guard.controller;
        match controller.source.run_simulation().await {
            Ok(_) => {
                let delay = controller.config.settle_delay;
                debug!(
                    delay_ms = delay.as_millis() as u64,
                    "Simulation finished, waiting for data files"
                );
                tokio::time::sleep(delay).await;
                controller.load().await;
            }
            Err(e) => {
                error!(error = %e, "Simulation failed");
                controller
                    .page
                    .notify(Level::Error, format!("Error running simulation: {}", e));
                controller.page.phase = match previous {
                    Phase::Idle | Phase::Loading | Phase::SimulationRunning => {
                        Phase::ReadyWithError
                    }
                    other => other,
                };
            }
        }
        guard.finished = true;
    }

    pub fn dismiss(&mut self, notification_id: u64) -> bool {
        let dismissed = self.page.dismiss(notification_id);
        if dismissed {
            self.publish(Vec::new());
        } else {
            warn!(notification_id, "No active notification to dismiss");
        }
        dismissed
    }

    pub fn freshness(&self) -> FreshnessReport {
        match &self.snapshot {
            Some(snapshot) => FreshnessReport::from_snapshot(snapshot),
            None => FreshnessReport::empty(),
        }
    }

    fn render_chart(&mut self, snapshot: &Snapshot, chart: ChartId) {
        let Some(renderer) = self.renderers.iter().find(|r| r.id() == chart) else {
            return;
        };
        let mut surface = SvgSurface::new(
            self.config.chart_width,
            self.config.chart_height,
            &format!("chart-{}", chart),
        );
        let content = match renderer.render(snapshot, &self.state, &mut surface) {
            RenderOutcome::Drawn => SlotContent::Chart { svg: surface.finish() },
            RenderOutcome::Skipped => {
                debug!(chart = %chart, "Nothing to draw");
                SlotContent::Empty
            }
        };
        let insight = insight_for(chart, snapshot, &self.state);

        let slot = self.page.slot_mut(chart);
        slot.content = content;
        slot.insight = insight;
        slot.generation = snapshot.generation;
    }

    fn commit(&mut self, snapshot: Option<Arc<Snapshot>>) {
        self.snapshot = snapshot.clone();
        self.snapshot_tx.send_replace(snapshot);
    }

    fn publish(&mut self, redrawn: Vec<ChartId>) {
        self.page.revision += 1;
        self.page.state = self.state;
        self.page.last_redrawn = redrawn;
        self.page_tx.send_replace(Arc::new(self.page.clone()));
    }
}

/// Gives the refresh control back when a refresh ends or is abandoned.
struct RefreshGuard<'a> {
    controller: &'a mut DashboardController,
    finished: bool,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        let controller = &mut *self.controller;
        if !self.finished {
            warn!("Refresh abandoned before it finished");
            controller.page.phase = if controller.snapshot.is_some() {
                Phase::Ready
            } else {
                Phase::ReadyWithError
            };
        }
        controller.page.refresh_enabled = true;
        controller.page.status_message = None;
        controller.publish(Vec::new());
    }
}

//! REST handlers for the dashboard
//!
//! Reads are served from the latest published page; anything that changes
//! the dashboard goes through the controller lock.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio::sync::{watch, Mutex};
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::shell;
use crate::dashboard::{DashboardController, DashboardPage, FreshnessReport, Phase, SlotContent};
use crate::models::Snapshot;
use crate::render::ChartId;
use crate::state::ControlEvent;

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Mutex<DashboardController>>,
    pub pages: watch::Receiver<Arc<DashboardPage>>,
    pub snapshots: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl AppState {
    pub fn new(controller: DashboardController) -> Self {
        let pages = controller.subscribe();
        let snapshots = controller.subscribe_snapshot();
        Self {
            controller: Arc::new(Mutex::new(controller)),
            pages,
            snapshots,
        }
    }

    fn current_page(&self) -> Arc<DashboardPage> {
        self.pages.borrow().clone()
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct DismissResponse {
    pub dismissed: u64,
}

/// Payload of one SSE `page` event
#[derive(Serialize)]
pub struct PageEvent {
    pub revision: u64,
    pub generation: u64,
    pub phase: Phase,
    pub redrawn: Vec<ChartId>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into() }))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(shell::render(&state.current_page()))
}

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/page
pub async fn get_page(State(state): State<AppState>) -> Json<DashboardPage> {
    Json(state.current_page().as_ref().clone())
}

/// GET /api/v1/charts/:id
pub async fn get_chart(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let chart: ChartId = match id.parse() {
        Ok(chart) => chart,
        Err(_) => {
            return api_error(StatusCode::NOT_FOUND, format!("Unknown chart: {}", id))
                .into_response()
        }
    };

    let page = state.current_page();
    match page.slot(chart).map(|slot| &slot.content) {
        Some(SlotContent::Chart { svg }) => (
            [(header::CONTENT_TYPE, "image/svg+xml"), (header::CACHE_CONTROL, "no-cache")],
            svg.clone(),
        )
            .into_response(),
        Some(SlotContent::Error { message }) => {
            (StatusCode::SERVICE_UNAVAILABLE, message.clone()).into_response()
        }
        _ => (StatusCode::SERVICE_UNAVAILABLE, "No data to display").into_response(),
    }
}

/// POST /api/v1/controls
pub async fn post_controls(
    State(state): State<AppState>,
    Json(event): Json<ControlEvent>,
) -> Result<Json<DashboardPage>, ApiError> {
    let mut controller = state.controller.lock().await;
    controller
        .apply(event)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(controller.page().clone()))
}

/// POST /api/v1/refresh
///
/// The refresh runs in its own task, so a client that disconnects does not
/// cut it short.
pub async fn post_refresh(State(state): State<AppState>) -> Result<Json<DashboardPage>, ApiError> {
    let controller = state.controller.clone();
    let task = tokio::spawn(async move {
        let mut controller = controller.lock_owned().await;
        controller.refresh().await;
        controller.page().clone()
    });
    task.await.map(Json).map_err(|e| {
        error!(error = %e, "Refresh task failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "refresh task failed")
    })
}

/// POST /api/v1/notifications/:id/dismiss
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DismissResponse>, ApiError> {
    let mut controller = state.controller.lock().await;
    if controller.dismiss(id) {
        Ok(Json(DismissResponse { dismissed: id }))
    } else {
        Err(api_error(StatusCode::NOT_FOUND, format!("No active notification {}", id)))
    }
}

/// GET /api/v1/debug/freshness
pub async fn get_freshness(State(state): State<AppState>) -> Json<FreshnessReport> {
    let report = match state.snapshots.borrow().as_deref() {
        Some(snapshot) => FreshnessReport::from_snapshot(snapshot),
        None => FreshnessReport::empty(),
    };
    info!(generation = report.generation, "Freshness check");
    Json(report)
}

/// GET /api/v1/events
///
/// Only pages published after the client connected are sent.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut pages = state.pages.clone();
    pages.borrow_and_update();
    let stream = WatchStream::from_changes(pages)
        .filter(|page| !page.last_redrawn.is_empty())
        .map(|page| {
            let payload = PageEvent {
                revision: page.revision,
                generation: page.generation,
                phase: page.phase,
                redrawn: page.last_redrawn.clone(),
            };
            Ok(Event::default()
                .event("page")
                .json_data(payload)
                .unwrap_or_else(|_| Event::default().event("page")))
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/v1/health", get(health))
        .route("/api/v1/page", get(get_page))
        .route("/api/v1/charts/:id", get(get_chart))
        .route("/api/v1/controls", post(post_controls))
        .route("/api/v1/refresh", post(post_refresh))
        .route("/api/v1/notifications/:id/dismiss", post(dismiss_notification))
        .route("/api/v1/debug/freshness", get(get_freshness))
        .route("/api/v1/events", get(events))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

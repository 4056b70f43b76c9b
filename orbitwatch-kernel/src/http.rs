/**
 * API REST ORBITWATCH - Serveur HTTP du kernel
 *
 * RÔLE :
 * Expose les deux commandes utilisateur ("ajouter un satellite", "exécuter
 * l'action") et les vues lecture (registre, alertes, journal, scène).
 *
 * FONCTIONNEMENT :
 * - Serveur Axum, sérialisation JSON des réponses
 * - /scene/stream : flux SSE, un événement par changement d'état
 * - Saisie invalide => 422, ressource inconnue => 404
 *
 * SÉCURITÉ :
 * - Si ORBITWATCH_API_KEY est défini, header x-api-key obligatoire sauf /health
 * - Sinon API ouverte (démo mono-utilisateur)
 */

use crate::alerts::ExecuteOutcome;
use crate::events::DashboardEvent;
use crate::hazards::HazardScheduler;
use crate::health::{HealthTracker, KernelHealth};
use crate::models::{Alert, AlertId, LogEntry, Satellite, SatelliteId, SatelliteInput};
use crate::scene::SceneFrame;
use crate::state::SharedDashboard;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: SharedDashboard,
    pub hazards: HazardScheduler,
    pub health: HealthTracker,
    pub api_key: Option<String>,
}

async fn require_api_key(State(app): State<AppState>, req: Request, next: Next) -> Result<Response, StatusCode> {
    let Some(expected) = app.api_key.as_deref() else {
        return Ok(next.run(req).await);
    };

    // Health check toujours accessible
    if req.uri().path().starts_with("/health") {
        return Ok(next.run(req).await);
    }

    let ok = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);

    if !ok {
        tracing::warn!(path = %req.uri().path(), "rejected request without valid api key");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/satellites", get(list_satellites).post(add_satellite))
        .route("/satellites/{id}", get(get_satellite))
        .route("/satellites/{id}/evaluation", delete(cancel_evaluation))
        .route("/alerts", get(list_alerts))
        .route("/alerts/{id}/execute", post(execute_action))
        .route("/log", get(get_log))
        .route("/scene", get(get_scene))
        .route("/scene/stream", get(scene_stream))
        .layer(middleware::from_fn_with_state(app_state.clone(), require_api_key))
        .with_state(app_state)
}

// GET /system/health
async fn get_system_health(State(app): State<AppState>) -> Json<KernelHealth> {
    Json(app.health.get_health(&app.dashboard, &app.hazards))
}

// GET /satellites (ordre d'insertion)
async fn list_satellites(State(app): State<AppState>) -> Json<Vec<Satellite>> {
    Json(app.dashboard.lock().satellites())
}

// POST /satellites
async fn add_satellite(State(app): State<AppState>, Json(input): Json<SatelliteInput>) -> Response {
    match app.hazards.add_satellite(&input) {
        Ok(satellite) => (StatusCode::CREATED, Json(satellite)).into_response(),
        Err(e) => {
            tracing::debug!("satellite rejected: {e}");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

// GET /satellites/{id}
async fn get_satellite(State(app): State<AppState>, Path(id): Path<u64>) -> Result<Json<Satellite>, StatusCode> {
    app.dashboard
        .lock()
        .satellite(SatelliteId(id))
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

// DELETE /satellites/{id}/evaluation
async fn cancel_evaluation(State(app): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    if app.hazards.cancel(SatelliteId(id)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// GET /alerts (alertes actives)
async fn list_alerts(State(app): State<AppState>) -> Json<Vec<Alert>> {
    Json(app.dashboard.lock().active_alerts())
}

// POST /alerts/{id}/execute
async fn execute_action(State(app): State<AppState>, Path(id): Path<Uuid>) -> Json<ExecuteOutcome> {
    Json(app.dashboard.lock().execute_action(AlertId(id)))
}

// GET /log
async fn get_log(State(app): State<AppState>) -> Json<Vec<LogEntry>> {
    Json(app.dashboard.lock().execution_log())
}

// GET /scene
async fn get_scene(State(app): State<AppState>) -> Json<SceneFrame> {
    Json(app.dashboard.lock().scene())
}

// GET /scene/stream (SSE)
async fn scene_stream(State(app): State<AppState>) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = app.dashboard.lock().events().subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((Ok(to_sse(&event)), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "sse subscriber lagging");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse(event: &DashboardEvent) -> SseEvent {
    SseEvent::default()
        .event(event.name())
        .json_data(event)
        .unwrap_or_else(|e| SseEvent::default().comment(format!("serialization failed: {e}")))
}

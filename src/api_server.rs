// Axum API Server Module
//
// Purpose: REST presentation layer over the survival planner. Prediction
// previews are stateless; recorded predictions go into a per-session,
// append-only history kept in an expiring Moka cache.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::artifacts::ModelArtifacts;
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::history::SessionHistory;
use crate::planner::{Prediction, PlantingWindows, SurvivalPlanner};
use crate::types::{
    MycoType, PlantationInput, SoilChoice, Species, CENSUS_RANGE, LIGHT_RANGE, MONTH_RANGE,
};

// ============================================================================
// Application State
// ============================================================================

type SharedHistory = Arc<Mutex<SessionHistory>>;

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<SurvivalPlanner>,
    /// session id → that session's history
    pub sessions: Cache<String, SharedHistory>,
}

impl AppState {
    pub fn new(config: &PlannerConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading model artifacts...");
        let artifacts = ModelArtifacts::load(&config.model_dir)?;
        let planner = SurvivalPlanner::from_artifacts(artifacts)?;

        Ok(Self::with_planner(
            planner,
            Duration::from_secs(config.session_ttl_secs),
            config.max_sessions,
        ))
    }

    pub fn with_planner(planner: SurvivalPlanner, session_ttl: Duration, max_sessions: u64) -> Self {
        tracing::info!("Initializing session cache (ttl={:?}, capacity={})", session_ttl, max_sessions);
        let sessions = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(session_ttl)
            .build();

        Self {
            planner: Arc::new(planner),
            sessions,
        }
    }

    async fn session(&self, session_id: &str) -> Result<SharedHistory, AppError> {
        self.sessions
            .get(session_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Unknown session: {}", session_id)))
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Input choices and slider ranges
        .route("/api/options", get(get_options))

        // Stateless predictions
        .route("/api/predict", post(predict_preview))
        .route("/api/planting-windows", post(planting_windows))

        // Session history
        .route("/api/sessions/:id/predictions", post(record_prediction))
        .route("/api/sessions/:id/history", get(get_history))
        .route("/api/sessions/:id/dashboard", get(get_dashboard))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_options() -> impl IntoResponse {
    let defaults = PlantationInput::default();

    Json(serde_json::json!({
        "species": Species::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        "soil": SoilChoice::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        "myco_type": MycoType::ALL.iter().map(|m| m.as_str()).collect::<Vec<_>>(),
        "light": {"min": LIGHT_RANGE.0, "max": LIGHT_RANGE.1},
        "month": {"min": MONTH_RANGE.0, "max": MONTH_RANGE.1},
        "census": {"min": CENSUS_RANGE.0, "max": CENSUS_RANGE.1},
        "emf": {"min": 0.0, "max": 100.0},
        "defaults": defaults,
    }))
}

async fn predict_preview(
    State(state): State<AppState>,
    Json(input): Json<PlantationInput>,
) -> Result<Json<Prediction>, AppError> {
    let prediction = state.planner.predict(&input)?;
    Ok(Json(prediction))
}

async fn planting_windows(
    State(state): State<AppState>,
    Json(input): Json<PlantationInput>,
) -> Result<Json<PlantingWindows>, AppError> {
    // CPU-bound work: run in blocking thread pool
    let planner = state.planner.clone();

    let windows = tokio::task::spawn_blocking(move || planner.planting_windows(&input))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    Ok(Json(windows))
}

async fn record_prediction(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(input): Json<PlantationInput>,
) -> Result<Json<Prediction>, AppError> {
    // Predict first so a failure never touches the history
    let prediction = state.planner.predict(&input)?;

    let history = state
        .sessions
        .get_with(session_id.clone(), async { Arc::new(Mutex::new(SessionHistory::new())) })
        .await;

    let count = {
        let mut guard = history
            .lock()
            .map_err(|_| AppError::Internal("Session history lock poisoned".to_string()))?;
        guard.append(prediction.to_record());
        guard.len()
    };

    tracing::info!(
        "Session {}: recorded prediction #{} ({} risk)",
        session_id,
        count,
        prediction.risk.as_str()
    );

    Ok(Json(prediction))
}

async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let history = state.session(&session_id).await?;
    let guard = history
        .lock()
        .map_err(|_| AppError::Internal("Session history lock poisoned".to_string()))?;

    Ok(Json(serde_json::json!({
        "session_id": session_id,
        "count": guard.len(),
        "records": guard.records(),
    })))
}

async fn get_dashboard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let history = state.session(&session_id).await?;
    let summary = history
        .lock()
        .map_err(|_| AppError::Internal("Session history lock poisoned".to_string()))?
        .summary();

    let response = match summary {
        Some(summary) => serde_json::json!({
            "session_id": session_id,
            "summary": summary,
        }),
        None => serde_json::json!({
            "session_id": session_id,
            "summary": null,
            "message": "Run predictions to populate the dashboard.",
        }),
    };

    Ok(Json(response))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<PlannerError> for AppError {
    fn from(err: PlannerError) -> Self {
        if err.is_user_error() {
            AppError::BadRequest(err.to_string())
        } else {
            tracing::error!("Prediction failed: {}", err);
            AppError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

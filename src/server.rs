use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::adapter::{AllocationAdapter, AllocationError, ErrorKind};
use crate::config::Config;
use crate::estimates::TripEstimate;
use crate::types::{AllocationRequest, AllocationResult};

#[derive(Clone)]
struct ApiState {
    adapter: Arc<AllocationAdapter>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    kind: ErrorKind,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    kind: ErrorKind,
    message: String,
}

impl From<AllocationError> for ApiError {
    fn from(error: AllocationError) -> Self {
        let kind = error.kind();
        let status = match kind {
            ErrorKind::Validation | ErrorKind::OptimizationFailed => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Connectivity | ErrorKind::Service | ErrorKind::MalformedResponse => {
                StatusCode::BAD_GATEWAY
            }
        };
        Self {
            status,
            kind,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            kind: self.kind,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct EstimateRequest {
    distancias_km: Vec<f64>,
}

pub fn router(adapter: Arc<AllocationAdapter>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/alocacao", post(allocate))
        .route("/api/estimativas", post(estimates))
        .layer(cors)
        .with_state(ApiState { adapter })
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let adapter = AllocationAdapter::from_config(&config.service)
        .context("failed building optimizer HTTP client")?;
    let app = router(Arc::new(adapter));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed binding {bind}"))?;
    info!("allocation API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        endpoint: state.adapter.endpoint().to_string(),
    })
}

async fn allocate(
    State(state): State<ApiState>,
    Json(request): Json<AllocationRequest>,
) -> Result<Json<AllocationResult>, ApiError> {
    let result = state
        .adapter
        .find_best_allocation(&request.patient, &request.candidates)
        .await?;
    Ok(Json(result))
}

async fn estimates(Json(request): Json<EstimateRequest>) -> Json<ApiResponse<Vec<TripEstimate>>> {
    let data = request
        .distancias_km
        .into_iter()
        .map(TripEstimate::for_distance)
        .collect();
    Json(ApiResponse { ok: true, data })
}

pub mod error;

use std::any::Any;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    config::QueryConfig,
    engine::{DedupPolicy, PeakQueryEngine, PeakResult},
};
pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub engine: PeakQueryEngine,
    pub query: QueryConfig,
}

impl AppState {
    pub fn new(engine: PeakQueryEngine, query: QueryConfig) -> Self {
        Self { engine, query }
    }
}

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(slogan))
        .route("/health", get(health))
        .route("/peaks", get(get_peaks))
        .with_state(state);
    with_layers(routes)
}

fn with_layers(routes: Router) -> Router {
    routes
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

/// Turns a handler panic into the generic `InternalError` body; the panic
/// message is only logged.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

async fn slogan() -> Json<Value> {
    Json(json!({ "slogan": "Better Energy, More Cash." }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct PeaksParams {
    pub market_name: Option<String>,
    pub k: Option<usize>,
    pub dedup: Option<String>,
}

/// GET /peaks?market_name=spp[&k=5][&dedup=raw|daily-max]
///
/// Highest usage readings for a market, largest first.
async fn get_peaks(
    State(state): State<AppState>,
    params: Result<Query<PeaksParams>, QueryRejection>,
) -> Result<Json<PeakResult>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidParameter(e.body_text()))?;

    let market_name = params
        .market_name
        .ok_or(ApiError::MissingParameter("market_name"))?;

    let k = params.k.unwrap_or(state.query.default_k);
    if k > state.query.max_k {
        return Err(ApiError::InvalidParameter(format!(
            "k must be at most {}",
            state.query.max_k
        )));
    }

    let policy = match params.dedup.as_deref() {
        Some(raw) => raw.parse::<DedupPolicy>().map_err(ApiError::InvalidParameter)?,
        None => state.query.default_dedup,
    };

    let peaks = state.engine.get_top_k_peaks(&market_name, k, policy).await?;
    Ok(Json(peaks))
}

// Seafood Export Cost Calculator - Web Server
// JSON API over one operator session held in memory

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use seafood_cost::{
    logging, AppConfig, CostError, QualityEngine, Session, ValidationError, ValidationKind,
    VariableName, VERSION,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Shared application state: a single session per server process
#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Session>>,
}

impl AppState {
    fn session(&self) -> MutexGuard<'_, Session> {
        // Mutations are single store calls, so a poisoned lock still holds consistent data
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(message),
    };
    (status, Json(body)).into_response()
}

fn cost_error_status(err: &CostError) -> StatusCode {
    match err.root() {
        CostError::NotFound { .. } => StatusCode::NOT_FOUND,
        CostError::Configuration { .. } | CostError::Division { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CostError::Validation(e) => validation_status(e),
        CostError::ProductFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn validation_status(err: &ValidationError) -> StatusCode {
    match err.kind {
        ValidationKind::Duplicate => StatusCode::CONFLICT,
        ValidationKind::Missing => StatusCode::NOT_FOUND,
        ValidationKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn cost_error_response(err: CostError) -> Response {
    warn!("calculation failed: {}", err);
    error_response(cost_error_status(&err), err.to_string())
}

/// Breakdown line (labels in render order)
#[derive(Serialize)]
struct BreakdownLineResponse {
    label: &'static str,
    value: f64,
}

#[derive(Serialize)]
struct CostResponse {
    product: String,
    final_cost_usd: f64,
    matched_sizes: usize,
    breakdown: Vec<BreakdownLineResponse>,
}

#[derive(Serialize)]
struct VariableResponse {
    name: &'static str,
    display: String,
    value: f64,
}

#[derive(Deserialize)]
struct NewRateRequest {
    size: u32,
    rate: f64,
}

#[derive(Deserialize)]
struct VariableRequest {
    value: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/products
async fn get_products(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session();
    Json(ApiResponse::ok(session.catalog.clone()))
}

/// GET /api/rates
async fn get_rates(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session();
    Json(ApiResponse::ok(session.rates.clone()))
}

/// GET /api/variables
async fn get_variables(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session();
    let response: Vec<VariableResponse> = session
        .variables
        .iter()
        .map(|(name, value)| VariableResponse {
            name: name.as_str(),
            display: value.display(),
            value: value.amount,
        })
        .collect();
    Json(ApiResponse::ok(response))
}

/// GET /api/quality - Data quality report
async fn get_quality(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session();
    Json(ApiResponse::ok(QualityEngine::new().check(&session)))
}

/// GET /api/costs - Cost table for all products
async fn get_costs(State(state): State<AppState>) -> Response {
    let session = state.session();
    match session.compute_all() {
        Ok(table) => (StatusCode::OK, Json(ApiResponse::ok(table))).into_response(),
        Err(e) => cost_error_response(e),
    }
}

/// GET /api/costs/:product - Breakdown for one product
async fn get_product_cost(State(state): State<AppState>, Path(product): Path<String>) -> Response {
    // Path<String> arrives percent-decoded
    let session = state.session();
    match session.compute_cost(&product) {
        Ok(b) => {
            let breakdown = b
                .lines()
                .iter()
                .map(|(label, value)| BreakdownLineResponse {
                    label: label.as_str(),
                    value: *value,
                })
                .collect();
            let response = CostResponse {
                product: b.product.clone(),
                final_cost_usd: b.final_cost_usd,
                matched_sizes: b.matched_sizes,
                breakdown,
            };
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => cost_error_response(e),
    }
}

/// POST /api/rates - Add a rate for a new size
async fn add_rate(State(state): State<AppState>, Json(req): Json<NewRateRequest>) -> Response {
    let mut session = state.session();
    match session.add_rate(req.size, req.rate) {
        Ok(()) => (StatusCode::CREATED, Json(ApiResponse::ok(session.rates.clone()))).into_response(),
        Err(e) => error_response(validation_status(&e), e.to_string()),
    }
}

/// PUT /api/variables/:name - Set a variable from its display form
async fn set_variable(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<VariableRequest>,
) -> Response {
    let Some(variable) = VariableName::from_label(&name) else {
        return error_response(StatusCode::NOT_FOUND, format!("Unknown variable: {}", name));
    };

    let mut session = state.session();
    match session.set_variable(variable, &req.value) {
        Ok(value) => {
            let response = VariableResponse {
                name: variable.as_str(),
                display: value.display(),
                value: value.amount,
            };
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    }
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/products", get(get_products))
        .route("/rates", get(get_rates).post(add_rate))
        .route("/variables", get(get_variables))
        .route("/variables/:name", put(set_variable))
        .route("/quality", get(get_quality))
        .route("/costs", get(get_costs))
        .route("/costs/:product", get(get_product_cost))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("info");

    let config = AppConfig::from_env();
    let session = Session::load(&config)?;
    info!(
        version = VERSION,
        products = session.catalog.len(),
        rates = session.rates.len(),
        "session ready"
    );

    let state = AppState {
        session: Arc::new(Mutex::new(session)),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .map_err(|e| {
            error!(addr = %config.server_addr, "failed to bind: {}", e);
            e
        })?;

    info!("server running on http://{}", config.server_addr);
    info!("API: http://{}/api/costs", config.server_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

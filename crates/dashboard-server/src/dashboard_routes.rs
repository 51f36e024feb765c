//! Dashboard REST API
//!
//! Stateless counterparts of the WebSocket session: the client holds the
//! control state and sends it back with each change.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use risk_views::{
    ControlId, ControlState, ControlValue, DashboardSession, DashboardSnapshot, OutputValue,
    Update, DEFAULT_COMPARE_COUNT,
};

use crate::{ApiResponse, AppError, AppState};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/dashboard/update", post(update_dashboard))
        .route("/api/companies/top", get(get_top_companies))
}

async fn get_dashboard(State(state): State<AppState>) -> Json<ApiResponse<DashboardSnapshot>> {
    let (_, snapshot) = DashboardSession::start(state.table.clone(), state.graph.clone());
    Json(ApiResponse::success(snapshot))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub state: ControlState,
    pub control: ControlId,
    pub value: ControlValue,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub state: ControlState,
    #[serde(flatten)]
    pub update: Update<OutputValue>,
}

async fn update_dashboard(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UpdateResponse>>, AppError> {
    let Json(req) = payload.map_err(AppError::bad_request)?;
    let mut session =
        DashboardSession::from_state(state.table.clone(), state.graph.clone(), req.state);
    let update = session
        .apply(req.control, req.value)
        .map_err(AppError::bad_request)?;

    Ok(Json(ApiResponse::success(UpdateResponse {
        state: session.into_state(),
        update,
    })))
}

#[derive(Debug, Deserialize)]
pub struct TopCompaniesQuery {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TopCompanies {
    pub year: Option<String>,
    pub companies: Vec<String>,
}

async fn get_top_companies(
    State(state): State<AppState>,
    Query(query): Query<TopCompaniesQuery>,
) -> Json<ApiResponse<TopCompanies>> {
    let year = query
        .year
        .filter(|y| !y.trim().is_empty())
        .or_else(|| state.table.latest_year().map(str::to_string));
    let n = query.n.unwrap_or(DEFAULT_COMPARE_COUNT);

    let companies = match &year {
        Some(year) => state.table.top_companies(year, n),
        None => Vec::new(),
    };

    Json(ApiResponse::success(TopCompanies { year, companies }))
}

// handlers/protected/alerts.rs - /api/alerts and /api/alerts/:id
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::stations;
use crate::api::{filter, paginate, DateRange, PageRequest, ValidJson, Validator};
use crate::error::{ApiError, ErrorCode};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{new_id, AlertStatus, AlertType, SensorAlert};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub station_id: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    pub station_id: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub threshold: Option<f64>,
    pub current_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AlertStatusRequest {
    pub status: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::not_found("Sensor alert not found")
}

fn parse_status(raw: Option<&str>) -> Result<Option<AlertStatus>, ApiError> {
    filter::enum_param("status", raw, ErrorCode::InvalidStatus)
}

fn parse_type(raw: Option<&str>) -> Result<Option<AlertType>, ApiError> {
    filter::enum_param("type", raw, ErrorCode::InvalidInputFormat)
}

/// GET /api/alerts - newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> ApiResult<Vec<SensorAlert>> {
    let page = PageRequest::from_params(query.page.as_deref(), query.limit.as_deref(), &state.config.pagination);
    let status = parse_status(query.status.as_deref())?;
    let alert_type = parse_type(query.alert_type.as_deref())?;
    let range = DateRange::from_params(query.start_date.as_deref(), query.end_date.as_deref())?;
    let station_id = filter::non_empty(query.station_id.as_deref());
    if let Some(station_id) = station_id {
        stations::ensure_exists(&state, station_id).await?;
    }

    let mut alerts: Vec<SensorAlert> = state
        .alerts
        .all()
        .await?
        .into_iter()
        .filter(|a| station_id.map_or(true, |id| a.station_id == id))
        .filter(|a| status.map_or(true, |s| a.status == s))
        .filter(|a| alert_type.map_or(true, |t| a.alert_type == t))
        .filter(|a| range.contains(&a.created_at))
        .collect();
    alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(ApiResponse::page(paginate(alerts, page)).message("Sensor alerts retrieved successfully"))
}

/// POST /api/alerts - raise an alert against an existing station
pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<AlertRequest>,
) -> ApiResult<SensorAlert> {
    let mut v = Validator::new();
    let station_id = v.require_text("stationId", &body.station_id, "Station ID is required");
    let alert_type = v.require_text("type", &body.alert_type, "Alert type is required");
    let threshold = v.require("threshold", body.threshold, "Threshold is required");
    let current_value = v.require("currentValue", body.current_value, "Current value is required");
    v.min("threshold", threshold, 0.0, "Threshold cannot be negative");
    v.min("currentValue", current_value, 0.0, "Current value cannot be negative");

    let (Some(station_id), Some(alert_type), Some(threshold), Some(current_value)) =
        (station_id, alert_type, threshold, current_value)
    else {
        return Err(v.into_error());
    };
    v.finish()?;
    let alert_type = parse_type(Some(alert_type))?.unwrap_or(AlertType::Temperature);

    stations::ensure_exists(&state, station_id).await?;

    let alert = SensorAlert {
        id: new_id("alert"),
        station_id: station_id.to_string(),
        alert_type,
        threshold,
        current_value,
        status: AlertStatus::Active,
        created_at: Utc::now(),
    };
    let alert = state.alerts.insert(alert).await?;

    info!("Raised {} alert {} for {}", alert.alert_type, alert.id, alert.station_id);
    Ok(ApiResponse::created(alert).message("Sensor alert created successfully"))
}

/// GET /api/alerts/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SensorAlert> {
    let alert = state.alerts.find(&id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(alert).message("Sensor alert retrieved successfully"))
}

/// PUT /api/alerts/:id - change the alert status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<AlertStatusRequest>,
) -> ApiResult<SensorAlert> {
    let mut alert = state.alerts.find(&id).await?.ok_or_else(not_found)?;

    let Some(status) = parse_status(body.status.as_deref())? else {
        return Err(ApiError::invalid_field("status", "Status is required"));
    };
    alert.status = status;

    let alert = state.alerts.replace(alert).await?.ok_or_else(not_found)?;
    info!("Alert {} is now {}", alert.id, alert.status);
    Ok(ApiResponse::success(alert).message("Sensor alert updated successfully"))
}

/// DELETE /api/alerts/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SensorAlert> {
    let alert = state.alerts.remove(&id).await?.ok_or_else(not_found)?;
    info!("Deleted alert {}", alert.id);
    Ok(ApiResponse::success(alert).message("Sensor alert deleted successfully"))
}

// handlers/protected/stations.rs - /api/stations and /api/stations/:id
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::api::{filter, paginate, PageRequest, ValidJson, Validator};
use crate::error::{ApiError, ErrorCode};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{new_id, StationStatus, WeatherStation};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub station_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StationRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<String>,
}

pub(crate) fn not_found() -> ApiError {
    ApiError::not_found("Weather station not found")
}

fn parse_status(raw: Option<&str>) -> Result<Option<StationStatus>, ApiError> {
    filter::enum_param("status", raw, ErrorCode::InvalidStatus)
}

fn check_coordinates(v: &mut Validator, latitude: Option<f64>, longitude: Option<f64>) {
    v.range("latitude", latitude, -90.0, 90.0, "Latitude must be between -90 and 90");
    v.range("longitude", longitude, -180.0, 180.0, "Longitude must be between -180 and 180");
}

/// Fail with 404 unless the station exists
pub(crate) async fn ensure_exists(state: &AppState, station_id: &str) -> Result<(), ApiError> {
    match state.stations.find(station_id).await? {
        Some(_) => Ok(()),
        None => Err(not_found()),
    }
}

/// GET /api/stations
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<StationQuery>,
) -> ApiResult<Vec<WeatherStation>> {
    let page = PageRequest::from_params(query.page.as_deref(), query.limit.as_deref(), &state.config.pagination);
    let status = parse_status(query.status.as_deref())?;
    let station_id = filter::non_empty(query.station_id.as_deref());

    let stations: Vec<WeatherStation> = state
        .stations
        .all()
        .await?
        .into_iter()
        .filter(|s| status.map_or(true, |status| s.status == status))
        .filter(|s| station_id.map_or(true, |id| s.id == id))
        .collect();

    if station_id.is_some() && stations.is_empty() {
        return Err(not_found());
    }

    Ok(ApiResponse::page(paginate(stations, page)).message("Weather stations retrieved successfully"))
}

/// POST /api/stations
pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<StationRequest>,
) -> ApiResult<WeatherStation> {
    let mut v = Validator::new();
    let name = v.require_text("name", &body.name, "Name is required");
    let location = v.require_text("location", &body.location, "Location is required");
    let latitude = v.require("latitude", body.latitude, "Latitude is required");
    let longitude = v.require("longitude", body.longitude, "Longitude is required");
    check_coordinates(&mut v, latitude, longitude);

    let (Some(name), Some(location), Some(latitude), Some(longitude)) = (name, location, latitude, longitude)
    else {
        return Err(v.into_error());
    };
    v.finish()?;

    let station = WeatherStation {
        id: new_id("station"),
        name: name.to_string(),
        location: location.to_string(),
        latitude,
        longitude,
        status: parse_status(body.status.as_deref())?.unwrap_or(StationStatus::Active),
        created_at: Utc::now(),
    };
    let station = state.stations.insert(station).await?;

    info!("Created station {} '{}'", station.id, station.name);
    Ok(ApiResponse::created(station).message("Weather station created successfully"))
}

/// GET /api/stations/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<WeatherStation> {
    let station = state.stations.find(&id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(station).message("Weather station retrieved successfully"))
}

/// PUT /api/stations/:id - partial update; blank name or location keeps the current value
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<StationRequest>,
) -> ApiResult<WeatherStation> {
    let mut station = state.stations.find(&id).await?.ok_or_else(not_found)?;

    let mut v = Validator::new();
    check_coordinates(&mut v, body.latitude, body.longitude);
    v.finish()?;

    if let Some(name) = filter::non_empty(body.name.as_deref()) {
        station.name = name.to_string();
    }
    if let Some(location) = filter::non_empty(body.location.as_deref()) {
        station.location = location.to_string();
    }
    if let Some(latitude) = body.latitude {
        station.latitude = latitude;
    }
    if let Some(longitude) = body.longitude {
        station.longitude = longitude;
    }
    if let Some(status) = parse_status(body.status.as_deref())? {
        station.status = status;
    }

    let station = state.stations.replace(station).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(station).message("Weather station updated successfully"))
}

/// DELETE /api/stations/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<WeatherStation> {
    let station = state.stations.remove(&id).await?.ok_or_else(not_found)?;
    info!("Deleted station {}", station.id);
    Ok(ApiResponse::success(station).message("Weather station deleted successfully"))
}

// handlers/protected/readings.rs - /api/readings and /api/readings/:id
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::stations;
use crate::api::{filter, paginate, DateRange, PageRequest, ValidJson, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{new_id, SensorReading};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub station_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRequest {
    pub station_id: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub air_quality: Option<f64>,
    pub rainfall: Option<f64>,
}

fn not_found() -> ApiError {
    ApiError::not_found("Sensor reading not found")
}

/// GET /api/readings - newest first, optionally scoped to a station and date window
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ReadingQuery>,
) -> ApiResult<Vec<SensorReading>> {
    let page = PageRequest::from_params(query.page.as_deref(), query.limit.as_deref(), &state.config.pagination);
    let range = DateRange::from_params(query.start_date.as_deref(), query.end_date.as_deref())?;
    let station_id = filter::non_empty(query.station_id.as_deref());
    if let Some(station_id) = station_id {
        stations::ensure_exists(&state, station_id).await?;
    }

    let mut readings: Vec<SensorReading> = state
        .readings
        .all()
        .await?
        .into_iter()
        .filter(|r| station_id.map_or(true, |id| r.station_id == id))
        .filter(|r| range.contains(&r.recorded_at))
        .collect();
    readings.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

    Ok(ApiResponse::page(paginate(readings, page)).message("Sensor readings retrieved successfully"))
}

/// POST /api/readings - record a measurement for an existing station
pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<ReadingRequest>,
) -> ApiResult<SensorReading> {
    let mut v = Validator::new();
    let station_id = v.require_text("stationId", &body.station_id, "Station ID is required");
    let temperature = v.require("temperature", body.temperature, "Temperature is required");
    let humidity = v.require("humidity", body.humidity, "Humidity is required");
    let air_quality = v.require("airQuality", body.air_quality, "Air quality is required");
    let rainfall = v.require("rainfall", body.rainfall, "Rainfall is required");
    v.range("humidity", humidity, 0.0, 100.0, "Humidity must be between 0 and 100");
    v.range("airQuality", air_quality, 0.0, 500.0, "Air quality must be between 0 and 500");
    v.min("rainfall", rainfall, 0.0, "Rainfall cannot be negative");

    let (Some(station_id), Some(temperature), Some(humidity), Some(air_quality), Some(rainfall)) =
        (station_id, temperature, humidity, air_quality, rainfall)
    else {
        return Err(v.into_error());
    };
    v.finish()?;

    stations::ensure_exists(&state, station_id).await?;

    let reading = SensorReading {
        id: new_id("reading"),
        station_id: station_id.to_string(),
        temperature,
        humidity,
        air_quality,
        rainfall,
        recorded_at: Utc::now(),
    };
    let reading = state.readings.insert(reading).await?;

    info!("Recorded reading {} for {}", reading.id, reading.station_id);
    Ok(ApiResponse::created(reading).message("Sensor reading created successfully"))
}

/// GET /api/readings/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SensorReading> {
    let reading = state.readings.find(&id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(reading).message("Sensor reading retrieved successfully"))
}

/// DELETE /api/readings/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SensorReading> {
    let reading = state.readings.remove(&id).await?.ok_or_else(not_found)?;
    info!("Deleted reading {}", reading.id);
    Ok(ApiResponse::success(reading).message("Sensor reading deleted successfully"))
}

// handlers/protected/admin.rs - GET/POST /api/admin (admin role only)
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::ValidJson;
use crate::error::{ApiError, ErrorCode};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{AlertStatus, Role, SensorAlert, SensorReading, StationStatus, UserProfile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminAction {
    pub action: Option<String>,
}

fn newest_readings(mut readings: Vec<SensorReading>, n: usize) -> Vec<SensorReading> {
    readings.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    readings.truncate(n);
    readings
}

fn newest_alerts(mut alerts: Vec<SensorAlert>, n: usize) -> Vec<SensorAlert> {
    alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    alerts.truncate(n);
    alerts
}

async fn counts(state: &AppState) -> Result<Value, ApiError> {
    Ok(json!({
        "users": state.users.count().await?,
        "stations": state.stations.count().await?,
        "readings": state.readings.count().await?,
        "alerts": state.alerts.count().await?,
    }))
}

/// GET /api/admin?type=users|stations|readings|alerts
///
/// Per-resource statistics; without `type`, an overview with recent activity.
pub async fn stats(State(state): State<AppState>, Query(query): Query<AdminQuery>) -> ApiResult<Value> {
    let data = match query.kind.as_deref() {
        Some("users") => {
            let users = state.users.all().await?;
            let with_role = |role: Role| users.iter().filter(|u| u.role == role).count();
            json!({
                "total": users.len(),
                "admins": with_role(Role::Admin),
                "operators": with_role(Role::Operator),
                "users": users.iter().map(UserProfile::from).collect::<Vec<_>>(),
            })
        }
        Some("stations") => {
            let stations = state.stations.all().await?;
            let with_status = |status: StationStatus| stations.iter().filter(|s| s.status == status).count();
            json!({
                "total": stations.len(),
                "active": with_status(StationStatus::Active),
                "inactive": with_status(StationStatus::Inactive),
                "maintenance": with_status(StationStatus::Maintenance),
                "stations": stations,
            })
        }
        Some("readings") => {
            let readings = state.readings.all().await?;
            json!({
                "total": readings.len(),
                "latest": newest_readings(readings.clone(), 10),
                "readings": readings,
            })
        }
        Some("alerts") => {
            let alerts = state.alerts.all().await?;
            let with_status = |status: AlertStatus| alerts.iter().filter(|a| a.status == status).count();
            json!({
                "total": alerts.len(),
                "active": with_status(AlertStatus::Active),
                "resolved": with_status(AlertStatus::Resolved),
                "acknowledged": with_status(AlertStatus::Acknowledged),
                "alerts": alerts,
            })
        }
        _ => json!({
            "overview": counts(&state).await?,
            "recentActivity": {
                "latestReadings": newest_readings(state.readings.all().await?, 5),
                "latestAlerts": newest_alerts(state.alerts.all().await?, 5),
            },
        }),
    };

    Ok(ApiResponse::success(data).message("Admin data retrieved successfully"))
}

/// POST /api/admin - maintenance actions: `clearAlerts`, `resetData`
pub async fn action(State(state): State<AppState>, ValidJson(body): ValidJson<AdminAction>) -> ApiResult<Value> {
    match body.action.as_deref() {
        Some("clearAlerts") => {
            let cleared = state.alerts.clear().await?;
            info!("Cleared {} alerts", cleared);
            Ok(ApiResponse::success(json!({ "clearedCount": cleared })).message("All alerts cleared successfully"))
        }
        Some("resetData") => {
            Ok(ApiResponse::success(counts(&state).await?).message("Data reset statistics retrieved"))
        }
        other => {
            warn!("Rejected admin action {:?}", other);
            Err(ApiError::bad_request("Invalid admin action", ErrorCode::ValidationError))
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Record;

string_enum! {
    /// Which measurement crossed its threshold
    pub enum AlertType {
        Temperature => "temperature",
        Rainfall => "rainfall",
        AirQuality => "airQuality",
    }
}

string_enum! {
    pub enum AlertStatus {
        Active => "active",
        Resolved => "resolved",
        Acknowledged => "acknowledged",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorAlert {
    pub id: String,
    pub station_id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub threshold: f64,
    pub current_value: f64,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for SensorAlert {
    const RESOURCE: &'static str = "alerts";

    fn key(&self) -> String {
        self.id.clone()
    }
}

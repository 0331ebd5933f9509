use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Record;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub id: String,
    pub station_id: String,
    pub temperature: f64,
    /// Relative humidity, 0-100 %
    pub humidity: f64,
    /// Air quality index, 0-500
    pub air_quality: f64,
    /// Millimetres
    pub rainfall: f64,
    pub recorded_at: DateTime<Utc>,
}

impl Record for SensorReading {
    const RESOURCE: &'static str = "readings";

    fn key(&self) -> String {
        self.id.clone()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Record;

string_enum! {
    pub enum StationStatus {
        Active => "active",
        Inactive => "inactive",
        Maintenance => "maintenance",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherStation {
    pub id: String,
    pub name: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: StationStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for WeatherStation {
    const RESOURCE: &'static str = "stations";

    fn key(&self) -> String {
        self.id.clone()
    }
}

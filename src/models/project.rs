use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Record;

string_enum! {
    pub enum ProjectStatus {
        Planning => "planning",
        InProgress => "in_progress",
        Completed => "completed",
        OnHold => "on_hold",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub user_id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Project {
    const RESOURCE: &'static str = "projects";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Record;

string_enum! {
    pub enum TaskStatus {
        Todo => "todo",
        InProgress => "in_progress",
        Completed => "completed",
        Blocked => "blocked",
    }
}

string_enum! {
    pub enum TaskPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Task {
    const RESOURCE: &'static str = "tasks";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

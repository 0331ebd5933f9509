//! Demo dataset loaded into empty stores at startup.

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::OnceCell;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use super::{Record, Store, StoreError};
use crate::auth::{self, AuthError};
use crate::models::{
    AlertStatus, AlertType, Order, OrderStatus, Project, ProjectStatus, Role, SensorAlert,
    SensorReading, StationStatus, Task, TaskPriority, TaskStatus, User, WeatherStation,
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const OPERATOR_USERNAME: &str = "operator";
pub const OPERATOR_PASSWORD: &str = "operator123";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Insert `records` only when the store holds nothing yet
pub async fn seed_if_empty<T, F>(store: &dyn Store<T>, records: F) -> Result<usize, SeedError>
where
    T: Record,
    F: FnOnce() -> Result<Vec<T>, SeedError>,
{
    if store.count().await? > 0 {
        return Ok(0);
    }

    let records = records()?;
    let seeded = records.len();
    for record in records {
        store.insert(record).await?;
    }

    info!("Seeded {} {}", seeded, T::RESOURCE);
    Ok(seeded)
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

// Argon2 hashes for the demo users, computed once per process
static DEMO_HASHES: OnceCell<(String, String)> = OnceCell::new();

pub fn users() -> Result<Vec<User>, SeedError> {
    let (admin_hash, operator_hash) = DEMO_HASHES.get_or_try_init(|| {
        Ok::<_, AuthError>((
            auth::hash_password(ADMIN_PASSWORD)?,
            auth::hash_password(OPERATOR_PASSWORD)?,
        ))
    })?;

    Ok(vec![
        User {
            id: "user-1".into(),
            username: ADMIN_USERNAME.into(),
            email: "admin@climatedashboard.com".into(),
            role: Role::Admin,
            password_hash: Some(admin_hash.clone()),
            created_at: at(2024, 1, 1, 0, 0),
            updated_at: None,
        },
        User {
            id: "user-2".into(),
            username: OPERATOR_USERNAME.into(),
            email: "operator@climatedashboard.com".into(),
            role: Role::Operator,
            password_hash: Some(operator_hash.clone()),
            created_at: at(2024, 1, 1, 0, 0),
            updated_at: None,
        },
    ])
}

pub fn stations() -> Result<Vec<WeatherStation>, SeedError> {
    let station = |id: &str, name: &str, location: &str, latitude, longitude, status| WeatherStation {
        id: id.into(),
        name: name.into(),
        location: location.into(),
        latitude,
        longitude,
        status,
        created_at: at(2024, 1, 1, 0, 0),
    };

    Ok(vec![
        station("station-1", "Chennai Central", "Chennai, Tamil Nadu", 13.0827, 80.2707, StationStatus::Active),
        station("station-2", "Mumbai Coastal", "Mumbai, Maharashtra", 19.076, 72.8777, StationStatus::Active),
        station("station-3", "Delhi North", "New Delhi, Delhi", 28.6139, 77.209, StationStatus::Maintenance),
    ])
}

pub fn readings() -> Result<Vec<SensorReading>, SeedError> {
    let reading = |id: &str, station: &str, temperature, humidity, air_quality, rainfall, recorded_at| {
        SensorReading {
            id: id.into(),
            station_id: station.into(),
            temperature,
            humidity,
            air_quality,
            rainfall,
            recorded_at,
        }
    };

    Ok(vec![
        reading("reading-1", "station-1", 31.2, 78.0, 62.0, 0.0, at(2024, 1, 15, 8, 0)),
        reading("reading-2", "station-1", 29.8, 82.0, 55.0, 12.4, at(2024, 1, 16, 8, 0)),
        reading("reading-3", "station-2", 27.5, 85.0, 98.0, 64.5, at(2024, 1, 15, 9, 0)),
        reading("reading-4", "station-3", 18.3, 46.0, 182.0, 0.0, at(2024, 1, 14, 10, 0)),
    ])
}

pub fn alerts() -> Result<Vec<SensorAlert>, SeedError> {
    let alert = |id: &str, station: &str, alert_type, threshold, current_value, status, created_at| SensorAlert {
        id: id.into(),
        station_id: station.into(),
        alert_type,
        threshold,
        current_value,
        status,
        created_at,
    };

    Ok(vec![
        alert("alert-1", "station-1", AlertType::Temperature, 30.0, 31.2, AlertStatus::Active, at(2024, 1, 15, 8, 5)),
        alert("alert-2", "station-2", AlertType::Rainfall, 50.0, 64.5, AlertStatus::Acknowledged, at(2024, 1, 15, 9, 10)),
        alert("alert-3", "station-3", AlertType::AirQuality, 150.0, 182.0, AlertStatus::Resolved, at(2024, 1, 14, 10, 15)),
    ])
}

pub fn projects() -> Result<Vec<Project>, SeedError> {
    let project = |id, name: &str, description: &str, status, user_id, created_at| Project {
        id,
        name: name.into(),
        description: description.into(),
        status,
        user_id,
        created_at,
        updated_at: None,
    };

    Ok(vec![
        project(1, "Climate Dashboard", "Real-time climate monitoring dashboard", ProjectStatus::InProgress, 1, at(2024, 1, 1, 0, 0)),
        project(2, "Weather API Integration", "Integrate third-party weather APIs", ProjectStatus::Planning, 2, at(2024, 1, 2, 0, 0)),
        project(3, "Data Visualization Module", "Create interactive charts and graphs", ProjectStatus::Completed, 1, at(2024, 1, 3, 0, 0)),
    ])
}

pub fn tasks() -> Result<Vec<Task>, SeedError> {
    let task = |id, title: &str, description: &str, status, priority, project_id, assigned_to, due: DateTime<Utc>, created_at| Task {
        id,
        title: title.into(),
        description: description.into(),
        status,
        priority,
        project_id,
        assigned_to: Some(assigned_to),
        due_date: Some(due),
        created_at,
        updated_at: None,
    };

    Ok(vec![
        task(1, "Setup project structure", "Initialize Next.js project with TypeScript", TaskStatus::Completed, TaskPriority::High, 1, 1, at(2024, 1, 10, 0, 0), at(2024, 1, 1, 0, 0)),
        task(2, "Design API endpoints", "Create RESTful API structure", TaskStatus::InProgress, TaskPriority::High, 1, 1, at(2024, 1, 15, 0, 0), at(2024, 1, 2, 0, 0)),
        task(3, "Research weather APIs", "Evaluate third-party weather service providers", TaskStatus::Todo, TaskPriority::Medium, 2, 2, at(2024, 1, 20, 0, 0), at(2024, 1, 3, 0, 0)),
    ])
}

pub fn orders() -> Result<Vec<Order>, SeedError> {
    let order = |id, user_id, cents: i64, status, items: &[&str], order_date, delivered_date| Order {
        id,
        user_id,
        order_number: Order::number_for(id),
        total_amount: Decimal::new(cents, 2),
        status,
        items: items.iter().map(|s| s.to_string()).collect(),
        order_date,
        delivered_date,
    };

    Ok(vec![
        order(1, 1, 29999, OrderStatus::Delivered, &["Climate Sensor Pro", "Weather Station Kit"], at(2024, 1, 5, 0, 0), Some(at(2024, 1, 8, 0, 0))),
        order(2, 1, 14999, OrderStatus::Shipped, &["Temperature Monitor"], at(2024, 1, 10, 0, 0), None),
        order(3, 2, 44999, OrderStatus::Processing, &["Complete Weather System", "Installation Service"], at(2024, 1, 12, 0, 0), None),
    ])
}

use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::database::{
    postgres,
    seed::{self, SeedError},
    Collection, MemoryStore, PgStore, Record, Store, StoreError,
};
use crate::models::{Order, Project, SensorAlert, SensorReading, Task, User, WeatherStation};

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Seeding failed: {0}")]
    Seed(#[from] SeedError),
}

/// Shared handler state: configuration plus one collection per resource
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Collection<User>,
    pub stations: Collection<WeatherStation>,
    pub readings: Collection<SensorReading>,
    pub alerts: Collection<SensorAlert>,
    pub projects: Collection<Project>,
    pub tasks: Collection<Task>,
    pub orders: Collection<Order>,
}

impl AppState {
    /// Open the configured storage backend, seeding empty stores when enabled
    pub async fn build(config: AppConfig) -> Result<Self, StateError> {
        let pool = match config.storage.backend {
            StorageBackend::Memory => None,
            StorageBackend::Postgres => {
                let pool = postgres::connect(&config.storage).await?;
                postgres::migrate(&pool).await?;
                Some(pool)
            }
        };

        let seed = config.storage.seed;
        let pool = pool.as_ref();

        let state = Self {
            users: open(pool, seed, seed::users).await?,
            stations: open(pool, seed, seed::stations).await?,
            readings: open(pool, seed, seed::readings).await?,
            alerts: open(pool, seed, seed::alerts).await?,
            projects: open(pool, seed, seed::projects).await?,
            tasks: open(pool, seed, seed::tasks).await?,
            orders: open(pool, seed, seed::orders).await?,
            config: Arc::new(config),
        };

        info!("Storage ready (backend = {})", state.storage_backend());
        Ok(state)
    }

    pub fn storage_backend(&self) -> &'static str {
        self.users.backend()
    }

    /// Round-trip to the backing store
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.users.ping().await
    }
}

async fn open<T, F>(pool: Option<&PgPool>, seed: bool, records: F) -> Result<Collection<T>, StateError>
where
    T: Record,
    F: FnOnce() -> Result<Vec<T>, SeedError>,
{
    let store: Arc<dyn Store<T>> = match pool {
        Some(pool) => Arc::new(PgStore::new(pool.clone())),
        None => Arc::new(MemoryStore::new()),
    };

    if seed {
        seed::seed_if_empty(store.as_ref(), records).await?;
    }

    Ok(Collection::open(store).await?)
}

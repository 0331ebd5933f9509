use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::info;

use super::{Record, Store, StoreError};
use crate::config::StorageConfig;

/// Every resource shares one table; the record itself lives in `body`.
/// Unique indexes are named `records_<resource>_<field>_key` so violations map
/// back to the field in [`Record::unique_fields`].
const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS records (
    resource    TEXT        NOT NULL,
    id          TEXT        NOT NULL,
    body        JSONB       NOT NULL,
    seq         BIGSERIAL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (resource, id)
)
"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS records_users_username_key \
     ON records ((body->>'username')) WHERE resource = 'users'",
    "CREATE UNIQUE INDEX IF NOT EXISTS records_users_email_key \
     ON records (lower(body->>'email')) WHERE resource = 'users'",
];

/// Open the connection pool described by the storage config
pub async fn connect(storage: &StorageConfig) -> Result<PgPool, StoreError> {
    let url = storage
        .database_url
        .as_deref()
        .ok_or_else(|| StoreError::Connection("DATABASE_URL is not set".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(storage.max_connections)
        .acquire_timeout(Duration::from_secs(storage.connect_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    info!(
        "Created database pool (max_connections = {})",
        storage.max_connections
    );
    Ok(pool)
}

/// Create the records table and its unique indexes if they do not exist yet
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(*statement).execute(pool).await?;
    }
    Ok(())
}

/// Turn a unique index violation on one of the record's fields into `Taken`
fn unique_violation<T: Record>(record: &T, err: sqlx::Error) -> StoreError {
    let constraint = match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => db.constraint().map(str::to_string),
        _ => None,
    };

    let field = constraint.and_then(|name| {
        record
            .unique_fields()
            .into_iter()
            .map(|(field, _)| field)
            .find(|field| name == format!("records_{}_{}_key", T::RESOURCE, field))
    });

    match field {
        Some(field) => StoreError::Taken {
            resource: T::RESOURCE,
            field,
        },
        None => StoreError::Sqlx(err),
    }
}

/// PostgreSQL-backed store for one resource
pub struct PgStore<T> {
    pool: PgPool,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> PgStore<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Record> Store<T> for PgStore<T> {
    async fn all(&self) -> Result<Vec<T>, StoreError> {
        let rows: Vec<Json<T>> =
            sqlx::query_scalar("SELECT body FROM records WHERE resource = $1 ORDER BY seq")
                .bind(T::RESOURCE)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|Json(record)| record).collect())
    }

    async fn find(&self, id: &str) -> Result<Option<T>, StoreError> {
        let row: Option<Json<T>> =
            sqlx::query_scalar("SELECT body FROM records WHERE resource = $1 AND id = $2")
                .bind(T::RESOURCE)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|Json(record)| record))
    }

    async fn insert(&self, record: T) -> Result<T, StoreError> {
        let id = record.key();
        let result = sqlx::query(
            "INSERT INTO records (resource, id, body) VALUES ($1, $2, $3) \
             ON CONFLICT (resource, id) DO NOTHING",
        )
        .bind(T::RESOURCE)
        .bind(&id)
        .bind(Json(&record))
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(&record, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate {
                resource: T::RESOURCE,
                id,
            });
        }
        Ok(record)
    }

    async fn replace(&self, record: T) -> Result<Option<T>, StoreError> {
        let result = sqlx::query(
            "UPDATE records SET body = $3, updated_at = now() WHERE resource = $1 AND id = $2",
        )
        .bind(T::RESOURCE)
        .bind(record.key())
        .bind(Json(&record))
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(&record, e))?;

        Ok((result.rows_affected() > 0).then_some(record))
    }

    async fn remove(&self, id: &str) -> Result<Option<T>, StoreError> {
        let row: Option<Json<T>> = sqlx::query_scalar(
            "DELETE FROM records WHERE resource = $1 AND id = $2 RETURNING body",
        )
        .bind(T::RESOURCE)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|Json(record)| record))
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE resource = $1")
            .bind(T::RESOURCE)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() as usize)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records WHERE resource = $1")
            .bind(T::RESOURCE)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as usize)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

//! PostgreSQL entity store
//!
//! Every entity type shares the `entity_records` table: one JSONB document
//! per record, keyed by `(entity, id)`. Filters become a JSONB containment
//! test (`body @> filter`), which the GIN index on `body` serves.

use std::marker::PhantomData;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, DomainPort, Entity, EntityFilter, HealthCheckResult, HealthCheckable, PortError,
    Repository,
};

use crate::error::DatabaseError;

const SCHEMA: &str = include_str!("../../../migrations/20240101_000001_entity_records.sql");

/// Creates the `entity_records` table and its indexes if missing
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
    Ok(())
}

/// `Repository<T>` over the shared JSONB table
pub struct PgEntityRepository<T> {
    pool: PgPool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for PgEntityRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> PgEntityRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn decode(body: Value) -> Result<T, DatabaseError> {
        Ok(serde_json::from_value(body)?)
    }

    fn decode_all(rows: Vec<Value>) -> Result<Vec<T>, PortError> {
        rows.into_iter()
            .map(|body| Self::decode(body).map_err(PortError::from))
            .collect()
    }
}

impl<T: Entity> DomainPort for PgEntityRepository<T> {}

#[async_trait]
impl<T: Entity> Repository<T> for PgEntityRepository<T> {
    #[instrument(skip(self, id), fields(entity = T::ENTITY_NAME, id = %id))]
    async fn get(&self, id: T::Id) -> Result<T, PortError> {
        let key: Uuid = id.into();
        let body: Option<Value> =
            sqlx::query_scalar("SELECT body FROM entity_records WHERE entity = $1 AND id = $2")
                .bind(T::ENTITY_NAME)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(DatabaseError::from)?;

        match body {
            Some(body) => Ok(Self::decode(body)?),
            None => Err(DatabaseError::not_found(T::ENTITY_NAME, id).into()),
        }
    }

    async fn list(&self) -> Result<Vec<T>, PortError> {
        let rows: Vec<Value> =
            sqlx::query_scalar("SELECT body FROM entity_records WHERE entity = $1 ORDER BY seq")
                .bind(T::ENTITY_NAME)
                .fetch_all(&self.pool)
                .await
                .map_err(DatabaseError::from)?;
        Self::decode_all(rows)
    }

    #[instrument(skip(self, filter), fields(entity = T::ENTITY_NAME))]
    async fn filter(&self, filter: &EntityFilter) -> Result<Vec<T>, PortError> {
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT body FROM entity_records WHERE entity = $1 AND body @> $2 ORDER BY seq",
        )
        .bind(T::ENTITY_NAME)
        .bind(filter.as_json())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        debug!(matched = rows.len(), "filtered entity records");
        Self::decode_all(rows)
    }

    async fn create(&self, entity: T) -> Result<T, PortError> {
        let key: Uuid = entity.id().into();
        let body = serde_json::to_value(&entity).map_err(DatabaseError::from)?;
        let result = sqlx::query(
            "INSERT INTO entity_records (entity, id, body) VALUES ($1, $2, $3) \
             ON CONFLICT (entity, id) DO NOTHING",
        )
        .bind(T::ENTITY_NAME)
        .bind(key)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::duplicate(T::ENTITY_NAME, entity.id()).into());
        }
        Ok(entity)
    }

    #[instrument(skip(self, entities), fields(entity = T::ENTITY_NAME, count = entities.len()))]
    async fn create_many(&self, entities: Vec<T>) -> Result<Vec<T>, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        for entity in &entities {
            let key: Uuid = entity.id().into();
            let body = serde_json::to_value(entity).map_err(DatabaseError::from)?;
            let result = sqlx::query(
                "INSERT INTO entity_records (entity, id, body) VALUES ($1, $2, $3) \
                 ON CONFLICT (entity, id) DO NOTHING",
            )
            .bind(T::ENTITY_NAME)
            .bind(key)
            .bind(body)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;

            if result.rows_affected() == 0 {
                // dropping the transaction rolls it back
                return Err(DatabaseError::duplicate(T::ENTITY_NAME, entity.id()).into());
            }
        }
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(entities)
    }

    async fn update(&self, entity: T) -> Result<T, PortError> {
        let key: Uuid = entity.id().into();
        let body = serde_json::to_value(&entity).map_err(DatabaseError::from)?;
        let result = sqlx::query(
            "UPDATE entity_records SET body = $3, updated_at = now() WHERE entity = $1 AND id = $2",
        )
        .bind(T::ENTITY_NAME)
        .bind(key)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(T::ENTITY_NAME, entity.id()).into());
        }
        Ok(entity)
    }
}

#[async_trait]
impl<T: Entity> HealthCheckable for PgEntityRepository<T> {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;
        let adapter_id = format!("postgres-{}", T::ENTITY_NAME.to_lowercase());

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id,
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id,
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

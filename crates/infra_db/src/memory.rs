//! In-memory entity store
//!
//! Backs the API when no database URL is configured, and every service
//! test. Records are kept in insertion order so `list` and `filter` return
//! creation order like the PostgreSQL store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, DomainPort, Entity, EntityFilter, HealthCheckResult, HealthCheckable, PortError,
    Repository,
};

use crate::error::DatabaseError;

struct Store<T> {
    records: Vec<T>,
    index: HashMap<Uuid, usize>,
}

impl<T: Entity> Store<T> {
    fn insert(&mut self, entity: T) {
        self.index.insert(entity.id().into(), self.records.len());
        self.records.push(entity);
    }
}

/// `Repository<T>` over a map guarded by a tokio `RwLock`
pub struct InMemoryRepository<T> {
    store: Arc<RwLock<Store<T>>>,
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(Store {
                records: Vec::new(),
                index: HashMap::new(),
            })),
        }
    }

    /// Creates a store pre-loaded with records
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let mut store = Store {
            records: Vec::new(),
            index: HashMap::new(),
        };
        for record in records {
            store.insert(record);
        }
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<T: Entity> DomainPort for InMemoryRepository<T> {}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn get(&self, id: T::Id) -> Result<T, PortError> {
        let key: Uuid = id.into();
        let store = self.store.read().await;
        store
            .index
            .get(&key)
            .map(|&slot| store.records[slot].clone())
            .ok_or_else(|| DatabaseError::not_found(T::ENTITY_NAME, id).into())
    }

    async fn list(&self) -> Result<Vec<T>, PortError> {
        Ok(self.store.read().await.records.clone())
    }

    async fn filter(&self, filter: &EntityFilter) -> Result<Vec<T>, PortError> {
        let store = self.store.read().await;
        let mut matched = Vec::new();
        for record in &store.records {
            let json = serde_json::to_value(record).map_err(DatabaseError::from)?;
            if filter.matches(&json) {
                matched.push(record.clone());
            }
        }
        debug!(entity = T::ENTITY_NAME, matched = matched.len(), "filtered in-memory records");
        Ok(matched)
    }

    async fn create(&self, entity: T) -> Result<T, PortError> {
        let mut store = self.store.write().await;
        let key: Uuid = entity.id().into();
        if store.index.contains_key(&key) {
            return Err(DatabaseError::duplicate(T::ENTITY_NAME, entity.id()).into());
        }
        store.insert(entity.clone());
        Ok(entity)
    }

    async fn create_many(&self, entities: Vec<T>) -> Result<Vec<T>, PortError> {
        let mut store = self.store.write().await;
        let mut seen = HashSet::new();
        for entity in &entities {
            let key: Uuid = entity.id().into();
            if store.index.contains_key(&key) || !seen.insert(key) {
                return Err(DatabaseError::duplicate(T::ENTITY_NAME, entity.id()).into());
            }
        }
        for entity in &entities {
            store.insert(entity.clone());
        }
        Ok(entities)
    }

    async fn update(&self, entity: T) -> Result<T, PortError> {
        let key: Uuid = entity.id().into();
        let mut store = self.store.write().await;
        let slot = *store
            .index
            .get(&key)
            .ok_or_else(|| DatabaseError::not_found(T::ENTITY_NAME, entity.id()))?;
        store.records[slot] = entity.clone();
        Ok(entity)
    }
}

#[async_trait]
impl<T: Entity> HealthCheckable for InMemoryRepository<T> {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: format!("memory-{}", T::ENTITY_NAME.to_lowercase()),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

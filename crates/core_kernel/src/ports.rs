//! Ports and Adapters Infrastructure
//!
//! Business rules never talk to a storage platform directly. Each entity
//! type is reached through a [`Repository`] port, and adapters (in-memory,
//! PostgreSQL entity store, or a remote entity API) implement it.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        Services (billing, subscription)      │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │      Repository<T>  (list/filter/create/     │
//! │               update/get)                    │
//! └──────────────────────────────────────────────┘
//!            ▲                        ▲
//!   ┌────────┴────────┐      ┌───────┴────────┐
//!   │ In-memory store │      │ Postgres JSONB │
//!   └─────────────────┘      └────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for port operations
///
/// Every adapter reports failures through this type so services handle
/// storage errors the same way regardless of the backing platform.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// A stored record could not be mapped to or from its domain type
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Validation error with field information
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may
    /// succeed if the user repeats the action
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. } | PortError::Timeout { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports must be usable from async handlers shared across tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// A record stored through a [`Repository`]
///
/// Entities serialize to the JSON document shape the entity store keeps,
/// and are keyed by a UUID-backed identifier.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + fmt::Display + Into<Uuid> + Send + Sync + 'static;

    /// Entity collection name, e.g. `"Parcela"`
    const ENTITY_NAME: &'static str;

    fn id(&self) -> Self::Id;
}

/// Field-equality filter applied to an entity's serialized form
///
/// Keys are the serialized (camelCase) field names; all pairs must match.
///
/// ```rust,ignore
/// let filter = EntityFilter::new()
///     .eq("clientId", client_id.as_uuid().to_string())
///     .eq("status", "pendente");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityFilter {
    fields: BTreeMap<String, serde_json::Value>,
}

impl EntityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The filter as a JSON object, suitable for a JSONB containment query
    pub fn as_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Returns true if the serialized record satisfies every condition
    pub fn matches(&self, record: &serde_json::Value) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

/// Generic entity CRUD port
///
/// Records are never deleted through this port; installments and fiscal
/// documents keep their full history.
#[async_trait]
pub trait Repository<T: Entity>: DomainPort {
    /// Retrieves a record by id, or `PortError::NotFound`
    async fn get(&self, id: T::Id) -> Result<T, PortError>;

    /// Lists all records in creation order
    async fn list(&self) -> Result<Vec<T>, PortError>;

    /// Lists records matching the filter, in creation order
    async fn filter(&self, filter: &EntityFilter) -> Result<Vec<T>, PortError>;

    /// Stores a new record; fails with `Conflict` if the id already exists
    async fn create(&self, entity: T) -> Result<T, PortError>;

    /// Stores a batch of new records atomically
    async fn create_many(&self, entities: Vec<T>) -> Result<Vec<T>, PortError>;

    /// Replaces an existing record; fails with `NotFound` if absent
    async fn update(&self, entity: T) -> Result<T, PortError>;
}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    /// Current health status
    pub status: AdapterHealth,
    /// Latency of the health check in milliseconds
    pub latency_ms: u64,
    /// Optional message with additional details
    pub message: Option<String>,
    /// Timestamp of the health check
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

/// Trait for adapters that support health checks
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Parcela", "123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("Parcela"));
        assert!(error.to_string().contains("123"));
    }

    #[test]
    fn test_port_error_transient() {
        let timeout = PortError::Timeout {
            operation: "list".to_string(),
            duration_ms: 5000,
        };
        assert!(timeout.is_transient());
        assert!(!PortError::validation("bad").is_transient());
    }

    #[test]
    fn test_filter_matches_all_fields() {
        let filter = EntityFilter::new()
            .eq("clientId", "c-1")
            .eq("status", "pendente");

        assert!(filter.matches(&json!({"clientId": "c-1", "status": "pendente", "amount": 10})));
        assert!(!filter.matches(&json!({"clientId": "c-1", "status": "pago"})));
        assert!(!filter.matches(&json!({"status": "pendente"})));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = EntityFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&json!({"anything": 1})));
        assert_eq!(filter.as_json(), json!({}));
    }
}

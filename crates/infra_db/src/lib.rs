//! Infrastructure Database Layer
//!
//! Adapters for the `Repository<T>` port defined in `core_kernel`.
//!
//! # Adapters
//!
//! - [`InMemoryRepository`]: records in insertion order behind a tokio
//!   `RwLock`; used when no database is configured and in tests
//! - [`PgEntityRepository`]: one JSONB document per record in the
//!   `entity_records` table, keyed by entity name and id
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, ensure_schema, DatabaseConfig, PgEntityRepository};
//!
//! let pool = create_pool(DatabaseConfig::new(url)).await?;
//! ensure_schema(&pool).await?;
//! let installments: PgEntityRepository<Installment> = PgEntityRepository::new(pool);
//! ```

pub mod entity_store;
pub mod error;
pub mod memory;
pub mod pool;

pub use entity_store::{ensure_schema, PgEntityRepository};
pub use error::DatabaseError;
pub use memory::InMemoryRepository;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};

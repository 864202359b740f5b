//! Repository Test Utilities
//!
//! Bundles of repositories for service and API tests. In-memory stores are
//! the default; `postgres_stores` uses a real database when
//! `TEST_DATABASE_URL` is set.

use std::sync::Arc;

use core_kernel::Repository;
use domain_billing::{FiscalDocument, Installment};
use domain_subscription::{SubscriptionPayment, User};
use infra_db::{create_pool_from_url, ensure_schema, InMemoryRepository, PgEntityRepository};

/// Environment variable naming a disposable test database
pub const TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";

/// One repository per entity type
#[derive(Clone)]
pub struct TestStores {
    pub installments: Arc<dyn Repository<Installment>>,
    pub documents: Arc<dyn Repository<FiscalDocument>>,
    pub users: Arc<dyn Repository<User>>,
    pub payments: Arc<dyn Repository<SubscriptionPayment>>,
}

impl TestStores {
    /// Fresh, empty in-memory stores
    pub fn in_memory() -> Self {
        Self {
            installments: Arc::new(InMemoryRepository::<Installment>::new()),
            documents: Arc::new(InMemoryRepository::<FiscalDocument>::new()),
            users: Arc::new(InMemoryRepository::<User>::new()),
            payments: Arc::new(InMemoryRepository::<SubscriptionPayment>::new()),
        }
    }

    /// In-memory stores seeded with users
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: Arc::new(InMemoryRepository::with_records(users)),
            ..Self::in_memory()
        }
    }
}

/// Stores backed by the database at `TEST_DATABASE_URL`, if set
pub async fn postgres_stores() -> Option<TestStores> {
    let url = std::env::var(TEST_DATABASE_URL).ok()?;
    let pool = create_pool_from_url(&url)
        .await
        .expect("Failed to connect to test database");
    ensure_schema(&pool)
        .await
        .expect("Failed to create entity_records schema");

    Some(TestStores {
        installments: Arc::new(PgEntityRepository::<Installment>::new(pool.clone())),
        documents: Arc::new(PgEntityRepository::<FiscalDocument>::new(pool.clone())),
        users: Arc::new(PgEntityRepository::<User>::new(pool.clone())),
        payments: Arc::new(PgEntityRepository::<SubscriptionPayment>::new(pool)),
    })
}

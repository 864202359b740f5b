//! PostgreSQL entity store tests
//!
//! Run only when `TEST_DATABASE_URL` points at a disposable database;
//! otherwise each test returns early.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentId, Entity, EntityFilter, PortError, Repository};
use infra_db::{create_pool_from_url, ensure_schema, PgEntityRepository};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Receipt {
    id: DocumentId,
    client_name: String,
    issue_date: NaiveDate,
    status: String,
}

impl Entity for Receipt {
    type Id = DocumentId;
    const ENTITY_NAME: &'static str = "ReciboTeste";

    fn id(&self) -> DocumentId {
        self.id
    }
}

fn receipt(client: &str, status: &str) -> Receipt {
    Receipt {
        id: DocumentId::new_v7(),
        client_name: client.to_string(),
        issue_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        status: status.to_string(),
    }
}

async fn repository() -> Option<PgEntityRepository<Receipt>> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = create_pool_from_url(&url).await.expect("database reachable");
    ensure_schema(&pool).await.expect("schema created");
    Some(PgEntityRepository::new(pool))
}

#[tokio::test]
async fn test_round_trip_and_update() {
    let Some(repo) = repository().await else { return };

    let mut created = repo.create(receipt("Ana", "ativo")).await.unwrap();
    assert_eq!(repo.get(created.id).await.unwrap(), created);

    created.status = "cancelado".to_string();
    repo.update(created.clone()).await.unwrap();
    assert_eq!(repo.get(created.id).await.unwrap().status, "cancelado");
}

#[tokio::test]
async fn test_duplicate_and_missing() {
    let Some(repo) = repository().await else { return };

    let r = repo.create(receipt("Bia", "ativo")).await.unwrap();
    assert!(matches!(repo.create(r).await, Err(PortError::Conflict { .. })));
    assert!(repo.get(DocumentId::new()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_filter_uses_containment() {
    let Some(repo) = repository().await else { return };

    let client = format!("Cliente {}", DocumentId::new());
    repo.create_many(vec![receipt(&client, "ativo"), receipt(&client, "cancelado")])
        .await
        .unwrap();

    let active = repo
        .filter(&EntityFilter::new().eq("clientName", client.as_str()).eq("status", "ativo"))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].status, "ativo");
}

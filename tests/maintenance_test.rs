mod common;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use common::{insert_companies, new_contact, setup_stores};
use company_store::db::{MaintenanceRoutine, PURGE_OLD_DELETED_COMPANIES};
use company_store::domain::{AuditFields, Company};
use company_store::{CompanyId, CompanyStore, StoreError};
use sqlx::sqlite::SqlitePool;
use std::error::Error as _;
use std::sync::Arc;

#[derive(Debug)]
struct BrokenRoutine;

#[async_trait]
impl MaintenanceRoutine for BrokenRoutine {
    fn name(&self) -> &str {
        "rebuild-indexes"
    }

    async fn run(&self, _pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        Err(sqlx::Error::Protocol("routine is unavailable".to_string()))
    }
}

fn recently_deleted(name: &str) -> Company {
    let at = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
    Company {
        id: CompanyId::new(0),
        name: name.to_string(),
        street: "3 Pier Rd".to_string(),
        city: "Portland".to_string(),
        state: "ME".to_string(),
        postal_code: "04101".to_string(),
        is_active: true,
        is_deleted: true,
        audit: AuditFields {
            created: at,
            modified: at,
            created_by: "import".to_string(),
            modified_by: "import".to_string(),
        },
        version: 1,
    }
}

#[tokio::test]
async fn test_purge_removes_only_aged_deleted_companies() {
    let stores = setup_stores().await;
    // Soft deletes made through the store are stamped in January 2024, well
    // before the 30-day cutoff measured from 2024-06-01.
    let ids = insert_companies(&stores, 3).await;
    stores
        .contacts
        .insert(&new_contact(ids[0], "Ada"))
        .await
        .unwrap();
    stores.companies.soft_delete(ids[0]).await.unwrap();
    stores.companies.soft_delete(ids[1]).await.unwrap();
    stores
        .companies
        .bulk_insert(&[recently_deleted("Fresh Delete")])
        .await
        .unwrap();

    let removed = stores.companies.purge_old_deleted().await.unwrap();

    assert_eq!(removed, 2);
    let survivors: Vec<String> = stores
        .companies
        .list_deleted()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(survivors, vec!["Fresh Delete".to_string()]);
    assert!(stores.companies.get_by_id(ids[2]).await.unwrap().is_some());
    assert_eq!(stores.count_rows("Companies").await, 2);
    assert_eq!(stores.count_rows("CompanyContacts").await, 0);

    assert_eq!(stores.companies.purge_old_deleted().await.unwrap(), 0);
}

#[tokio::test]
async fn test_purge_with_nothing_deleted_is_a_no_op() {
    let stores = setup_stores().await;
    insert_companies(&stores, 2).await;

    assert_eq!(stores.companies.purge_old_deleted().await.unwrap(), 0);
    assert_eq!(stores.count_rows("Companies").await, 2);
}

#[tokio::test]
async fn test_routine_failure_names_the_routine() {
    let stores = setup_stores().await;
    let store = CompanyStore::new(
        stores.pool.clone(),
        common::stamper(stores.clock.clone(), "ops"),
        Arc::new(BrokenRoutine),
    );

    let err = store.purge_old_deleted().await.unwrap_err();

    match &err {
        StoreError::Maintenance { routine, source } => {
            assert_eq!(routine, "rebuild-indexes");
            assert!(matches!(source, sqlx::Error::Protocol(_)));
        }
        other => panic!("Expected Maintenance, got {:?}", other),
    }
    assert!(err.to_string().contains("rebuild-indexes"));
    assert!(err.source().is_some());
}

#[test]
fn test_retention_purge_is_registered_by_name() {
    let purge = common::purge_routine(30);
    assert_eq!(purge.name(), PURGE_OLD_DELETED_COMPANIES);
    assert_eq!(PURGE_OLD_DELETED_COMPANIES, "purge-old-deleted-companies");
}

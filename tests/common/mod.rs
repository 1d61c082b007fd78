#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use company_store::db::{init_db, CompanyStore, ContactStore, RetentionPurge};
use company_store::domain::{Actor, AuditStamper, Clock, FixedActor, NewCompany, NewContact};
use company_store::CompanyId;
use sqlx::sqlite::SqlitePool;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Clock that advances one second on every reading.
#[derive(Debug)]
pub struct StepClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl StepClock {
    pub fn new() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(n)
    }
}

/// Clock pinned to one instant.
#[derive(Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct TestStores {
    pub pool: SqlitePool,
    pub clock: Arc<StepClock>,
    pub companies: CompanyStore,
    pub contacts: ContactStore,
    _temp: TempDir,
}

impl TestStores {
    /// Stores over the same database attributing writes to another principal.
    pub fn acting_as(&self, actor: &str) -> (CompanyStore, ContactStore) {
        self.stamped_by(stamper(self.clock.clone(), actor))
    }

    /// Stores over the same database using an arbitrary stamper.
    pub fn stamped_by(&self, stamper: AuditStamper) -> (CompanyStore, ContactStore) {
        (
            CompanyStore::new(self.pool.clone(), stamper.clone(), purge_routine(30)),
            ContactStore::new(self.pool.clone(), stamper),
        )
    }

    pub async fn count_rows(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub fn stamper(clock: Arc<dyn Clock>, actor: &str) -> AuditStamper {
    AuditStamper::new(clock, Arc::new(FixedActor::new(Actor::new(actor))))
}

pub fn purge_routine(retention_days: i64) -> Arc<RetentionPurge> {
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
    Arc::new(RetentionPurge::new(retention_days, clock))
}

pub async fn setup_stores() -> TestStores {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path, 5).await.expect("init_db failed");

    let clock = Arc::new(StepClock::new());
    let stamper = stamper(clock.clone(), "conor");

    TestStores {
        companies: CompanyStore::new(pool.clone(), stamper.clone(), purge_routine(30)),
        contacts: ContactStore::new(pool.clone(), stamper),
        pool,
        clock,
        _temp: temp_dir,
    }
}

pub fn new_company(name: &str, state: &str) -> NewCompany {
    NewCompany::new(name, "1 Main St", "Springfield", state, "12345")
}

pub fn new_contact(company_id: CompanyId, name: &str) -> NewContact {
    NewContact {
        company_id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        mobile_phone: "555-0100".to_string(),
        office_phone: "555-0199".to_string(),
    }
}

pub async fn insert_companies(stores: &TestStores, n: usize) -> Vec<CompanyId> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let company = stores
            .companies
            .insert(&new_company(&format!("Company {}", i + 1), "OH"))
            .await
            .unwrap();
        ids.push(company.id);
    }
    ids
}

//! Administrative routines invoked by the store but owned elsewhere.

use async_trait::async_trait;
use chrono::Duration;
use sqlx::sqlite::SqlitePool;
use std::fmt;
use std::sync::Arc;

use crate::domain::Clock;

pub const PURGE_OLD_DELETED_COMPANIES: &str = "purge-old-deleted-companies";

/// A named maintenance operation. Returns the number of rows it removed.
#[async_trait]
pub trait MaintenanceRoutine: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn run(&self, pool: &SqlitePool) -> Result<u64, sqlx::Error>;
}

/// Hard-deletes companies that have been soft-deleted for longer than the
/// retention window. Contacts follow through the cascading foreign key.
#[derive(Debug, Clone)]
pub struct RetentionPurge {
    retention: Duration,
    clock: Arc<dyn Clock>,
}

impl RetentionPurge {
    pub fn new(retention_days: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            retention: Duration::days(retention_days),
            clock,
        }
    }
}

#[async_trait]
impl MaintenanceRoutine for RetentionPurge {
    fn name(&self) -> &str {
        PURGE_OLD_DELETED_COMPANIES
    }

    async fn run(&self, pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let cutoff = self.clock.now() - self.retention;

        // Modified was refreshed by the soft delete, so it marks the deletion time.
        let result = sqlx::query(
            r#"
            DELETE FROM Companies
            WHERE IsDeleted = 1 AND julianday(Modified) < julianday(?)
            "#,
        )
        .bind(cutoff)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

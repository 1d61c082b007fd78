//! Company operations: CRUD, activation, soft delete, paging and reporting.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{
    advance_modified, company_columns, company_from_row, company_infos_from_row,
    count_by_state_from_row, map_rows,
};
use crate::db::maintenance::MaintenanceRoutine;
use crate::domain::{
    ActivationOutcome, AuditStamper, Company, CompanyCountByState, CompanyId, CompanyInfos,
    NewCompany,
};
use crate::error::StoreError;
use crate::paging::{PageRequest, PageSource};

/// Store for company rows.
#[derive(Debug, Clone)]
pub struct CompanyStore {
    pool: SqlitePool,
    stamper: AuditStamper,
    purge: Arc<dyn MaintenanceRoutine>,
}

impl CompanyStore {
    pub fn new(pool: SqlitePool, stamper: AuditStamper, purge: Arc<dyn MaintenanceRoutine>) -> Self {
        CompanyStore {
            pool,
            stamper,
            purge,
        }
    }

    /// All non-deleted companies with their live contact counts, ordered by id.
    pub async fn list(&self) -> Result<Vec<CompanyInfos>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT Id, Name, Street, City, State, PostalCode, IsActive,
                   Created, Modified, CreatedBy, ModifiedBy, ContactCount
            FROM CompanyInfos
            ORDER BY Id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed company infos");
        Ok(map_rows(&rows, company_infos_from_row)?)
    }

    /// Every non-deleted company row, ordered by id.
    pub async fn all(&self) -> Result<Vec<Company>, StoreError> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            company_columns!(),
            " FROM Companies WHERE IsDeleted = 0 ORDER BY Id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(map_rows(&rows, company_from_row)?)
    }

    pub async fn get_by_id(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        let row = sqlx::query(concat!(
            "SELECT ",
            company_columns!(),
            " FROM Companies WHERE Id = ? AND IsDeleted = 0"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(company_from_row).transpose()?)
    }

    /// Insert a company, stamping audit fields and assigning a new id.
    pub async fn insert(&self, company: &NewCompany) -> Result<Company, StoreError> {
        let audit = self.stamper.for_insert();

        let row = sqlx::query(concat!(
            r#"
            INSERT INTO Companies
                (Name, Street, City, State, PostalCode, IsActive, IsDeleted,
                 Created, Modified, CreatedBy, ModifiedBy, Version)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?, 1)
            RETURNING "#,
            company_columns!()
        ))
        .bind(&company.name)
        .bind(&company.street)
        .bind(&company.city)
        .bind(&company.state)
        .bind(&company.postal_code)
        .bind(company.is_active)
        .bind(audit.created)
        .bind(audit.modified)
        .bind(&audit.created_by)
        .bind(&audit.modified_by)
        .fetch_one(&self.pool)
        .await?;

        let inserted = company_from_row(&row)?;
        info!(company_id = %inserted.id, created_by = %inserted.audit.created_by, "Inserted company");
        Ok(inserted)
    }

    /// Overwrite the caller-owned fields of a company.
    ///
    /// The write only lands when the stored version equals `company.version`;
    /// `Created`/`CreatedBy` are never part of the statement. Returns `None`
    /// when no non-deleted row has this id and `StoreError::Conflict` when the
    /// row exists at a different version.
    pub async fn update(&self, company: &Company) -> Result<Option<Company>, StoreError> {
        let stamp = self.stamper.for_update();

        let row = sqlx::query(concat!(
            r#"
            UPDATE Companies
            SET Name = ?,
                Street = ?,
                City = ?,
                State = ?,
                PostalCode = ?,
                IsActive = ?,
                "#,
            advance_modified!(),
            r#",
                ModifiedBy = ?,
                Version = Version + 1
            WHERE Id = ? AND IsDeleted = 0 AND Version = ?
            RETURNING "#,
            company_columns!()
        ))
        .bind(&company.name)
        .bind(&company.street)
        .bind(&company.city)
        .bind(&company.state)
        .bind(&company.postal_code)
        .bind(company.is_active)
        .bind(stamp.at)
        .bind(stamp.at)
        .bind(stamp.by.as_str())
        .bind(company.id.as_i64())
        .bind(company.version)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let updated = company_from_row(&row)?;
                info!(company_id = %updated.id, version = updated.version, modified_by = %stamp.by, "Updated company");
                Ok(Some(updated))
            }
            None => match self.current_version(company.id).await? {
                Some(actual) => {
                    warn!(company_id = %company.id, expected = company.version, actual, "Rejected stale company update");
                    Err(StoreError::Conflict {
                        entity: "company",
                        id: company.id.as_i64(),
                        expected: company.version,
                        actual,
                    })
                }
                None => Ok(None),
            },
        }
    }

    async fn current_version(&self, id: CompanyId) -> Result<Option<i64>, StoreError> {
        let version = sqlx::query_scalar::<_, i64>(
            "SELECT Version FROM Companies WHERE Id = ? AND IsDeleted = 0",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;
        Ok(version)
    }

    /// Flip `IsActive` in one conditional statement. Returns whether a
    /// non-deleted row matched.
    pub async fn toggle_active(&self, id: CompanyId) -> Result<bool, StoreError> {
        let stamp = self.stamper.for_update();

        let result = sqlx::query(concat!(
            r#"
            UPDATE Companies
            SET IsActive = CASE WHEN IsActive = 1 THEN 0 ELSE 1 END,
                "#,
            advance_modified!(),
            r#",
                ModifiedBy = ?,
                Version = Version + 1
            WHERE Id = ? AND IsDeleted = 0
            "#
        ))
        .bind(stamp.at)
        .bind(stamp.at)
        .bind(stamp.by.as_str())
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        let toggled = result.rows_affected() > 0;
        info!(company_id = %id, toggled, "Toggled company active flag");
        Ok(toggled)
    }

    /// Set `IsActive` to `active`, writing only when the flag actually changes.
    pub async fn set_active(
        &self,
        id: CompanyId,
        active: bool,
    ) -> Result<ActivationOutcome, StoreError> {
        let stamp = self.stamper.for_update();

        let row = sqlx::query(concat!(
            r#"
            UPDATE Companies
            SET IsActive = ?,
                "#,
            advance_modified!(),
            r#",
                ModifiedBy = ?,
                Version = Version + 1
            WHERE Id = ? AND IsDeleted = 0 AND IsActive <> ?
            RETURNING "#,
            company_columns!()
        ))
        .bind(active)
        .bind(stamp.at)
        .bind(stamp.at)
        .bind(stamp.by.as_str())
        .bind(id.as_i64())
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            let company = company_from_row(&row)?;
            info!(company_id = %id, active, "Changed company active flag");
            return Ok(ActivationOutcome::Changed(company));
        }

        Ok(match self.get_by_id(id).await? {
            Some(company) => ActivationOutcome::AlreadyInState(company),
            None => ActivationOutcome::NotFound,
        })
    }

    /// Hide a company from standard read paths.
    pub async fn soft_delete(&self, id: CompanyId) -> Result<bool, StoreError> {
        let stamp = self.stamper.for_update();

        let result = sqlx::query(concat!(
            r#"
            UPDATE Companies
            SET IsDeleted = 1,
                "#,
            advance_modified!(),
            r#",
                ModifiedBy = ?,
                Version = Version + 1
            WHERE Id = ? AND IsDeleted = 0
            "#
        ))
        .bind(stamp.at)
        .bind(stamp.at)
        .bind(stamp.by.as_str())
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        let deleted = result.rows_affected() > 0;
        info!(company_id = %id, deleted, "Soft-deleted company");
        Ok(deleted)
    }

    /// Restore a soft-deleted company. Returns whether any row matched.
    pub async fn undelete(&self, id: CompanyId) -> Result<bool, StoreError> {
        let stamp = self.stamper.for_update();

        let result = sqlx::query(concat!(
            r#"
            UPDATE Companies
            SET IsDeleted = 0,
                "#,
            advance_modified!(),
            r#",
                ModifiedBy = ?,
                Version = Version + 1
            WHERE Id = ? AND IsDeleted = 1
            "#
        ))
        .bind(stamp.at)
        .bind(stamp.at)
        .bind(stamp.by.as_str())
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        let restored = result.rows_affected() > 0;
        info!(company_id = %id, restored, "Undeleted company");
        Ok(restored)
    }

    /// Recycle bin: soft-deleted companies ordered by id.
    pub async fn list_deleted(&self) -> Result<Vec<Company>, StoreError> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            company_columns!(),
            " FROM Companies WHERE IsDeleted = 1 ORDER BY Id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(map_rows(&rows, company_from_row)?)
    }

    /// One window of non-deleted companies ordered by id.
    pub async fn paged_list(&self, page: PageRequest) -> Result<Vec<Company>, StoreError> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            company_columns!(),
            " FROM Companies WHERE IsDeleted = 0 ORDER BY Id ASC LIMIT ? OFFSET ?"
        ))
        .bind(page.size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        debug!(page = page.number(), size = page.size(), returned = rows.len(), "Fetched company page");
        Ok(map_rows(&rows, company_from_row)?)
    }

    /// Active, non-deleted companies per state, largest first.
    pub async fn count_by_state(&self) -> Result<Vec<CompanyCountByState>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT State, COUNT(*) AS CompanyCount
            FROM Companies
            WHERE IsActive = 1 AND IsDeleted = 0
            GROUP BY State
            ORDER BY CompanyCount DESC, State ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(map_rows(&rows, count_by_state_from_row)?)
    }

    /// Load pre-stamped rows one statement at a time, without a transaction.
    ///
    /// Audit fields and flags are taken verbatim from each record; the id is
    /// always assigned by the store. Returns the number of rows inserted.
    pub async fn bulk_insert(&self, companies: &[Company]) -> Result<usize, StoreError> {
        if companies.is_empty() {
            return Ok(0);
        }

        let mut conn = self.pool.acquire().await?;
        let mut inserted = 0usize;

        for company in companies {
            sqlx::query(
                r#"
                INSERT INTO Companies
                    (Name, Street, City, State, PostalCode, IsActive, IsDeleted,
                     Created, Modified, CreatedBy, ModifiedBy, Version)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
                "#,
            )
            .bind(&company.name)
            .bind(&company.street)
            .bind(&company.city)
            .bind(&company.state)
            .bind(&company.postal_code)
            .bind(company.is_active)
            .bind(company.is_deleted)
            .bind(company.audit.created)
            .bind(company.audit.modified)
            .bind(&company.audit.created_by)
            .bind(&company.audit.modified_by)
            .execute(&mut *conn)
            .await?;
            inserted += 1;
        }

        info!(inserted, "Bulk inserted companies");
        Ok(inserted)
    }

    /// Hard-delete every company (and, by cascade, every contact).
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM Companies")
            .execute(&self.pool)
            .await?;

        warn!(removed = result.rows_affected(), "Deleted all companies");
        Ok(result.rows_affected())
    }

    /// Run the configured purge routine for aged soft-deleted companies.
    pub async fn purge_old_deleted(&self) -> Result<u64, StoreError> {
        let removed = self
            .purge
            .run(&self.pool)
            .await
            .map_err(|source| StoreError::Maintenance {
                routine: self.purge.name().to_string(),
                source,
            })?;

        info!(routine = %self.purge.name(), removed, "Maintenance routine completed");
        Ok(removed)
    }
}

#[async_trait]
impl PageSource for CompanyStore {
    type Item = Company;

    async fn fetch_all(&self) -> Result<Vec<Company>, StoreError> {
        self.all().await
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Company>, StoreError> {
        self.paged_list(request).await
    }
}

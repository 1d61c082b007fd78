//! Contact operations scoped to a parent company.

use sqlx::sqlite::SqlitePool;
use tracing::{debug, info, warn};

use super::{advance_modified, contact_columns, contact_from_row, map_rows};
use crate::domain::{AuditStamper, CompanyContact, CompanyId, ContactId, NewContact};
use crate::error::StoreError;

/// Store for contact rows. Field validation is the caller's job; see
/// [`NewContact::validate`].
#[derive(Debug, Clone)]
pub struct ContactStore {
    pool: SqlitePool,
    stamper: AuditStamper,
}

impl ContactStore {
    pub fn new(pool: SqlitePool, stamper: AuditStamper) -> Self {
        ContactStore { pool, stamper }
    }

    pub async fn list_by_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<CompanyContact>, StoreError> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            contact_columns!(),
            " FROM CompanyContacts WHERE CompanyId = ? AND IsDeleted = 0 ORDER BY Id ASC"
        ))
        .bind(company_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        debug!(company_id = %company_id, count = rows.len(), "Listed contacts");
        Ok(map_rows(&rows, contact_from_row)?)
    }

    pub async fn get_by_id(&self, id: ContactId) -> Result<Option<CompanyContact>, StoreError> {
        let row = sqlx::query(concat!(
            "SELECT ",
            contact_columns!(),
            " FROM CompanyContacts WHERE Id = ? AND IsDeleted = 0"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(contact_from_row).transpose()?)
    }

    /// Insert a contact. A `company_id` with no matching company surfaces as
    /// `StoreError::ConstraintViolation` and nothing is written.
    pub async fn insert(&self, contact: &NewContact) -> Result<CompanyContact, StoreError> {
        let audit = self.stamper.for_insert();

        let row = sqlx::query(concat!(
            r#"
            INSERT INTO CompanyContacts
                (CompanyId, Name, Email, MobilePhone, OfficePhone, IsDeleted,
                 Created, Modified, CreatedBy, ModifiedBy, Version)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, ?, 1)
            RETURNING "#,
            contact_columns!()
        ))
        .bind(contact.company_id.as_i64())
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.mobile_phone)
        .bind(&contact.office_phone)
        .bind(audit.created)
        .bind(audit.modified)
        .bind(&audit.created_by)
        .bind(&audit.modified_by)
        .fetch_one(&self.pool)
        .await?;

        let inserted = contact_from_row(&row)?;
        info!(contact_id = %inserted.id, company_id = %inserted.company_id, "Inserted contact");
        Ok(inserted)
    }

    /// Overwrite name, email and phones of a live contact at the caller's
    /// version. `CompanyId` and the created fields are left as stored.
    pub async fn update(
        &self,
        contact: &CompanyContact,
    ) -> Result<Option<CompanyContact>, StoreError> {
        let stamp = self.stamper.for_update();

        let row = sqlx::query(concat!(
            r#"
            UPDATE CompanyContacts
            SET Name = ?,
                Email = ?,
                MobilePhone = ?,
                OfficePhone = ?,
                "#,
            advance_modified!(),
            r#",
                ModifiedBy = ?,
                Version = Version + 1
            WHERE Id = ? AND IsDeleted = 0 AND Version = ?
            RETURNING "#,
            contact_columns!()
        ))
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.mobile_phone)
        .bind(&contact.office_phone)
        .bind(stamp.at)
        .bind(stamp.at)
        .bind(stamp.by.as_str())
        .bind(contact.id.as_i64())
        .bind(contact.version)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            let updated = contact_from_row(&row)?;
            info!(contact_id = %updated.id, version = updated.version, modified_by = %stamp.by, "Updated contact");
            return Ok(Some(updated));
        }

        let actual = sqlx::query_scalar::<_, i64>(
            "SELECT Version FROM CompanyContacts WHERE Id = ? AND IsDeleted = 0",
        )
        .bind(contact.id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match actual {
            Some(actual) => {
                warn!(contact_id = %contact.id, expected = contact.version, actual, "Rejected stale contact update");
                Err(StoreError::Conflict {
                    entity: "contact",
                    id: contact.id.as_i64(),
                    expected: contact.version,
                    actual,
                })
            }
            None => Ok(None),
        }
    }

    /// Mark a live contact deleted. There is no restore path for contacts.
    pub async fn soft_delete(&self, id: ContactId) -> Result<bool, StoreError> {
        let stamp = self.stamper.for_update();

        let result = sqlx::query(concat!(
            r#"
            UPDATE CompanyContacts
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
        info!(contact_id = %id, deleted, "Soft-deleted contact");
        Ok(deleted)
    }
}

//! Repository layer for database operations.
//!
//! Stores are organized by record kind:
//! - `companies.rs` - Company CRUD, activation, soft delete, paging and reports
//! - `contacts.rs` - Contact CRUD and soft delete scoped to a company
//!
//! Every write is a single statement that bumps `Version` and refreshes
//! `Modified`/`ModifiedBy` in place, so no operation holds a read-then-write
//! window open across statements.

mod companies;
mod contacts;

pub use companies::CompanyStore;
pub use contacts::ContactStore;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::{
    AuditFields, Company, CompanyContact, CompanyCountByState, CompanyId, CompanyInfos, ContactId,
};

macro_rules! company_columns {
    () => {
        "Id, Name, Street, City, State, PostalCode, IsActive, IsDeleted, Created, Modified, CreatedBy, ModifiedBy, Version"
    };
}

macro_rules! contact_columns {
    () => {
        "Id, CompanyId, Name, Email, MobilePhone, OfficePhone, IsDeleted, Created, Modified, CreatedBy, ModifiedBy, Version"
    };
}

/// `Modified` assignment for every mutating statement. Binds the new stamp
/// twice; when that stamp is not later than the stored value (two writes in
/// the same millisecond, or a clock behind the last writer) the stored value
/// is advanced by one millisecond instead, so `Modified` strictly increases.
macro_rules! advance_modified {
    () => {
        "Modified = CASE WHEN julianday(?) > julianday(Modified) THEN ? \
         ELSE strftime('%Y-%m-%dT%H:%M:%fZ', julianday(Modified) + 0.001 / 86400.0) END"
    };
}

pub(crate) use advance_modified;
pub(crate) use company_columns;
pub(crate) use contact_columns;

fn audit_from_row(row: &SqliteRow) -> Result<AuditFields, sqlx::Error> {
    Ok(AuditFields {
        created: row.try_get("Created")?,
        modified: row.try_get("Modified")?,
        created_by: row.try_get("CreatedBy")?,
        modified_by: row.try_get("ModifiedBy")?,
    })
}

pub(crate) fn company_from_row(row: &SqliteRow) -> Result<Company, sqlx::Error> {
    Ok(Company {
        id: CompanyId::new(row.try_get("Id")?),
        name: row.try_get("Name")?,
        street: row.try_get("Street")?,
        city: row.try_get("City")?,
        state: row.try_get("State")?,
        postal_code: row.try_get("PostalCode")?,
        is_active: row.try_get("IsActive")?,
        is_deleted: row.try_get("IsDeleted")?,
        audit: audit_from_row(row)?,
        version: row.try_get("Version")?,
    })
}

pub(crate) fn company_infos_from_row(row: &SqliteRow) -> Result<CompanyInfos, sqlx::Error> {
    Ok(CompanyInfos {
        id: CompanyId::new(row.try_get("Id")?),
        name: row.try_get("Name")?,
        street: row.try_get("Street")?,
        city: row.try_get("City")?,
        state: row.try_get("State")?,
        postal_code: row.try_get("PostalCode")?,
        is_active: row.try_get("IsActive")?,
        contact_count: row.try_get("ContactCount")?,
        audit: audit_from_row(row)?,
    })
}

pub(crate) fn count_by_state_from_row(row: &SqliteRow) -> Result<CompanyCountByState, sqlx::Error> {
    Ok(CompanyCountByState {
        state: row.try_get("State")?,
        company_count: row.try_get("CompanyCount")?,
    })
}

pub(crate) fn contact_from_row(row: &SqliteRow) -> Result<CompanyContact, sqlx::Error> {
    Ok(CompanyContact {
        id: ContactId::new(row.try_get("Id")?),
        company_id: CompanyId::new(row.try_get("CompanyId")?),
        name: row.try_get("Name")?,
        email: row.try_get("Email")?,
        mobile_phone: row.try_get("MobilePhone")?,
        office_phone: row.try_get("OfficePhone")?,
        is_deleted: row.try_get("IsDeleted")?,
        audit: audit_from_row(row)?,
        version: row.try_get("Version")?,
    })
}

/// Map every row, stopping at the first decode failure.
pub(crate) fn map_rows<T>(
    rows: &[SqliteRow],
    f: impl Fn(&SqliteRow) -> Result<T, sqlx::Error>,
) -> Result<Vec<T>, sqlx::Error> {
    rows.iter().map(f).collect()
}

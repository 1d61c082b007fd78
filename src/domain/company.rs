//! Company records and their read projections.

use serde::{Deserialize, Serialize};

use super::{AuditFields, CompanyId};

/// A persisted company row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub is_active: bool,
    pub is_deleted: bool,
    #[serde(flatten)]
    pub audit: AuditFields,
    /// Row version; compared and bumped by every write.
    pub version: i64,
}

/// Insert input. Id, audit fields and version are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub is_active: bool,
}

impl NewCompany {
    pub fn new(
        name: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            street: street.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            is_active: true,
        }
    }

    /// True when `company` carries exactly these caller-owned fields.
    pub fn matches(&self, company: &Company) -> bool {
        self.name == company.name
            && self.street == company.street
            && self.city == company.city
            && self.state == company.state
            && self.postal_code == company.postal_code
            && self.is_active == company.is_active
    }
}

/// List-view projection: a non-deleted company plus its live contact count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfos {
    pub id: CompanyId,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub is_active: bool,
    pub contact_count: i64,
    #[serde(flatten)]
    pub audit: AuditFields,
}

/// Number of active, non-deleted companies in one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCountByState {
    pub state: String,
    pub company_count: i64,
}

/// Result of an explicit enable/disable request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The flag was flipped; carries the updated row.
    Changed(Company),
    /// The company already had the requested flag; nothing was written.
    AlreadyInState(Company),
    NotFound,
}

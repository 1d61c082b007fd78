//! Company contacts and the field rules callers enforce before inserting them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use super::{AuditFields, CompanyId, ContactId};

pub const MAX_PHONE_LEN: usize = 15;

/// A persisted contact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyContact {
    pub id: ContactId,
    pub company_id: CompanyId,
    pub name: String,
    pub email: String,
    pub mobile_phone: String,
    pub office_phone: String,
    pub is_deleted: bool,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub version: i64,
}

/// Insert input for a contact under an existing company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub company_id: CompanyId,
    pub name: String,
    pub email: String,
    pub mobile_phone: String,
    pub office_phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required.")]
    MissingName,
    #[error("Invalid Email Format")]
    InvalidEmail,
    #[error("{field} cannot be longer than {max} characters.")]
    PhoneTooLong { field: &'static str, max: usize },
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"))
}

/// Checks the contact field rules shared by insert and update requests.
pub fn validate_contact_fields(
    name: &str,
    email: &str,
    mobile_phone: &str,
    office_phone: &str,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if !email_pattern().is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if mobile_phone.chars().count() > MAX_PHONE_LEN {
        return Err(ValidationError::PhoneTooLong {
            field: "Mobile phone number",
            max: MAX_PHONE_LEN,
        });
    }
    if office_phone.chars().count() > MAX_PHONE_LEN {
        return Err(ValidationError::PhoneTooLong {
            field: "Office phone number",
            max: MAX_PHONE_LEN,
        });
    }
    Ok(())
}

impl NewContact {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_contact_fields(&self.name, &self.email, &self.mobile_phone, &self.office_phone)
    }

    pub fn matches(&self, contact: &CompanyContact) -> bool {
        self.company_id == contact.company_id
            && self.name == contact.name
            && self.email == contact.email
            && self.mobile_phone == contact.mobile_phone
            && self.office_phone == contact.office_phone
    }
}

impl CompanyContact {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_contact_fields(&self.name, &self.email, &self.mobile_phone, &self.office_phone)
    }
}

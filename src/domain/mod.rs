//! Domain types for company and contact records.
//!
//! This module provides:
//! - Identifier and principal primitives: CompanyId, ContactId, Actor
//! - Audit stamping (created/modified timestamps and attribution)
//! - Company, CompanyInfos and CompanyCountByState records
//! - CompanyContact records and contact field validation

pub mod audit;
pub mod company;
pub mod contact;
pub mod primitives;

pub use audit::{ActorResolver, AuditFields, AuditStamper, Clock, FixedActor, Modification, SystemClock};
pub use company::{ActivationOutcome, Company, CompanyCountByState, CompanyInfos, NewCompany};
pub use contact::{CompanyContact, NewContact, ValidationError};
pub use primitives::{Actor, CompanyId, ContactId};

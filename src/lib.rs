pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod paging;

pub use config::Config;
pub use db::{init_db, CompanyStore, ContactStore, MaintenanceRoutine, RetentionPurge};
pub use domain::{
    ActivationOutcome, Actor, AuditFields, AuditStamper, Company, CompanyContact,
    CompanyCountByState, CompanyId, CompanyInfos, ContactId, NewCompany, NewContact,
};
pub use error::StoreError;
pub use paging::{Page, PageRequest, PageSource, Pager, PagingStrategy};

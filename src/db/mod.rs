//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - Company and contact stores
//! - Maintenance routines invoked through the company store

pub mod maintenance;
pub mod migrations;
pub mod repo;

pub use maintenance::{MaintenanceRoutine, RetentionPurge, PURGE_OLD_DELETED_COMPANIES};
pub use migrations::init_db;
pub use repo::{CompanyStore, ContactStore};

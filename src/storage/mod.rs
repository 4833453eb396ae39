mod files;
mod repository;

pub use files::*;
pub use repository::*;

/// SQL migration for companies and documents
pub const MIGRATION_001_COMPANIES: &str = include_str!("migrations/001_companies.sql");

/// SQL migration for the report source tables
pub const MIGRATION_002_REPORTING: &str = include_str!("migrations/002_reporting.sql");

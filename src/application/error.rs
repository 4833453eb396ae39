use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{AmountOverflow, CompanyId, DocumentId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),

    #[error("Document {document_id} not found for company {company_id}")]
    DocumentNotFound {
        company_id: CompanyId,
        document_id: DocumentId,
    },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid PAN number format: {0}")]
    InvalidPan(String),

    #[error("Invalid GST number format: {0}")]
    InvalidGst(String),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("A company with {field} '{value}' already exists")]
    CompanyConflict { field: &'static str, value: String },

    #[error("Company {company_id} still has {count} document(s); delete them first")]
    CompanyHasDocuments { company_id: CompanyId, count: i64 },

    #[error("No file part in request")]
    MissingFile,

    #[error("Invalid or empty filename: '{0}'")]
    InvalidFilename(String),

    #[error("Invalid {field}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid date range: from_date {from} is after to_date {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("Stored amounts out of range: {0}")]
    AmountOverflow(#[from] AmountOverflow),

    #[error("File storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

/// Coarse error classes used by outer layers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Store,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::CompanyNotFound(_) | AppError::DocumentNotFound { .. } => {
                ErrorKind::NotFound
            }
            AppError::CompanyConflict { .. } | AppError::CompanyHasDocuments { .. } => {
                ErrorKind::Conflict
            }
            AppError::MissingField(_)
            | AppError::InvalidPan(_)
            | AppError::InvalidGst(_)
            | AppError::NoFieldsToUpdate
            | AppError::MissingFile
            | AppError::InvalidFilename(_)
            | AppError::InvalidDate { .. }
            | AppError::InvalidDateRange { .. } => ErrorKind::Validation,
            AppError::AmountOverflow(_) | AppError::Storage(_) | AppError::Database(_) => {
                ErrorKind::Store
            }
        }
    }
}

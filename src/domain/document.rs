use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CompanyId;

pub type DocumentId = i64;

/// Uploader recorded when the client does not name one.
pub const DEFAULT_UPLOADER: &str = "System";

/// Metadata for a file attached to a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDocument {
    pub document_id: DocumentId,
    pub company_id: CompanyId,
    pub document_name: String,
    /// Storage key relative to the upload root
    pub file_path: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A document row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub company_id: CompanyId,
    pub document_name: String,
    pub file_path: String,
    pub uploaded_by: String,
}

impl NewDocument {
    /// Build the row for a sanitized filename, choosing a storage key that
    /// cannot collide with earlier uploads of the same name.
    pub fn new(company_id: CompanyId, document_name: String, uploaded_by: Option<String>) -> Self {
        let file_path = format!(
            "{}/{}_{}",
            company_id,
            Uuid::new_v4().simple(),
            document_name
        );
        let uploaded_by = uploaded_by
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOADER.to_string());

        Self {
            company_id,
            document_name,
            file_path,
            uploaded_by,
        }
    }
}

/// Reduce a client-supplied filename to a safe storage name.
///
/// Path separators become word breaks, whitespace runs collapse to `_`,
/// and anything outside `[A-Za-z0-9._-]` is dropped. Leading and trailing
/// dots and underscores are stripped so the result can never be `.`,
/// `..` or a hidden file. Returns `None` when nothing usable is left.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let spaced: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

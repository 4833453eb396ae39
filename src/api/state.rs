//! Application State
//!
//! Arc-wrapped services shared across handlers.

use std::sync::Arc;

use crate::application::{CompanyService, DocumentService, ReportService};
use crate::storage::{LocalFileStore, Repository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    companies: CompanyService,
    documents: DocumentService<LocalFileStore>,
    reports: ReportService,
}

impl AppState {
    /// Build every service over one repository and one file store.
    pub fn new(repo: Repository, files: LocalFileStore) -> Self {
        Self {
            inner: Arc::new(InnerState {
                companies: CompanyService::new(repo.clone()),
                documents: DocumentService::new(repo.clone(), files),
                reports: ReportService::new(repo),
            }),
        }
    }

    pub fn companies(&self) -> &CompanyService {
        &self.inner.companies
    }

    pub fn documents(&self) -> &DocumentService<LocalFileStore> {
        &self.inner.documents
    }

    pub fn reports(&self) -> &ReportService {
        &self.inner.reports
    }
}

use std::io;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{CompanyDocument, CompanyId, DocumentId, NewDocument, sanitize_filename};
use crate::storage::{FileStore, LocalFileStore, Repository, is_foreign_key_violation};

use super::AppError;

/// A file received from a client, before it is stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Document metadata plus the physical files behind it.
#[derive(Clone)]
pub struct DocumentService<F = LocalFileStore> {
    repo: Repository,
    files: F,
}

impl<F: FileStore> DocumentService<F> {
    pub fn new(repo: Repository, files: F) -> Self {
        Self { repo, files }
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    /// List a company's documents, oldest first.
    pub async fn list(&self, company_id: CompanyId) -> Result<Vec<CompanyDocument>, AppError> {
        Ok(self.repo.list_documents(company_id).await?)
    }

    pub async fn get(
        &self,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> Result<CompanyDocument, AppError> {
        self.repo
            .get_document(company_id, document_id)
            .await?
            .ok_or(AppError::DocumentNotFound {
                company_id,
                document_id,
            })
    }

    /// Store an uploaded file and record its metadata.
    ///
    /// The company reference is enforced by the store; a missing company
    /// surfaces as [`AppError::CompanyNotFound`] and the stored bytes are
    /// removed again.
    pub async fn upload(
        &self,
        company_id: CompanyId,
        file: Option<UploadedFile>,
        uploaded_by: Option<String>,
    ) -> Result<CompanyDocument, AppError> {
        let file = file.ok_or(AppError::MissingFile)?;
        let document_name = sanitize_filename(&file.filename)
            .ok_or_else(|| AppError::InvalidFilename(file.filename.clone()))?;

        let new_document = NewDocument::new(company_id, document_name, uploaded_by);
        self.files.save(&new_document.file_path, &file.bytes).await?;

        match self.insert(&new_document).await {
            Ok(document) => {
                info!(
                    company_id,
                    document_id = document.document_id,
                    file_path = %document.file_path,
                    "stored document"
                );
                Ok(document)
            }
            Err(err) => {
                if let Err(cleanup) = self.files.remove(&new_document.file_path).await {
                    warn!(
                        file_path = %new_document.file_path,
                        error = %cleanup,
                        "failed to remove orphaned upload"
                    );
                }
                Err(err)
            }
        }
    }

    async fn insert(&self, document: &NewDocument) -> Result<CompanyDocument, AppError> {
        let mut tx = self.repo.begin().await?;
        let stored = Repository::insert_document(&mut tx, document, Utc::now())
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    AppError::CompanyNotFound(document.company_id)
                } else {
                    AppError::Database(err)
                }
            })?;
        tx.commit().await.context("Failed to commit document")?;
        Ok(stored)
    }

    /// Delete a document and its file.
    ///
    /// The row delete only commits after the file is gone. A file that is
    /// already missing does not block the delete.
    pub async fn delete(
        &self,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> Result<(), AppError> {
        let not_found = AppError::DocumentNotFound {
            company_id,
            document_id,
        };

        let mut tx = self.repo.begin().await?;
        let Some(document) = Repository::fetch_document(&mut tx, company_id, document_id).await?
        else {
            return Err(not_found);
        };

        if Repository::delete_document(&mut tx, company_id, document_id).await? == 0 {
            return Err(not_found);
        }

        match self.files.remove(&document.file_path).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(file_path = %document.file_path, "document file already missing");
            }
            Err(err) => return Err(err.into()),
        }

        tx.commit().await.context("Failed to commit document delete")?;

        info!(company_id, document_id, "deleted document");
        Ok(())
    }
}

use anyhow::Context;
use chrono::Utc;
use sqlx::sqlite::SqliteConnection;
use tracing::info;

use crate::domain::{
    Company, CompanyId, CompanyPatch, NewCompany, normalize_identifier, validate_gst, validate_pan,
};
use crate::storage::{Repository, UniqueCompanyField, is_unique_violation};

use super::AppError;

/// Create, read, update and delete companies.
#[derive(Clone)]
pub struct CompanyService {
    repo: Repository,
}

impl CompanyService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// List all companies, oldest first.
    pub async fn list(&self) -> Result<Vec<Company>, AppError> {
        Ok(self.repo.list_companies().await?)
    }

    /// Get a company by id.
    pub async fn get(&self, id: CompanyId) -> Result<Company, AppError> {
        self.repo
            .get_company(id)
            .await?
            .ok_or(AppError::CompanyNotFound(id))
    }

    /// Validate and insert a new company.
    pub async fn create(&self, input: NewCompany) -> Result<Company, AppError> {
        let company_name = required(input.company_name, "company_name")?;
        let pan_number = checked_pan(&required(input.pan_number, "pan_number")?)?;
        let gst_number = non_blank(input.gst_number)
            .map(|gst| checked_gst(&gst))
            .transpose()?;

        let now = Utc::now();
        let company = Company {
            company_id: 0, // Assigned by the store
            company_name,
            pan_number,
            gst_number,
            mca_reg_details: input.mca_reg_details,
            address: input.address,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.repo.begin().await?;
        ensure_unique(&mut tx, &company, None).await?;

        let created = Repository::insert_company(&mut tx, &company)
            .await
            .map_err(|err| store_conflict(err, &company))?;
        tx.commit().await.context("Failed to commit company")?;

        info!(company_id = created.company_id, "created company");
        Ok(created)
    }

    /// Apply a partial update. Only supplied fields change; `updated_at`
    /// always moves forward.
    pub async fn update(&self, id: CompanyId, patch: CompanyPatch) -> Result<Company, AppError> {
        if patch.is_empty() {
            return Err(AppError::NoFieldsToUpdate);
        }
        let patch = checked_patch(patch)?;

        let mut tx = self.repo.begin().await?;
        let existing = Repository::fetch_company(&mut tx, id)
            .await?
            .ok_or(AppError::CompanyNotFound(id))?;

        let mut merged = patch.apply_to(&existing);
        merged.updated_at = Utc::now().max(existing.updated_at);
        ensure_unique(&mut tx, &merged, Some(id)).await?;

        let updated = Repository::update_company(&mut tx, &merged)
            .await
            .map_err(|err| store_conflict(err, &merged))?
            .ok_or(AppError::CompanyNotFound(id))?;
        tx.commit().await.context("Failed to commit company update")?;

        info!(company_id = id, "updated company");
        Ok(updated)
    }

    /// Delete a company. Companies that still own documents are kept and
    /// the call fails with [`AppError::CompanyHasDocuments`].
    pub async fn delete(&self, id: CompanyId) -> Result<(), AppError> {
        let mut tx = self.repo.begin().await?;

        if Repository::fetch_company(&mut tx, id).await?.is_none() {
            return Err(AppError::CompanyNotFound(id));
        }

        let count = Repository::count_documents(&mut tx, id).await?;
        if count > 0 {
            return Err(AppError::CompanyHasDocuments {
                company_id: id,
                count,
            });
        }

        if Repository::delete_company(&mut tx, id).await? == 0 {
            return Err(AppError::CompanyNotFound(id));
        }
        tx.commit().await.context("Failed to commit company delete")?;

        info!(company_id = id, "deleted company");
        Ok(())
    }
}

async fn ensure_unique(
    conn: &mut SqliteConnection,
    company: &Company,
    except: Option<CompanyId>,
) -> Result<(), AppError> {
    let checks = [
        (UniqueCompanyField::CompanyName, &company.company_name),
        (UniqueCompanyField::PanNumber, &company.pan_number),
    ];

    for (field, value) in checks {
        if Repository::company_field_taken(conn, field, value, except).await? {
            return Err(AppError::CompanyConflict {
                field: field.as_str(),
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Translate a unique violation raised by the store (a concurrent writer
/// slipped past the pre-check) into a conflict.
fn store_conflict(err: anyhow::Error, company: &Company) -> AppError {
    if !is_unique_violation(&err) {
        return AppError::Database(err);
    }

    let message = format!("{:#}", err);
    if message.contains(UniqueCompanyField::PanNumber.as_str()) {
        AppError::CompanyConflict {
            field: UniqueCompanyField::PanNumber.as_str(),
            value: company.pan_number.clone(),
        }
    } else {
        AppError::CompanyConflict {
            field: UniqueCompanyField::CompanyName.as_str(),
            value: company.company_name.clone(),
        }
    }
}

fn checked_patch(mut patch: CompanyPatch) -> Result<CompanyPatch, AppError> {
    if let Some(name) = patch.company_name.take() {
        patch.company_name = Some(required(Some(name), "company_name")?);
    }
    if let Some(pan) = patch.pan_number.take() {
        patch.pan_number = Some(checked_pan(&pan)?);
    }
    if let Some(gst) = patch.gst_number.take() {
        patch.gst_number = Some(non_blank(gst).map(|gst| checked_gst(&gst)).transpose()?);
    }
    Ok(patch)
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    non_blank(value)
        .map(|v| v.trim().to_string())
        .ok_or(AppError::MissingField(field))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn checked_pan(raw: &str) -> Result<String, AppError> {
    if validate_pan(raw) {
        Ok(normalize_identifier(raw))
    } else {
        Err(AppError::InvalidPan(raw.to_string()))
    }
}

fn checked_gst(raw: &str) -> Result<String, AppError> {
    if validate_gst(raw) {
        Ok(normalize_identifier(raw))
    } else {
        Err(AppError::InvalidGst(raw.to_string()))
    }
}

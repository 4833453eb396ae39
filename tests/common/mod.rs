// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use pmbackend::api::AppState;
use pmbackend::application::{CompanyService, DocumentService, ReportService};
use pmbackend::domain::{BankTransaction, Cents, EntityId, KittyEntry, NewCompany};
use pmbackend::storage::{LocalFileStore, Repository};
use tempfile::TempDir;

/// Temporary database plus upload directory, removed on drop.
pub struct TestEnv {
    pub repo: Repository,
    pub files: LocalFileStore,
    pub dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let db_url = format!("sqlite:{}", dir.path().join("test.db").display());
        let repo = Repository::init(&db_url, 4).await?;
        let files = LocalFileStore::new(dir.path().join("uploads"));
        Ok(Self { repo, files, dir })
    }

    pub fn companies(&self) -> CompanyService {
        CompanyService::new(self.repo.clone())
    }

    pub fn documents(&self) -> DocumentService {
        DocumentService::new(self.repo.clone(), self.files.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.repo.clone())
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.repo.clone(), self.files.clone())
    }

    /// Create a company with only the required fields.
    pub async fn company(&self, name: &str, pan: &str) -> Result<i64> {
        let company = self.companies().create(NewCompany::new(name, pan)).await?;
        Ok(company.company_id)
    }
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn bank_txn(
    entity_id: EntityId,
    date: &str,
    credit: Cents,
    debit: Cents,
    narration: &str,
) -> BankTransaction {
    BankTransaction {
        transaction_id: 0,
        entity_id,
        txn_date: parse_date(date),
        narration: Some(narration.to_string()),
        transaction_type: "Sales".to_string(),
        credit_amount: credit,
        debit_amount: debit,
        remarks: None,
    }
}

pub fn kitty_entry(
    entity_id: EntityId,
    date: &str,
    amount: Cents,
    margin: Cents,
    remarks: &str,
) -> KittyEntry {
    KittyEntry {
        kitty_id: 0,
        entity_id,
        date_of_expense: parse_date(date),
        transaction_type: "Office Expense".to_string(),
        amount,
        margin,
        remarks: Some(remarks.to_string()),
    }
}

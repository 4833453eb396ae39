use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::domain::{
    BankTransaction, Company, CompanyDocument, CompanyId, DocumentId, EntityId, KittyEntry,
    NewDocument,
};

use super::{MIGRATION_001_COMPANIES, MIGRATION_002_REPORTING};

const COMPANY_COLUMNS: &str = "company_id, company_name, pan_number, gst_number, mca_reg_details, address, notes, created_at, updated_at";

const DOCUMENT_COLUMNS: &str =
    "document_id, company_id, document_name, file_path, uploaded_by, uploaded_at";

/// Company columns that carry a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueCompanyField {
    CompanyName,
    PanNumber,
}

impl UniqueCompanyField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueCompanyField::CompanyName => "company_name",
            UniqueCompanyField::PanNumber => "pan_number",
        }
    }
}

/// Repository for companies, their documents, and the report sources.
///
/// Reads go straight to the pool. Writes are associated functions over a
/// `SqliteConnection` so callers can run several of them inside one
/// transaction obtained from [`Repository::begin`].
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the database behind `database_url`, creating the file if
    /// needed. Foreign keys are enforced on every pooled connection.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create any missing tables. Safe to run on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_COMPANIES)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::raw_sql(MIGRATION_002_REPORTING)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str, max_connections: u32) -> Result<Self> {
        let repo = Self::connect(database_url, max_connections).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Start a write transaction. Dropping it without commit rolls back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .context("Failed to begin transaction")
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Company operations
    // ========================

    /// List all companies ordered by id.
    pub async fn list_companies(&self) -> Result<Vec<Company>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM companies ORDER BY company_id",
            COMPANY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list companies")?;

        rows.iter().map(Self::row_to_company).collect()
    }

    /// Get a company by id.
    pub async fn get_company(&self, id: CompanyId) -> Result<Option<Company>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection")?;
        Self::fetch_company(&mut conn, id).await
    }

    pub async fn fetch_company(conn: &mut SqliteConnection, id: CompanyId) -> Result<Option<Company>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM companies WHERE company_id = ?",
            COMPANY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .context("Failed to fetch company")?;

        row.as_ref().map(Self::row_to_company).transpose()
    }

    /// Check whether another company already holds `value` in a unique column.
    pub async fn company_field_taken(
        conn: &mut SqliteConnection,
        field: UniqueCompanyField,
        value: &str,
        except: Option<CompanyId>,
    ) -> Result<bool> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM companies WHERE {} = ? AND company_id != ?) AS taken",
            field.as_str()
        );

        let row = sqlx::query(&query)
            .bind(value)
            .bind(except.unwrap_or(-1))
            .fetch_one(conn)
            .await
            .context("Failed to check company uniqueness")?;

        Ok(row.get::<i64, _>("taken") != 0)
    }

    /// Insert a company. The id on `company` is ignored; the stored row,
    /// including its generated id, is returned.
    pub async fn insert_company(conn: &mut SqliteConnection, company: &Company) -> Result<Company> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO companies (company_name, pan_number, gst_number, mca_reg_details, address, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(&company.company_name)
        .bind(&company.pan_number)
        .bind(&company.gst_number)
        .bind(&company.mca_reg_details)
        .bind(&company.address)
        .bind(&company.notes)
        .bind(company.created_at.to_rfc3339())
        .bind(company.updated_at.to_rfc3339())
        .fetch_one(conn)
        .await
        .context("Failed to insert company")?;

        Self::row_to_company(&row)
    }

    /// Overwrite every mutable column of an existing company.
    /// Returns `None` when no row has that id.
    pub async fn update_company(
        conn: &mut SqliteConnection,
        company: &Company,
    ) -> Result<Option<Company>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE companies
            SET company_name = ?, pan_number = ?, gst_number = ?, mca_reg_details = ?,
                address = ?, notes = ?, updated_at = ?
            WHERE company_id = ?
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(&company.company_name)
        .bind(&company.pan_number)
        .bind(&company.gst_number)
        .bind(&company.mca_reg_details)
        .bind(&company.address)
        .bind(&company.notes)
        .bind(company.updated_at.to_rfc3339())
        .bind(company.company_id)
        .fetch_optional(conn)
        .await
        .context("Failed to update company")?;

        row.as_ref().map(Self::row_to_company).transpose()
    }

    /// Delete a company, returning the number of rows removed.
    pub async fn delete_company(conn: &mut SqliteConnection, id: CompanyId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM companies WHERE company_id = ?")
            .bind(id)
            .execute(conn)
            .await
            .context("Failed to delete company")?;
        Ok(result.rows_affected())
    }

    fn row_to_company(row: &SqliteRow) -> Result<Company> {
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(Company {
            company_id: row.get("company_id"),
            company_name: row.get("company_name"),
            pan_number: row.get("pan_number"),
            gst_number: row.get("gst_number"),
            mca_reg_details: row.get("mca_reg_details"),
            address: row.get("address"),
            notes: row.get("notes"),
            created_at: parse_timestamp(&created_at_str).context("Invalid created_at timestamp")?,
            updated_at: parse_timestamp(&updated_at_str).context("Invalid updated_at timestamp")?,
        })
    }

    // ========================
    // Document operations
    // ========================

    /// List documents for a company ordered by id.
    pub async fn list_documents(&self, company_id: CompanyId) -> Result<Vec<CompanyDocument>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM company_documents WHERE company_id = ? ORDER BY document_id",
            DOCUMENT_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list documents")?;

        rows.iter().map(Self::row_to_document).collect()
    }

    /// Get a document scoped to its company.
    pub async fn get_document(
        &self,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> Result<Option<CompanyDocument>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection")?;
        Self::fetch_document(&mut conn, company_id, document_id).await
    }

    pub async fn fetch_document(
        conn: &mut SqliteConnection,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> Result<Option<CompanyDocument>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM company_documents WHERE company_id = ? AND document_id = ?",
            DOCUMENT_COLUMNS
        ))
        .bind(company_id)
        .bind(document_id)
        .fetch_optional(conn)
        .await
        .context("Failed to fetch document")?;

        row.as_ref().map(Self::row_to_document).transpose()
    }

    /// Count documents attached to a company.
    pub async fn count_documents(conn: &mut SqliteConnection, company_id: CompanyId) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM company_documents WHERE company_id = ?")
            .bind(company_id)
            .fetch_one(conn)
            .await
            .context("Failed to count documents")?;
        Ok(row.get("count"))
    }

    pub async fn insert_document(
        conn: &mut SqliteConnection,
        document: &NewDocument,
        uploaded_at: DateTime<Utc>,
    ) -> Result<CompanyDocument> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO company_documents (company_id, document_name, file_path, uploaded_by, uploaded_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(document.company_id)
        .bind(&document.document_name)
        .bind(&document.file_path)
        .bind(&document.uploaded_by)
        .bind(uploaded_at.to_rfc3339())
        .fetch_one(conn)
        .await
        .context("Failed to insert document")?;

        Self::row_to_document(&row)
    }

    pub async fn delete_document(
        conn: &mut SqliteConnection,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM company_documents WHERE company_id = ? AND document_id = ?")
                .bind(company_id)
                .bind(document_id)
                .execute(conn)
                .await
                .context("Failed to delete document")?;
        Ok(result.rows_affected())
    }

    fn row_to_document(row: &SqliteRow) -> Result<CompanyDocument> {
        let uploaded_at_str: String = row.get("uploaded_at");

        Ok(CompanyDocument {
            document_id: row.get("document_id"),
            company_id: row.get("company_id"),
            document_name: row.get("document_name"),
            file_path: row.get("file_path"),
            uploaded_by: row.get("uploaded_by"),
            uploaded_at: parse_timestamp(&uploaded_at_str)
                .context("Invalid uploaded_at timestamp")?,
        })
    }

    // ========================
    // Report sources
    // ========================

    /// Get the id of a transaction type, creating it on first use.
    pub async fn ensure_transaction_type(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
        sqlx::query("INSERT INTO transaction_types (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(&mut *conn)
            .await
            .context("Failed to register transaction type")?;

        let row = sqlx::query("SELECT transaction_type_id FROM transaction_types WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *conn)
            .await
            .context("Failed to fetch transaction type")?;
        Ok(row.get("transaction_type_id"))
    }

    /// Record a classified bank transaction. `transaction_id` on the input is
    /// ignored; the generated id is returned.
    pub async fn insert_bank_transaction(&self, txn: &BankTransaction) -> Result<i64> {
        let mut tx = self.begin().await?;
        let type_id = Self::ensure_transaction_type(&mut tx, &txn.transaction_type).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO classified_transactions (entity_id, txn_date, narration, transaction_type_id, credit_amount, debit_amount, remarks)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING transaction_id
            "#,
        )
        .bind(txn.entity_id)
        .bind(txn.txn_date.to_string())
        .bind(&txn.narration)
        .bind(type_id)
        .bind(txn.credit_amount)
        .bind(txn.debit_amount)
        .bind(&txn.remarks)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert bank transaction")?;

        tx.commit().await.context("Failed to commit bank transaction")?;
        Ok(row.get("transaction_id"))
    }

    /// Record a kitty register entry. `kitty_id` on the input is ignored.
    pub async fn insert_kitty_entry(&self, entry: &KittyEntry) -> Result<i64> {
        let mut tx = self.begin().await?;
        let type_id = Self::ensure_transaction_type(&mut tx, &entry.transaction_type).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO kitty_register (entity_id, date_of_expense, transaction_type_id, amount, margin, remarks)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING kitty_id
            "#,
        )
        .bind(entry.entity_id)
        .bind(entry.date_of_expense.to_string())
        .bind(type_id)
        .bind(entry.amount)
        .bind(entry.margin)
        .bind(&entry.remarks)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert kitty entry")?;

        tx.commit().await.context("Failed to commit kitty entry")?;
        Ok(row.get("kitty_id"))
    }

    /// Bank transactions for an entity within an inclusive date range,
    /// ordered by date then id.
    pub async fn list_bank_transactions(
        &self,
        entity_id: EntityId,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<Vec<BankTransaction>> {
        let rows = sqlx::query(
            r#"
            SELECT ct.transaction_id, ct.entity_id, ct.txn_date, ct.narration,
                   tt.name AS transaction_type, ct.credit_amount, ct.debit_amount, ct.remarks
            FROM classified_transactions ct
            JOIN transaction_types tt ON ct.transaction_type_id = tt.transaction_type_id
            WHERE ct.entity_id = ? AND ct.txn_date BETWEEN ? AND ?
            ORDER BY ct.txn_date, ct.transaction_id
            "#,
        )
        .bind(entity_id)
        .bind(from_date.to_string())
        .bind(to_date.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list bank transactions")?;

        rows.iter().map(Self::row_to_bank_transaction).collect()
    }

    /// Kitty register entries for an entity within an inclusive date range,
    /// ordered by date then id.
    pub async fn list_kitty_entries(
        &self,
        entity_id: EntityId,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<Vec<KittyEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT kr.kitty_id, kr.entity_id, kr.date_of_expense, tt.name AS transaction_type,
                   kr.amount, kr.margin, kr.remarks
            FROM kitty_register kr
            JOIN transaction_types tt ON kr.transaction_type_id = tt.transaction_type_id
            WHERE kr.entity_id = ? AND kr.date_of_expense BETWEEN ? AND ?
            ORDER BY kr.date_of_expense, kr.kitty_id
            "#,
        )
        .bind(entity_id)
        .bind(from_date.to_string())
        .bind(to_date.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list kitty entries")?;

        rows.iter().map(Self::row_to_kitty_entry).collect()
    }

    fn row_to_bank_transaction(row: &SqliteRow) -> Result<BankTransaction> {
        let txn_date_str: String = row.get("txn_date");

        Ok(BankTransaction {
            transaction_id: row.get("transaction_id"),
            entity_id: row.get("entity_id"),
            txn_date: parse_date(&txn_date_str).context("Invalid txn_date")?,
            narration: row.get("narration"),
            transaction_type: row.get("transaction_type"),
            credit_amount: row.get("credit_amount"),
            debit_amount: row.get("debit_amount"),
            remarks: row.get("remarks"),
        })
    }

    fn row_to_kitty_entry(row: &SqliteRow) -> Result<KittyEntry> {
        let date_str: String = row.get("date_of_expense");

        Ok(KittyEntry {
            kitty_id: row.get("kitty_id"),
            entity_id: row.get("entity_id"),
            date_of_expense: parse_date(&date_str).context("Invalid date_of_expense")?,
            transaction_type: row.get("transaction_type"),
            amount: row.get("amount"),
            margin: row.get("margin"),
            remarks: row.get("remarks"),
        })
    }
}

/// True when the error chain holds a store unique-constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    database_error(err).is_some_and(|e| e.is_unique_violation())
}

/// True when the error chain holds a store foreign-key violation.
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    database_error(err).is_some_and(|e| e.is_foreign_key_violation())
}

fn database_error(err: &anyhow::Error) -> Option<&(dyn sqlx::error::DatabaseError + 'static)> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .and_then(sqlx::Error::as_database_error)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
}

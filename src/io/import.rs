use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;

use crate::domain::{BankTransaction, Cents, KittyEntry, parse_cents};
use crate::storage::Repository;

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// A row that could not be imported
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Parse and validate only
    pub dry_run: bool,
}

/// `entity_id,txn_date,narration,transaction_type,credit_amount,debit_amount,remarks`
#[derive(Debug, Deserialize)]
struct BankRow {
    entity_id: i64,
    txn_date: String,
    #[serde(default)]
    narration: Option<String>,
    transaction_type: String,
    #[serde(default)]
    credit_amount: Option<String>,
    #[serde(default)]
    debit_amount: Option<String>,
    #[serde(default)]
    remarks: Option<String>,
}

/// `entity_id,date_of_expense,transaction_type,amount,margin,remarks`
#[derive(Debug, Deserialize)]
struct KittyRow {
    entity_id: i64,
    date_of_expense: String,
    transaction_type: String,
    amount: String,
    #[serde(default)]
    margin: Option<String>,
    #[serde(default)]
    remarks: Option<String>,
}

/// Loads report source rows from CSV.
pub struct Importer<'a> {
    repo: &'a Repository,
}

impl<'a> Importer<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Import classified bank transactions.
    pub async fn import_bank_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut result = ImportResult::default();

        for (index, row) in csv_reader.deserialize::<BankRow>().enumerate() {
            let line = index + 2; // header + 1-based
            let txn = match row
                .map_err(|e| row_error(line, None, format!("CSV parse error: {}", e)))
                .and_then(|row| bank_transaction(line, row))
            {
                Ok(txn) => txn,
                Err(err) => {
                    result.errors.push(err);
                    continue;
                }
            };

            if !options.dry_run {
                if let Err(e) = self.repo.insert_bank_transaction(&txn).await {
                    result
                        .errors
                        .push(row_error(line, None, format!("{:#}", e)));
                    continue;
                }
            }
            result.imported += 1;
        }

        Ok(result)
    }

    /// Import kitty register entries.
    pub async fn import_kitty_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut result = ImportResult::default();

        for (index, row) in csv_reader.deserialize::<KittyRow>().enumerate() {
            let line = index + 2;
            let entry = match row
                .map_err(|e| row_error(line, None, format!("CSV parse error: {}", e)))
                .and_then(|row| kitty_entry(line, row))
            {
                Ok(entry) => entry,
                Err(err) => {
                    result.errors.push(err);
                    continue;
                }
            };

            if !options.dry_run {
                if let Err(e) = self.repo.insert_kitty_entry(&entry).await {
                    result
                        .errors
                        .push(row_error(line, None, format!("{:#}", e)));
                    continue;
                }
            }
            result.imported += 1;
        }

        Ok(result)
    }
}

fn bank_transaction(line: usize, row: BankRow) -> Result<BankTransaction, ImportError> {
    Ok(BankTransaction {
        transaction_id: 0,
        entity_id: row.entity_id,
        txn_date: date_field(line, "txn_date", &row.txn_date)?,
        narration: blank_to_none(row.narration),
        transaction_type: type_field(line, row.transaction_type)?,
        credit_amount: amount_field(line, "credit_amount", row.credit_amount.as_deref())?,
        debit_amount: amount_field(line, "debit_amount", row.debit_amount.as_deref())?,
        remarks: blank_to_none(row.remarks),
    })
}

fn kitty_entry(line: usize, row: KittyRow) -> Result<KittyEntry, ImportError> {
    let amount = required_amount_field(line, "amount", &row.amount)?;
    let margin = amount_field(line, "margin", row.margin.as_deref())?;
    // The report debits amount + margin
    if amount.checked_add(margin).is_none() {
        return Err(row_error(
            line,
            Some("margin"),
            "Amount plus margin is out of range".to_string(),
        ));
    }

    Ok(KittyEntry {
        kitty_id: 0,
        entity_id: row.entity_id,
        date_of_expense: date_field(line, "date_of_expense", &row.date_of_expense)?,
        transaction_type: type_field(line, row.transaction_type)?,
        amount,
        margin,
        remarks: blank_to_none(row.remarks),
    })
}

fn date_field(line: usize, field: &str, value: &str) -> Result<NaiveDate, ImportError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| row_error(line, Some(field), format!("Invalid date '{}': {}", value, e)))
}

fn amount_field(line: usize, field: &str, value: Option<&str>) -> Result<Cents, ImportError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(0),
        Some(v) => parse_cents(v)
            .map_err(|e| row_error(line, Some(field), format!("Invalid amount: {}", e))),
    }
}

fn required_amount_field(line: usize, field: &str, value: &str) -> Result<Cents, ImportError> {
    if value.trim().is_empty() {
        return Err(row_error(line, Some(field), "Amount is required".to_string()));
    }
    amount_field(line, field, Some(value))
}

fn type_field(line: usize, value: String) -> Result<String, ImportError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(row_error(
            line,
            Some("transaction_type"),
            "Transaction type is required".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn row_error(line: usize, field: Option<&str>, error: String) -> ImportError {
    ImportError {
        line,
        field: field.map(str::to_string),
        error,
    }
}

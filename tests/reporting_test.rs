mod common;

use anyhow::Result;
use common::{TestEnv, bank_txn, kitty_entry, parse_date};
use pmbackend::application::AppError;
use pmbackend::domain::LedgerEntryType;

#[tokio::test]
async fn test_entity_summary_merges_sources_by_date() -> Result<()> {
    let env = TestEnv::new().await?;
    env.repo
        .insert_bank_transaction(&bank_txn(1, "2024-01-05", 100, 0, "Invoice 17"))
        .await?;
    env.repo
        .insert_kitty_entry(&kitty_entry(1, "2024-01-03", 50, 5, "Courier"))
        .await?;

    let entries = env
        .reports()
        .entity_summary(1, parse_date("2024-01-01"), parse_date("2024-01-31"))
        .await?;

    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].date, parse_date("2024-01-03"));
    assert_eq!(entries[0].entry_type, LedgerEntryType::KittyExpense);
    assert_eq!(entries[0].transaction_type_name, "Office Expense");
    assert_eq!(entries[0].debit_amount, 55);
    assert_eq!(entries[0].credit_amount, 0);
    assert_eq!(entries[0].description.as_deref(), Some("Courier"));

    assert_eq!(entries[1].date, parse_date("2024-01-05"));
    assert_eq!(entries[1].entry_type, LedgerEntryType::BankCredit);
    assert_eq!(entries[1].transaction_type_name, "Sales");
    assert_eq!(entries[1].credit_amount, 100);
    assert_eq!(entries[1].description.as_deref(), Some("Invoice 17"));

    Ok(())
}

#[tokio::test]
async fn test_entity_summary_range_is_inclusive() -> Result<()> {
    let env = TestEnv::new().await?;
    for (date, narration) in [
        ("2023-12-31", "before"),
        ("2024-01-01", "first day"),
        ("2024-01-31", "last day"),
        ("2024-02-01", "after"),
    ] {
        env.repo
            .insert_bank_transaction(&bank_txn(1, date, 0, 1000, narration))
            .await?;
    }

    let entries = env
        .reports()
        .entity_summary(1, parse_date("2024-01-01"), parse_date("2024-01-31"))
        .await?;

    let descriptions: Vec<_> = entries
        .iter()
        .map(|e| e.description.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(descriptions, vec!["first day", "last day"]);
    assert!(
        entries
            .iter()
            .all(|e| e.entry_type == LedgerEntryType::BankDebit)
    );

    // Single-day range
    let one_day = env
        .reports()
        .entity_summary(1, parse_date("2024-01-31"), parse_date("2024-01-31"))
        .await?;
    assert_eq!(one_day.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_entity_summary_filters_by_entity() -> Result<()> {
    let env = TestEnv::new().await?;
    env.repo
        .insert_bank_transaction(&bank_txn(1, "2024-01-05", 100, 0, "mine"))
        .await?;
    env.repo
        .insert_bank_transaction(&bank_txn(2, "2024-01-05", 900, 0, "theirs"))
        .await?;
    env.repo
        .insert_kitty_entry(&kitty_entry(2, "2024-01-06", 10, 0, "theirs"))
        .await?;

    let entries = env
        .reports()
        .entity_summary(1, parse_date("2024-01-01"), parse_date("2024-01-31"))
        .await?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].description.as_deref(), Some("mine"));
    Ok(())
}

#[tokio::test]
async fn test_entity_summary_same_day_puts_bank_first() -> Result<()> {
    let env = TestEnv::new().await?;
    env.repo
        .insert_kitty_entry(&kitty_entry(1, "2024-01-05", 20, 2, "kitty early id"))
        .await?;
    env.repo
        .insert_bank_transaction(&bank_txn(1, "2024-01-05", 0, 300, "bank second"))
        .await?;
    env.repo
        .insert_bank_transaction(&bank_txn(1, "2024-01-05", 500, 0, "bank third"))
        .await?;

    let entries = env
        .reports()
        .entity_summary(1, parse_date("2024-01-05"), parse_date("2024-01-05"))
        .await?;

    let descriptions: Vec<_> = entries
        .iter()
        .map(|e| e.description.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(
        descriptions,
        vec!["bank second", "bank third", "kitty early id"]
    );
    assert_eq!(entries[0].entry_type, LedgerEntryType::BankDebit);
    assert_eq!(entries[1].entry_type, LedgerEntryType::BankCredit);
    assert_eq!(entries[2].debit_amount, 22);
    Ok(())
}

#[tokio::test]
async fn test_entity_summary_empty_and_invalid_range() -> Result<()> {
    let env = TestEnv::new().await?;
    let reports = env.reports();

    let entries = reports
        .entity_summary(1, parse_date("2024-01-01"), parse_date("2024-12-31"))
        .await?;
    assert!(entries.is_empty());

    let result = reports
        .entity_summary(1, parse_date("2024-02-01"), parse_date("2024-01-01"))
        .await;
    assert!(matches!(result, Err(AppError::InvalidDateRange { .. })));
    Ok(())
}

#[tokio::test]
async fn test_entity_summary_totals() -> Result<()> {
    let env = TestEnv::new().await?;
    env.repo
        .insert_bank_transaction(&bank_txn(1, "2024-01-05", 10000, 0, "receipt"))
        .await?;
    env.repo
        .insert_bank_transaction(&bank_txn(1, "2024-01-07", 0, 2500, "rent"))
        .await?;
    env.repo
        .insert_kitty_entry(&kitty_entry(1, "2024-01-03", 5000, 500, "stationery"))
        .await?;

    let summary = env
        .reports()
        .entity_summary_totals(1, parse_date("2024-01-01"), parse_date("2024-01-31"))
        .await?;

    assert_eq!(summary.entries.len(), 3);
    assert_eq!(summary.totals.total_credit, 10000);
    assert_eq!(summary.totals.total_debit, 8000);
    assert_eq!(summary.totals.net, 2000);
    assert_eq!(summary.totals.entry_count, 3);
    Ok(())
}

#[tokio::test]
async fn test_transaction_types_are_shared_by_name() -> Result<()> {
    let env = TestEnv::new().await?;
    let mut tx = env.repo.begin().await?;

    let first = pmbackend::Repository::ensure_transaction_type(&mut tx, "Sales").await?;
    let again = pmbackend::Repository::ensure_transaction_type(&mut tx, "Sales").await?;
    let other = pmbackend::Repository::ensure_transaction_type(&mut tx, "Rent").await?;
    tx.commit().await?;

    assert_eq!(first, again);
    assert_ne!(first, other);
    Ok(())
}

#[tokio::test]
async fn test_entity_summary_rejects_out_of_range_kitty_amounts() -> Result<()> {
    let env = TestEnv::new().await?;
    env.repo
        .insert_kitty_entry(&kitty_entry(1, "2024-01-03", i64::MAX - 1, 5, "huge"))
        .await?;

    let result = env
        .reports()
        .entity_summary(1, parse_date("2024-01-01"), parse_date("2024-01-31"))
        .await;
    assert!(matches!(result, Err(AppError::AmountOverflow(_))));

    // Rows outside the range do not affect the report
    let entries = env
        .reports()
        .entity_summary(1, parse_date("2024-02-01"), parse_date("2024-02-29"))
        .await?;
    assert!(entries.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_entity_summary_totals_reject_overflowing_sums() -> Result<()> {
    let env = TestEnv::new().await?;
    env.repo
        .insert_bank_transaction(&bank_txn(1, "2024-01-05", i64::MAX, 0, "huge"))
        .await?;
    env.repo
        .insert_bank_transaction(&bank_txn(1, "2024-01-06", 1, 0, "one more"))
        .await?;

    // The ledger itself is fine; only the totals overflow
    let entries = env
        .reports()
        .entity_summary(1, parse_date("2024-01-01"), parse_date("2024-01-31"))
        .await?;
    assert_eq!(entries.len(), 2);

    let result = env
        .reports()
        .entity_summary_totals(1, parse_date("2024-01-01"), parse_date("2024-01-31"))
        .await;
    assert!(matches!(result, Err(AppError::AmountOverflow(_))));
    Ok(())
}

use anyhow::Result;
use std::io::Write;

use crate::domain::{LedgerEntry, format_cents};

/// Column order of the entity summary CSV.
pub const ENTITY_SUMMARY_HEADER: [&str; 7] = [
    "date",
    "description",
    "type",
    "transaction_type",
    "credit_amount",
    "debit_amount",
    "remarks",
];

/// Write ledger entries as CSV, amounts as decimal strings.
/// Returns the number of data rows written.
pub fn export_entity_summary_csv<W: Write>(entries: &[LedgerEntry], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(ENTITY_SUMMARY_HEADER)?;

    for entry in entries {
        csv_writer.write_record([
            entry.date.to_string(),
            entry.description.clone().unwrap_or_default(),
            entry.entry_type.as_str().to_string(),
            entry.transaction_type_name.clone(),
            format_cents(entry.credit_amount),
            format_cents(entry.debit_amount),
            entry.remarks.clone().unwrap_or_default(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::LedgerEntryType;

    #[test]
    fn test_export_entity_summary_csv() {
        let entries = vec![
            LedgerEntry {
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                description: Some("Tea, snacks".into()),
                entry_type: LedgerEntryType::KittyExpense,
                transaction_type_name: "Office".into(),
                credit_amount: 0,
                debit_amount: 5500,
                remarks: Some("Tea, snacks".into()),
            },
            LedgerEntry {
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                description: None,
                entry_type: LedgerEntryType::BankCredit,
                transaction_type_name: "Sales".into(),
                credit_amount: 10000,
                debit_amount: 0,
                remarks: None,
            },
        ];

        let mut out = Vec::new();
        let count = export_entity_summary_csv(&entries, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(count, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,description,type,transaction_type,credit_amount,debit_amount,remarks"
        );
        assert_eq!(
            lines[1],
            "2024-01-03,\"Tea, snacks\",Kitty Expense,Office,0.00,55.00,\"Tea, snacks\""
        );
        assert_eq!(lines[2], "2024-01-05,,Bank Credit,Sales,100.00,0.00,");
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Cents;

pub type EntityId = i64;

/// Kind of a ledger entry, serialized as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerEntryType {
    #[serde(rename = "Bank Credit")]
    BankCredit,
    #[serde(rename = "Bank Debit")]
    BankDebit,
    #[serde(rename = "Kitty Expense")]
    KittyExpense,
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::BankCredit => "Bank Credit",
            LedgerEntryType::BankDebit => "Bank Debit",
            LedgerEntryType::KittyExpense => "Kitty Expense",
        }
    }
}

impl std::fmt::Display for LedgerEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified bank statement line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankTransaction {
    pub transaction_id: i64,
    pub entity_id: EntityId,
    pub txn_date: NaiveDate,
    pub narration: Option<String>,
    pub transaction_type: String,
    pub credit_amount: Cents,
    pub debit_amount: Cents,
    pub remarks: Option<String>,
}

/// An expense paid out of the kitty (petty cash) register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KittyEntry {
    pub kitty_id: i64,
    pub entity_id: EntityId,
    pub date_of_expense: NaiveDate,
    pub transaction_type: String,
    pub amount: Cents,
    pub margin: Cents,
    pub remarks: Option<String>,
}

/// One row of the entity summary report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    #[serde(rename = "transaction_type")]
    pub transaction_type_name: String,
    pub credit_amount: Cents,
    pub debit_amount: Cents,
    pub remarks: Option<String>,
}

impl From<BankTransaction> for LedgerEntry {
    fn from(txn: BankTransaction) -> Self {
        let entry_type = if txn.credit_amount > 0 {
            LedgerEntryType::BankCredit
        } else {
            LedgerEntryType::BankDebit
        };

        Self {
            date: txn.txn_date,
            description: txn.narration,
            entry_type,
            transaction_type_name: txn.transaction_type,
            credit_amount: txn.credit_amount,
            debit_amount: txn.debit_amount,
            remarks: txn.remarks,
        }
    }
}

/// A ledger amount left the range of [`Cents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Amount overflow computing {0}")]
pub struct AmountOverflow(pub &'static str);

impl TryFrom<KittyEntry> for LedgerEntry {
    type Error = AmountOverflow;

    fn try_from(entry: KittyEntry) -> Result<Self, Self::Error> {
        let debit_amount = entry
            .amount
            .checked_add(entry.margin)
            .ok_or(AmountOverflow("kitty debit"))?;

        Ok(Self {
            date: entry.date_of_expense,
            description: entry.remarks.clone(),
            entry_type: LedgerEntryType::KittyExpense,
            transaction_type_name: entry.transaction_type,
            credit_amount: 0,
            debit_amount,
            remarks: entry.remarks,
        })
    }
}

/// Merge both sources into one ledger ordered by date.
///
/// Inputs are expected in (date, id) order. The sort is stable over
/// bank rows followed by kitty rows, so on equal dates bank entries come
/// first and each source keeps its own order. No de-duplication.
pub fn merge_entries(
    bank: Vec<BankTransaction>,
    kitty: Vec<KittyEntry>,
) -> Result<Vec<LedgerEntry>, AmountOverflow> {
    let mut entries: Vec<LedgerEntry> = bank.into_iter().map(LedgerEntry::from).collect();
    for entry in kitty {
        entries.push(LedgerEntry::try_from(entry)?);
    }

    entries.sort_by_key(|entry| entry.date);
    Ok(entries)
}

/// Column totals over a set of ledger entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub total_credit: Cents,
    pub total_debit: Cents,
    pub net: Cents,
    pub entry_count: usize,
}

pub fn ledger_totals(entries: &[LedgerEntry]) -> Result<LedgerTotals, AmountOverflow> {
    let (total_credit, total_debit) = entries.iter().try_fold(
        (0, 0),
        |(credit, debit): (Cents, Cents), entry| -> Result<(Cents, Cents), AmountOverflow> {
            Ok((
                credit
                    .checked_add(entry.credit_amount)
                    .ok_or(AmountOverflow("total credit"))?,
                debit
                    .checked_add(entry.debit_amount)
                    .ok_or(AmountOverflow("total debit"))?,
            ))
        },
    )?;

    Ok(LedgerTotals {
        total_credit,
        total_debit,
        net: total_credit
            .checked_sub(total_debit)
            .ok_or(AmountOverflow("net"))?,
        entry_count: entries.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bank(id: i64, on: &str, credit: Cents, debit: Cents) -> BankTransaction {
        BankTransaction {
            transaction_id: id,
            entity_id: 1,
            txn_date: date(on),
            narration: Some(format!("bank {}", id)),
            transaction_type: "Sales".into(),
            credit_amount: credit,
            debit_amount: debit,
            remarks: None,
        }
    }

    fn kitty(id: i64, on: &str, amount: Cents, margin: Cents) -> KittyEntry {
        KittyEntry {
            kitty_id: id,
            entity_id: 1,
            date_of_expense: date(on),
            transaction_type: "Office".into(),
            amount,
            margin,
            remarks: Some(format!("kitty {}", id)),
        }
    }

    #[test]
    fn test_bank_entry_type() {
        assert_eq!(
            LedgerEntry::from(bank(1, "2024-01-01", 100, 0)).entry_type,
            LedgerEntryType::BankCredit
        );
        assert_eq!(
            LedgerEntry::from(bank(2, "2024-01-01", 0, 100)).entry_type,
            LedgerEntryType::BankDebit
        );
    }

    #[test]
    fn test_kitty_entry_adds_margin() {
        let entry = LedgerEntry::try_from(kitty(1, "2024-01-03", 50, 5)).unwrap();
        assert_eq!(entry.entry_type, LedgerEntryType::KittyExpense);
        assert_eq!(entry.debit_amount, 55);
        assert_eq!(entry.credit_amount, 0);
        assert_eq!(entry.description.as_deref(), Some("kitty 1"));
        assert_eq!(entry.remarks.as_deref(), Some("kitty 1"));
    }

    #[test]
    fn test_merge_orders_by_date() {
        let entries = merge_entries(
            vec![bank(1, "2024-01-05", 100, 0)],
            vec![kitty(1, "2024-01-03", 50, 5)],
        )
        .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, date("2024-01-03"));
        assert_eq!(entries[0].debit_amount, 55);
        assert_eq!(entries[1].date, date("2024-01-05"));
        assert_eq!(entries[1].entry_type, LedgerEntryType::BankCredit);
    }

    #[test]
    fn test_merge_ties_put_bank_first() {
        let entries = merge_entries(
            vec![bank(1, "2024-01-05", 100, 0), bank(2, "2024-01-05", 0, 30)],
            vec![kitty(1, "2024-01-05", 10, 1), kitty(2, "2024-01-04", 20, 0)],
        )
        .unwrap();

        let kinds: Vec<_> = entries.iter().map(|e| e.entry_type).collect();
        assert_eq!(
            kinds,
            vec![
                LedgerEntryType::KittyExpense,
                LedgerEntryType::BankCredit,
                LedgerEntryType::BankDebit,
                LedgerEntryType::KittyExpense,
            ]
        );
        assert_eq!(entries[3].debit_amount, 11);
    }

    #[test]
    fn test_merge_keeps_duplicates() {
        let entries = merge_entries(
            vec![bank(1, "2024-01-05", 100, 0), bank(2, "2024-01-05", 100, 0)],
            vec![],
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_entry_serializes_with_report_labels() {
        let entry = LedgerEntry::try_from(kitty(1, "2024-01-03", 50, 5)).unwrap();
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["type"], "Kitty Expense");
        assert_eq!(json["transaction_type"], "Office");
        assert_eq!(json["date"], "2024-01-03");
        assert_eq!(json["debit_amount"], 55);
    }

    #[test]
    fn test_ledger_totals() {
        let entries = merge_entries(
            vec![bank(1, "2024-01-05", 1000, 0), bank(2, "2024-01-06", 0, 300)],
            vec![kitty(1, "2024-01-03", 50, 5)],
        )
        .unwrap();
        let totals = ledger_totals(&entries).unwrap();

        assert_eq!(totals.total_credit, 1000);
        assert_eq!(totals.total_debit, 355);
        assert_eq!(totals.net, 645);
        assert_eq!(totals.entry_count, 3);
        assert_eq!(ledger_totals(&[]), Ok(LedgerTotals::default()));
    }

    #[test]
    fn test_kitty_debit_overflow_is_an_error() {
        assert_eq!(
            LedgerEntry::try_from(kitty(1, "2024-01-03", Cents::MAX - 1, 5)),
            Err(AmountOverflow("kitty debit"))
        );
        assert!(
            merge_entries(
                vec![bank(1, "2024-01-05", 100, 0)],
                vec![kitty(1, "2024-01-03", Cents::MAX, 1)],
            )
            .is_err()
        );
    }

    #[test]
    fn test_ledger_totals_overflow_is_an_error() {
        let entries = merge_entries(
            vec![
                bank(1, "2024-01-05", Cents::MAX, 0),
                bank(2, "2024-01-06", 1, 0),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(
            ledger_totals(&entries),
            Err(AmountOverflow("total credit"))
        );

        let entries = merge_entries(
            vec![bank(1, "2024-01-05", 0, Cents::MAX), bank(2, "2024-01-06", -1, 1)],
            vec![],
        )
        .unwrap();
        assert!(ledger_totals(&entries).is_err());
    }
}

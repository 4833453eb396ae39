use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{EntityId, LedgerEntry, LedgerTotals, ledger_totals, merge_entries};
use crate::storage::Repository;

use super::AppError;

/// Entity summary with its column totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySummary {
    pub entity_id: EntityId,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub entries: Vec<LedgerEntry>,
    pub totals: LedgerTotals,
}

/// Read-only reports over the bank and kitty registers.
#[derive(Clone)]
pub struct ReportService {
    repo: Repository,
}

impl ReportService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Bank transactions and kitty expenses for one entity, merged into a
    /// single ledger ordered by date. Both range ends are inclusive.
    pub async fn entity_summary(
        &self,
        entity_id: EntityId,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        if from_date > to_date {
            return Err(AppError::InvalidDateRange {
                from: from_date,
                to: to_date,
            });
        }

        let bank = self
            .repo
            .list_bank_transactions(entity_id, from_date, to_date)
            .await?;
        let kitty = self
            .repo
            .list_kitty_entries(entity_id, from_date, to_date)
            .await?;

        Ok(merge_entries(bank, kitty)?)
    }

    /// Same ledger as [`ReportService::entity_summary`], with totals.
    pub async fn entity_summary_totals(
        &self,
        entity_id: EntityId,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<EntitySummary, AppError> {
        let entries = self.entity_summary(entity_id, from_date, to_date).await?;
        let totals = ledger_totals(&entries)?;

        Ok(EntitySummary {
            entity_id,
            from_date,
            to_date,
            entries,
            totals,
        })
    }
}

/// Parse a `YYYY-MM-DD` report bound.
pub fn parse_report_date(field: &'static str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| AppError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

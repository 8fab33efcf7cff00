use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::{Currency, FsLine};
use super::money::RawAmount;

/// Grouping key: unpadded month followed by the year (`2024-03-15` → `"32024"`).
pub fn date_code(date: NaiveDate) -> String {
    format!("{}{}", date.month(), date.year())
}

/// One classified expense line read off a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date_code: String,
    pub date: NaiveDate,
    pub fs_line: FsLine,
    pub item: String,
    pub currency: Currency,
    /// The outgoing amount as read, before normalization.
    pub amount: RawAmount,
}

impl TransactionRecord {
    pub fn new(
        date: NaiveDate,
        fs_line: FsLine,
        item: impl Into<String>,
        currency: Currency,
        amount: RawAmount,
    ) -> Self {
        TransactionRecord {
            date_code: date_code(date),
            date,
            fs_line,
            item: item.into(),
            currency,
            amount,
        }
    }

    /// The expense in `currency`: the normalized amount when it matches the
    /// statement currency, zero otherwise. `None` means the amount text could
    /// not be read as a number.
    pub fn expense_in(&self, currency: Currency) -> Option<Decimal> {
        if self.currency == currency {
            self.amount.normalize()
        } else {
            Some(Decimal::ZERO)
        }
    }

    pub fn expense_usd(&self) -> Option<Decimal> {
        self.expense_in(Currency::Usd)
    }

    pub fn expense_khr(&self) -> Option<Decimal> {
        self.expense_in(Currency::Khr)
    }
}

/// A finished report line with both expense columns normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub date_code: String,
    pub date: NaiveDate,
    pub fs_line: FsLine,
    pub item: String,
    pub expense_usd: Option<Decimal>,
    pub expense_khr: Option<Decimal>,
}

impl From<TransactionRecord> for ReportRow {
    fn from(record: TransactionRecord) -> Self {
        let expense_usd = record.expense_usd();
        let expense_khr = record.expense_khr();
        ReportRow {
            date_code: record.date_code,
            date: record.date,
            fs_line: record.fs_line,
            item: record.item,
            expense_usd,
            expense_khr,
        }
    }
}

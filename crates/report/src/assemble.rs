use ledgerline_core::{ReportRow, TransactionRecord};
use rust_decimal::Decimal;

/// The consolidated expense report, ordered by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    rows: Vec<ReportRow>,
}

/// Column sums over the amounts that could be read. Missing amounts are
/// counted separately rather than treated as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub usd: Decimal,
    pub khr: Decimal,
    pub missing: usize,
}

impl Report {
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn totals(&self) -> Totals {
        self.rows.iter().fold(Totals::default(), |mut acc, row| {
            match row.expense_usd {
                Some(v) => acc.usd += v,
                None => acc.missing += 1,
            }
            match row.expense_khr {
                Some(v) => acc.khr += v,
                None => acc.missing += 1,
            }
            acc
        })
    }
}

/// Merges KHR and USD statement records into one report.
///
/// KHR records come first, then USD; a stable sort by date keeps that order
/// for transactions on the same day. Amount text is normalized here: an
/// amount that is not a number ends up as a blank cell, not an error.
pub fn assemble(khr_records: Vec<TransactionRecord>, usd_records: Vec<TransactionRecord>) -> Report {
    let mut rows: Vec<ReportRow> = khr_records
        .into_iter()
        .chain(usd_records)
        .map(|record| {
            let row = ReportRow::from(record);
            if row.expense_usd.is_none() || row.expense_khr.is_none() {
                tracing::debug!(date = %row.date, item = %row.item, "Amount is not numeric");
            }
            row
        })
        .collect();

    rows.sort_by_key(|row| row.date);

    tracing::info!(rows = rows.len(), "Assembled report");
    Report { rows }
}

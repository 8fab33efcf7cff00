use chrono::NaiveDate;
use ledgerline_core::{Currency, RawAmount, TransactionRecord};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::classify::Classifier;
use crate::rules::RuleSet;
use crate::sheet::{self, Cell, Sheet};
use crate::util::{excel_serial_to_date, parse_date_text};

/// Text that marks the header row of a statement.
const HEADER_MARKER: &str = "date";

/// A failure that rejects a whole statement file.
#[derive(Error, Debug)]
pub enum StatementError {
    #[error("Cannot access statement {}", path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unsupported statement format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("Cannot open workbook {}", path.display())]
    Workbook {
        path: PathBuf,
        source: calamine::Error,
    },
    #[error("Cannot read CSV statement {}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Workbook has no worksheets: {}", .0.display())]
    EmptyWorkbook(PathBuf),
    #[error("No header row containing 'Date' in the first {scanned} rows of {}", path.display())]
    HeaderNotFound { path: PathBuf, scanned: usize },
    #[error("No {column} column (header containing '{pattern}') in {}", path.display())]
    ColumnNotFound {
        path: PathBuf,
        column: LogicalColumn,
        pattern: String,
    },
}

/// The three columns a statement must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalColumn {
    Date,
    Details,
    Amount,
}

impl std::fmt::Display for LogicalColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalColumn::Date => write!(f, "date"),
            LogicalColumn::Details => write!(f, "details"),
            LogicalColumn::Amount => write!(f, "amount"),
        }
    }
}

/// A single row that was dropped. Rows are numbered as in the spreadsheet
/// (1-based).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("Row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },
    #[error("Row {row}: missing transaction details")]
    MissingDetails { row: usize },
    #[error("Row {row}: amount '{value}' cannot be represented")]
    InvalidAmount { row: usize, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub date: usize,
    pub details: usize,
    pub amount: usize,
}

/// Everything read from one statement.
#[derive(Debug, Clone, Default)]
pub struct StatementImport {
    pub records: Vec<TransactionRecord>,
    pub skipped: Vec<RowError>,
}

/// Loads and parses the statement at `path`.
pub fn read_statement(
    path: &Path,
    currency: Currency,
    rules: &RuleSet,
) -> Result<StatementImport, StatementError> {
    let sheet = sheet::load_sheet(path)?;
    let import = parse_sheet(&sheet, path, currency, rules)?;
    tracing::info!(
        path = %path.display(),
        %currency,
        records = import.records.len(),
        skipped = import.skipped.len(),
        "Read statement"
    );
    Ok(import)
}

/// Parses an already loaded sheet. `source` is used only for error messages
/// and log lines.
pub fn parse_sheet(
    sheet: &Sheet,
    source: &Path,
    currency: Currency,
    rules: &RuleSet,
) -> Result<StatementImport, StatementError> {
    let header_row = find_header_row(sheet, rules.header_scan_rows).ok_or_else(|| {
        StatementError::HeaderNotFound {
            path: source.to_path_buf(),
            scanned: rules.header_scan_rows.min(sheet.len()),
        }
    })?;
    let headers = header_names(&sheet.rows()[header_row]);
    let columns = resolve_columns(&headers, rules, source)?;
    tracing::debug!(
        path = %source.display(),
        header_row = header_row + 1,
        ?columns,
        "Resolved statement columns"
    );

    let classifier = Classifier::new(rules);
    let mut import = StatementImport::default();

    for (offset, row) in sheet.rows()[header_row + 1..].iter().enumerate() {
        let row_number = header_row + offset + 2;

        let amount = match raw_amount(cell_at(row, columns.amount), row_number) {
            Ok(Some(amount)) if !amount.is_zero() => amount,
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(path = %source.display(), "Skipping row: {err}");
                import.skipped.push(err);
                continue;
            }
        };

        match parse_row(row, row_number, columns) {
            Ok((date, details)) => {
                let labels = classifier.classification(&details);
                import.records.push(TransactionRecord::new(
                    date,
                    labels.fs_line,
                    labels.item,
                    currency,
                    amount,
                ));
            }
            Err(err) => {
                tracing::warn!(path = %source.display(), "Skipping row: {err}");
                import.skipped.push(err);
            }
        }
    }

    Ok(import)
}

/// Index of the first of `scan_rows` leading rows holding a text cell that
/// contains "date", case-insensitively.
pub fn find_header_row(sheet: &Sheet, scan_rows: usize) -> Option<usize> {
    sheet.rows().iter().take(scan_rows).position(|row| {
        row.iter().any(|cell| {
            cell.as_text()
                .is_some_and(|s| s.to_lowercase().contains(HEADER_MARKER))
        })
    })
}

/// Trimmed, lower-cased column names. Blank headers become `unnamed: <index>`.
pub fn header_names(row: &[Cell]) -> Vec<String> {
    row.iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = cell.to_string().trim().to_lowercase();
            if name.is_empty() {
                format!("unnamed: {idx}")
            } else {
                name
            }
        })
        .collect()
}

pub fn resolve_columns(
    headers: &[String],
    rules: &RuleSet,
    source: &Path,
) -> Result<ColumnIndices, StatementError> {
    let find = |column: LogicalColumn, pattern: &str| {
        let pattern = pattern.to_lowercase();
        headers
            .iter()
            .position(|h| h.contains(pattern.as_str()))
            .ok_or_else(|| StatementError::ColumnNotFound {
                path: source.to_path_buf(),
                column,
                pattern,
            })
    };

    Ok(ColumnIndices {
        date: find(LogicalColumn::Date, &rules.columns.date)?,
        details: find(LogicalColumn::Details, &rules.columns.details)?,
        amount: find(LogicalColumn::Amount, &rules.columns.amount)?,
    })
}

fn parse_row(
    row: &[Cell],
    row_number: usize,
    columns: ColumnIndices,
) -> Result<(NaiveDate, String), RowError> {
    let date_cell = cell_at(row, columns.date);
    let date = cell_date(date_cell).ok_or_else(|| RowError::InvalidDate {
        row: row_number,
        value: date_cell.to_string(),
    })?;

    let details_cell = cell_at(row, columns.details);
    if details_cell.is_empty() {
        return Err(RowError::MissingDetails { row: row_number });
    }

    Ok((date, details_cell.to_string()))
}

fn cell_at(row: &[Cell], idx: usize) -> &Cell {
    row.get(idx).unwrap_or(&Cell::Empty)
}

fn cell_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(s) => parse_date_text(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// The amount cell as read; `None` when the cell holds no value. Numbers
/// outside the decimal range (or `NaN`) are a row error.
fn raw_amount(cell: &Cell, row_number: usize) -> Result<Option<RawAmount>, RowError> {
    Ok(match cell {
        Cell::Empty => None,
        Cell::Number(n) => Some(RawAmount::from_f64(*n).ok_or_else(|| {
            RowError::InvalidAmount {
                row: row_number,
                value: cell.to_string(),
            }
        })?),
        Cell::Text(s) if s.trim().is_empty() => None,
        Cell::Text(s) => Some(RawAmount::Text(s.clone())),
        Cell::Bool(b) => Some(RawAmount::Number(u8::from(*b).into())),
        Cell::DateTime(_) => Some(RawAmount::Text(cell.to_string())),
    })
}

use ledgerline_core::{format_accounting, ReportRow};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::assemble::Report;

pub const REPORT_COLUMNS: [&str; 6] = [
    "Datecode",
    "Date",
    "FS Line",
    "Item",
    "Expense USD",
    "Expense KHR",
];

const SHEET_NAME: &str = "Expenses";
const ACCOUNTING_FORMAT: &str = "#,##0.00_);(#,##0.00)";
const COLUMN_WIDTHS: [f64; 6] = [10.0, 12.0, 12.0, 36.0, 14.0, 16.0];

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unsupported report format: {} (use .xlsx or .csv)", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Amount {0} cannot be written as a spreadsheet number")]
    Amount(Decimal),
}

/// Writes the report, picking the format from the extension of `path`.
pub fn write_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("xlsx") => write_xlsx(report, path)?,
        Some("csv") => {
            let file = std::fs::File::create(path)?;
            write_csv(report, file)?;
        }
        _ => return Err(ReportError::UnsupportedFormat(path.to_path_buf())),
    }

    tracing::info!(path = %path.display(), rows = report.len(), "Wrote report");
    Ok(())
}

pub fn write_xlsx(report: &Report, path: &Path) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format(ACCOUNTING_FORMAT);

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, (title, width)) in REPORT_COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, width)?;
    }

    for (idx, row) in report.rows().iter().enumerate() {
        write_xlsx_row(sheet, idx as u32 + 1, row, &money)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_xlsx_row(
    sheet: &mut Worksheet,
    r: u32,
    row: &ReportRow,
    money: &Format,
) -> Result<(), ReportError> {
    sheet.write_string(r, 0, &row.date_code)?;
    sheet.write_string(r, 1, row.date.format("%Y-%m-%d").to_string())?;
    sheet.write_string(r, 2, row.fs_line.as_str())?;
    sheet.write_string(r, 3, &row.item)?;

    for (col, amount) in [(4u16, row.expense_usd), (5u16, row.expense_khr)] {
        if let Some(value) = amount {
            let number = value.to_f64().ok_or(ReportError::Amount(value))?;
            sheet.write_number_with_format(r, col, number, money)?;
        }
    }
    Ok(())
}

/// CSV rendition of the report. Amounts are accounting-formatted text and
/// blank when missing.
pub fn write_csv<W: Write>(report: &Report, out: W) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(REPORT_COLUMNS)?;

    for row in report.rows() {
        let amount = |v: Option<Decimal>| v.map(format_accounting).unwrap_or_default();
        writer.write_record([
            row.date_code.clone(),
            row.date.format("%Y-%m-%d").to_string(),
            row.fs_line.to_string(),
            row.item.clone(),
            amount(row.expense_usd),
            amount(row.expense_khr),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

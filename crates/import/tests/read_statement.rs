use chrono::NaiveDate;
use ledgerline_core::{Currency, FsLine};
use ledgerline_import::{read_statement, RuleSet, StatementError};
use rust_decimal::Decimal;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::{Path, PathBuf};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn csv_statement_with_preamble() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "usd.csv",
        "Statement of account,,,\n\
         Period,Jan 2024,,\n\
         Date,Transaction Details,Money In,Money Out\n\
         2024-01-15,UTILITIES BILL EDC,,\"1,020.40\"\n\
         2024-01-16,Salary Heng Alisa,,300\n\
         2024-01-17,Top up,50,0\n\
         2024-01-18,Card purchase at market stall,,\n",
    );

    let import = read_statement(&path, Currency::Usd, &RuleSet::default()).unwrap();
    assert_eq!(import.records.len(), 2);
    assert!(import.skipped.is_empty());

    let utility = &import.records[0];
    assert_eq!(utility.fs_line, FsLine::Utility);
    assert_eq!(utility.item, "Utilities");
    assert_eq!(utility.expense_usd(), Some(Decimal::new(102040, 2)));

    let salary = &import.records[1];
    assert_eq!(salary.fs_line, FsLine::Salary);
    assert_eq!(salary.item, "Salary - Heng Alisa");
    assert_eq!(salary.date, date(2024, 1, 16));
}

#[test]
fn xlsx_statement_with_native_dates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("khr.xlsx");

    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "KHR account").unwrap();
    sheet.write_string(3, 0, "Date").unwrap();
    sheet.write_string(3, 1, "Details").unwrap();
    sheet.write_string(3, 2, "Money Out").unwrap();
    let posted = ExcelDateTime::from_ymd(2024, 2, 1).unwrap();
    sheet.write_datetime_with_format(4, 0, &posted, &date_format).unwrap();
    sheet.write_string(4, 1, "Meiji fresh milk x4").unwrap();
    sheet.write_number(4, 2, 40000).unwrap();
    workbook.save(&path).unwrap();

    let import = read_statement(&path, Currency::Khr, &RuleSet::default()).unwrap();
    assert_eq!(import.records.len(), 1);
    let rec = &import.records[0];
    assert_eq!(rec.date, date(2024, 2, 1));
    assert_eq!(rec.date_code, "22024");
    assert_eq!(rec.fs_line, FsLine::Ingredient);
    assert_eq!(rec.item, "Milk Purchase");
    assert_eq!(rec.expense_khr(), Some(Decimal::from(40_000)));
    assert_eq!(rec.expense_usd(), Some(Decimal::ZERO));
}

#[test]
fn header_beyond_scan_bound_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = String::new();
    for i in 0..12 {
        content.push_str(&format!("preamble line {i}\n"));
    }
    content.push_str("Date,Details,Money Out\n2024-01-01,GBS,5\n");
    let path = write_csv(dir.path(), "late.csv", &content);

    let result = read_statement(&path, Currency::Usd, &RuleSet::default());
    assert!(matches!(
        result,
        Err(StatementError::HeaderNotFound { scanned: 10, .. })
    ));
}

#[test]
fn missing_statement_is_file_access_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_statement(
        &dir.path().join("missing.csv"),
        Currency::Usd,
        &RuleSet::default(),
    );
    assert!(matches!(result, Err(StatementError::FileAccess { .. })));
}

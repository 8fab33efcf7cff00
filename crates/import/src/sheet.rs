use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::statement::StatementError;

/// A single spreadsheet value, independent of the file format it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(Cell::DateTime)
                .unwrap_or(Cell::Number(dt.as_f64())),
        }
    }
}

/// The first worksheet of a statement as a grid anchored at A1, so row
/// indices line up with what the bookkeeper sees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Spreadsheet formats the loader understands, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Csv,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SheetFormat::Workbook),
            "csv" => Some(SheetFormat::Csv),
            _ => None,
        }
    }
}

pub fn load_sheet(path: &Path) -> Result<Sheet, StatementError> {
    std::fs::metadata(path).map_err(|source| StatementError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    match SheetFormat::from_path(path) {
        Some(SheetFormat::Workbook) => load_workbook(path),
        Some(SheetFormat::Csv) => {
            let file = std::fs::File::open(path).map_err(|source| StatementError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;
            read_csv(file).map_err(|source| StatementError::Csv {
                path: path.to_path_buf(),
                source,
            })
        }
        None => Err(StatementError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn load_workbook(path: &Path) -> Result<Sheet, StatementError> {
    let workbook_err = |source: calamine::Error| StatementError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| StatementError::EmptyWorkbook(path.to_path_buf()))?
        .map_err(workbook_err)?;

    // `Range` starts at the first used cell; pad back out to A1.
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset as usize];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset as usize];
        cells.extend(row.iter().map(Cell::from));
        rows.push(cells);
    }

    Ok(Sheet::from_rows(rows))
}

/// Reads CSV without assuming where the header is. Every field is text.
/// Blank lines, which the csv reader skips, come back as empty rows so row
/// indices match line numbers.
pub fn read_csv<R: Read>(data: R) -> Result<Sheet, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    // 1-based line the next record would start on if no blank line intervenes.
    let mut next_line = 1;
    for result in reader.records() {
        let record = result?;
        if let Some(line) = record.position().map(|p| p.line()) {
            for _ in next_line..line {
                rows.push(Vec::new());
            }
            let embedded = record.iter().map(|f| f.matches('\n').count() as u64).sum::<u64>();
            next_line = line + embedded + 1;
        }
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(Sheet::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_keeps_preamble_rows_and_ragged_lengths() {
        let data = b"ACME Bank statement\n\nDate,Details,Money Out\n2024-01-15,Meiji,12.50\n";
        let sheet = read_csv(data.as_ref()).unwrap();
        assert_eq!(sheet.len(), 4);
        assert_eq!(sheet.rows()[0], vec![Cell::Text("ACME Bank statement".into())]);
        assert!(sheet.rows()[1].is_empty());
        assert_eq!(sheet.rows()[2].len(), 3);
        assert_eq!(sheet.rows()[3][2], Cell::Text("12.50".into()));
    }

    #[test]
    fn csv_rows_follow_line_numbers() {
        let data = b"Date,Details\n\n\n2024-01-15,\"two\nlines\"\n\n2024-01-16,GBS\n";
        let sheet = read_csv(data.as_ref()).unwrap();
        assert_eq!(sheet.len(), 6);
        assert_eq!(sheet.rows()[3][1], Cell::Text("two\nlines".into()));
        assert!(sheet.rows()[4].is_empty());
        assert_eq!(sheet.rows()[5][1], Cell::Text("GBS".into()));
    }

    #[test]
    fn csv_empty_fields_are_empty_cells() {
        let sheet = read_csv(b"a,,c\n".as_ref()).unwrap();
        assert_eq!(sheet.rows()[0][1], Cell::Empty);
    }

    #[test]
    fn cell_display() {
        assert_eq!(Cell::Number(40000.0).to_string(), "40000");
        assert_eq!(Cell::Number(12.5).to_string(), "12.5");
        assert_eq!(Cell::Empty.to_string(), "");
        assert!(Cell::Text("  ".into()).is_empty());
    }

    #[test]
    fn format_by_extension() {
        assert_eq!(SheetFormat::from_path(Path::new("a.XLSX")), Some(SheetFormat::Workbook));
        assert_eq!(SheetFormat::from_path(Path::new("a.csv")), Some(SheetFormat::Csv));
        assert_eq!(SheetFormat::from_path(Path::new("a.pdf")), None);
        assert_eq!(SheetFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_sheet(&dir.path().join("gone.xlsx"));
        assert!(matches!(result, Err(StatementError::FileAccess { .. })));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        assert!(matches!(
            load_sheet(&path),
            Err(StatementError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn xlsx_is_anchored_at_a1() {
        use rust_xlsxwriter::Workbook;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 1, "Date").unwrap();
        sheet.write_number(3, 2, 12.5).unwrap();
        workbook.save(&path).unwrap();

        let loaded = load_sheet(&path).unwrap();
        assert_eq!(loaded.rows()[2][1], Cell::Text("Date".into()));
        assert_eq!(loaded.rows()[3][2], Cell::Number(12.5));
        assert!(loaded.rows()[0].is_empty());
    }
}

pub mod assemble;
pub mod writer;

pub use assemble::{assemble, Report, Totals};
pub use writer::{write_csv, write_report, write_xlsx, ReportError, REPORT_COLUMNS};

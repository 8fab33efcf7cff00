pub mod category;
pub mod money;
pub mod record;

pub use category::{Currency, CurrencyParseError, FsLine};
pub use money::{format_accounting, parse_amount, RawAmount};
pub use record::{date_code, ReportRow, TransactionRecord};

pub mod classify;
pub mod rules;
pub mod sheet;
pub mod statement;
pub(crate) mod util;

pub use classify::{classify, summarize, Classification, Classifier};
pub use rules::{ColumnRules, ConfigError, KeywordRules, RuleSet};
pub use sheet::{load_sheet, Cell, Sheet, SheetFormat};
pub use statement::{
    read_statement, ColumnIndices, LogicalColumn, RowError, StatementError, StatementImport,
};

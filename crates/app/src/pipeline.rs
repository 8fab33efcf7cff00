use anyhow::{Context, Result};
use ledgerline_core::{Currency, TransactionRecord};
use ledgerline_import::{read_statement, RuleSet};
use ledgerline_report::{assemble, Report};
use std::path::{Path, PathBuf};

/// What to do when a whole statement file cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run at the first bad statement.
    Abort,
    /// Log the failure; the statement contributes no rows.
    Skip,
}

#[derive(Debug)]
pub struct FailedStatement {
    pub path: PathBuf,
    pub currency: Currency,
    pub error: String,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: Report,
    pub skipped_rows: usize,
    pub failed: Vec<FailedStatement>,
}

/// Reads the KHR statement, then the USD one, and assembles the report.
pub fn build_report(
    khr: Option<&Path>,
    usd: Option<&Path>,
    rules: &RuleSet,
    policy: FailurePolicy,
) -> Result<PipelineOutcome> {
    let mut skipped_rows = 0;
    let mut failed = Vec::new();

    let mut load = |path: Option<&Path>, currency: Currency| -> Result<Vec<TransactionRecord>> {
        let Some(path) = path else {
            return Ok(Vec::new());
        };
        match read_statement(path, currency, rules) {
            Ok(import) => {
                skipped_rows += import.skipped.len();
                Ok(import.records)
            }
            Err(err) if policy == FailurePolicy::Skip => {
                tracing::warn!(path = %path.display(), %currency, "Skipping statement: {err}");
                failed.push(FailedStatement {
                    path: path.to_path_buf(),
                    currency,
                    error: err.to_string(),
                });
                Ok(Vec::new())
            }
            Err(err) => Err(err)
                .with_context(|| format!("Failed to process {currency} statement {}", path.display())),
        }
    };

    let khr_records = load(khr, Currency::Khr)?;
    let usd_records = load(usd, Currency::Usd)?;

    Ok(PipelineOutcome {
        report: assemble(khr_records, usd_records),
        skipped_rows,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date_strings(report: &Report) -> Vec<String> {
        report.rows().iter().map(|r| r.date.to_string()).collect()
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const KHR: &str = "Date,Details,Money Out\n\
                       2024-02-01,Meiji milk,40000\n\
                       2024-01-15,Rental fee January,1600000\n";
    const USD: &str = "Bank export\nDate,Details,Money Out\n2024-01-20,GBS beans,35.5\n";
    const NO_HEADER: &str = "Posted,Narrative,Money Out\n2024-01-01,Meiji,5\n";

    #[test]
    fn both_statements_merge_in_date_order() {
        let dir = tempfile::tempdir().unwrap();
        let khr = write(dir.path(), "khr.csv", KHR);
        let usd = write(dir.path(), "usd.csv", USD);

        let outcome = build_report(
            Some(khr.as_path()),
            Some(usd.as_path()),
            &RuleSet::default(),
            FailurePolicy::Abort,
        )
        .unwrap();

        assert_eq!(
            date_strings(&outcome.report),
            vec!["2024-01-15", "2024-01-20", "2024-02-01"]
        );
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.skipped_rows, 0);
    }

    #[test]
    fn single_statement_is_enough() {
        let dir = tempfile::tempdir().unwrap();
        let usd = write(dir.path(), "usd.csv", USD);
        let outcome =
            build_report(None, Some(usd.as_path()), &RuleSet::default(), FailurePolicy::Abort).unwrap();
        assert_eq!(outcome.report.len(), 1);
        assert_eq!(outcome.report.rows()[0].item, "Coffee Purchase");
    }

    #[test]
    fn abort_policy_propagates_statement_errors() {
        let dir = tempfile::tempdir().unwrap();
        let khr = write(dir.path(), "khr.csv", NO_HEADER);
        let usd = write(dir.path(), "usd.csv", USD);

        let err = build_report(Some(khr.as_path()), Some(usd.as_path()), &RuleSet::default(), FailurePolicy::Abort)
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("KHR statement"));
        assert!(message.contains("No header row"));
    }

    #[test]
    fn skip_policy_drops_only_the_bad_statement() {
        let dir = tempfile::tempdir().unwrap();
        let khr = write(dir.path(), "khr.csv", NO_HEADER);
        let usd = write(dir.path(), "usd.csv", USD);

        let outcome =
            build_report(Some(khr.as_path()), Some(usd.as_path()), &RuleSet::default(), FailurePolicy::Skip)
                .unwrap();
        assert_eq!(outcome.report.len(), 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].currency, Currency::Khr);
    }

    #[test]
    fn skipped_rows_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let usd = write(
            dir.path(),
            "usd.csv",
            "Date,Details,Money Out\nnot a date,GBS,3\n2024-01-02,GBS,4\n",
        );
        let outcome =
            build_report(None, Some(usd.as_path()), &RuleSet::default(), FailurePolicy::Abort).unwrap();
        assert_eq!(outcome.report.len(), 1);
        assert_eq!(outcome.skipped_rows, 1);
    }
}

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use ledgerline_core::format_accounting;
use ledgerline_import::RuleSet;
use ledgerline_report::{write_report, Report, REPORT_COLUMNS};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod pipeline;

use pipeline::{build_report, FailurePolicy};

#[derive(Parser)]
#[command(
    name = "ledgerline",
    version,
    about = "Turn KHR and USD bank statements into a classified expense report",
    long_about = "Reads one or two bank statement spreadsheets (.xlsx, .xls, .ods or .csv), \
                  classifies each outgoing transaction with the keyword rules, and writes a \
                  date-sorted expense report (.xlsx or .csv)."
)]
#[command(group(
    ArgGroup::new("statements")
        .required(true)
        .multiple(true)
        .args(["khr", "usd"])
))]
struct Cli {
    /// KHR statement
    #[arg(long, value_name = "PATH")]
    khr: Option<PathBuf>,

    /// USD statement
    #[arg(long, value_name = "PATH")]
    usd: Option<PathBuf>,

    /// Where to save the report (.xlsx or .csv)
    #[arg(short, long, value_name = "PATH", required_unless_present = "dry_run")]
    output: Option<PathBuf>,

    /// Keyword and column rule file
    #[arg(long, value_name = "PATH", env = "LEDGERLINE_RULES", default_value = "ledgerline.toml")]
    rules: PathBuf,

    /// Leave out a statement that cannot be read instead of failing the run
    #[arg(long)]
    keep_going: bool,

    /// Print the report instead of saving it
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let rules = RuleSet::load(&cli.rules)
        .with_context(|| format!("Failed to load rules from {}", cli.rules.display()))?;

    let policy = if cli.keep_going {
        FailurePolicy::Skip
    } else {
        FailurePolicy::Abort
    };
    let outcome = build_report(cli.khr.as_deref(), cli.usd.as_deref(), &rules, policy)?;

    for failed in &outcome.failed {
        eprintln!(
            "Warning: {} statement {} left out: {}",
            failed.currency,
            failed.path.display(),
            failed.error
        );
    }
    if outcome.skipped_rows > 0 {
        eprintln!(
            "Warning: {} row(s) could not be read and were skipped (see log)",
            outcome.skipped_rows
        );
    }

    if cli.dry_run {
        print_report(&outcome.report);
    } else if let Some(output) = &cli.output {
        write_report(&outcome.report, output)
            .with_context(|| format!("Failed to write report to {}", output.display()))?;
        println!("Expense report saved to:\n{}", output.display());
    }

    let totals = outcome.report.totals();
    println!(
        "{} row(s); Expense USD {}; Expense KHR {}",
        outcome.report.len(),
        format_accounting(totals.usd),
        format_accounting(totals.khr)
    );
    Ok(())
}

fn print_report(report: &Report) {
    let widths = [8, 10, 10, 32, 14, 16];
    let line = |cells: [&str; 6]| {
        cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i >= 4 {
                    format!("{cell:>w$}")
                } else {
                    format!("{cell:<w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(REPORT_COLUMNS));
    for row in report.rows() {
        let date = row.date.format("%Y-%m-%d").to_string();
        let usd = row.expense_usd.map(format_accounting).unwrap_or_default();
        let khr = row.expense_khr.map(format_accounting).unwrap_or_default();
        println!(
            "{}",
            line([
                row.date_code.as_str(),
                date.as_str(),
                row.fs_line.as_str(),
                row.item.as_str(),
                usd.as_str(),
                khr.as_str(),
            ])
        );
    }
}

//! Duke Diff CLI - compare two spreadsheet workbooks

use anyhow::{Context, Result};
use clap::{Args, Parser, ValueEnum};
use duke_diff::{
    compare, CancelToken, ComparisonOptions, ComparisonResult, DiffRecord, NoProgress,
    SheetSummary,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "duke-diff")]
#[command(
    author,
    version,
    about = "Compare two spreadsheet workbooks and list their differences"
)]
struct Cli {
    /// Older workbook (xlsx)
    old: PathBuf,

    /// Newer workbook (xlsx)
    new: PathBuf,

    #[command(flatten)]
    toggles: Toggles,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Append per-sheet counts
    #[arg(short, long)]
    summary: bool,

    /// Suppress progress output on stderr
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args)]
struct Toggles {
    /// Enable every comparison (the --no-* flags still apply)
    #[arg(long)]
    all: bool,

    /// Do not compare cell values
    #[arg(long)]
    no_values: bool,

    /// Do not compare cell formulas
    #[arg(long)]
    no_formulas: bool,

    /// Skip the content of sheets hidden in either workbook
    #[arg(long)]
    skip_hidden_sheets: bool,

    /// Do not report sheets that moved position
    #[arg(long)]
    no_sheet_order: bool,

    /// Do not compare used ranges
    #[arg(long)]
    no_used_range: bool,

    /// Do not compare data validations
    #[arg(long)]
    no_validations: bool,

    /// Compare conditional formatting
    #[arg(long)]
    conditional_formats: bool,

    /// Compare hidden rows and columns
    #[arg(long)]
    hidden_rows_cols: bool,

    /// Compare cell style indexes and number formats
    #[arg(long)]
    cell_format: bool,
}

impl Toggles {
    fn to_options(&self) -> ComparisonOptions {
        let mut options = if self.all {
            ComparisonOptions::all()
        } else {
            ComparisonOptions::default()
        };

        if self.conditional_formats {
            options.compare_conditional_formats = true;
        }
        if self.hidden_rows_cols {
            options.compare_hidden_rows_cols = true;
        }
        if self.cell_format {
            options.compare_cell_format = true;
        }

        if self.no_values {
            options.compare_values = false;
        }
        if self.no_formulas {
            options.compare_formulas = false;
        }
        if self.skip_hidden_sheets {
            options.include_hidden_sheets = false;
        }
        if self.no_sheet_order {
            options.compare_sheet_order = false;
        }
        if self.no_used_range {
            options.compare_used_range = false;
        }
        if self.no_validations {
            options.compare_validations = false;
        }

        options
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    old: String,
    new: String,
    options: ComparisonOptions,
    records: &'a [DiffRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Vec<SheetSummary>>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(false) => ExitCode::from(0),
        Ok(true) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

/// Returns whether any difference was found
fn run(cli: &Cli) -> Result<bool> {
    let options = cli.toggles.to_options();
    log::debug!("comparison options: {:?}", options);

    let print_progress = |percent: u8, message: &str| {
        eprintln!("[{:>3}%] {}", percent, message);
    };

    let cancel = CancelToken::new();
    let result = if cli.quiet {
        compare(&cli.old, &cli.new, &options, &NoProgress, &cancel)
    } else {
        compare(&cli.old, &cli.new, &options, &print_progress, &cancel)
    }
    .with_context(|| {
        format!(
            "Failed to compare '{}' with '{}'",
            cli.old.display(),
            cli.new.display()
        )
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        Format::Text => write_text(&mut out, &result, cli.summary)?,
        Format::Json => {
            let report = JsonReport {
                old: cli.old.display().to_string(),
                new: cli.new.display().to_string(),
                options,
                records: result.records(),
                summary: cli.summary.then(|| result.summary()),
            };
            serde_json::to_writer_pretty(&mut out, &report)
                .context("Failed to write JSON report")?;
            writeln!(out)?;
        }
    }

    Ok(!result.is_empty())
}

fn write_text(out: &mut impl Write, result: &ComparisonResult, summary: bool) -> Result<()> {
    if result.is_empty() {
        writeln!(out, "No differences found")?;
        return Ok(());
    }

    for record in result {
        writeln!(out, "{}", record)?;
    }

    if summary {
        writeln!(out)?;
        writeln!(out, "Summary:")?;
        for sheet in result.summary() {
            let name = if sheet.sheet.is_empty() {
                "(workbook)"
            } else {
                sheet.sheet.as_str()
            };
            writeln!(
                out,
                "  {}: {} added, {} removed, {} modified",
                name, sheet.counts.added, sheet.counts.removed, sheet.counts.modified
            )?;
        }
        let total = result.counts();
        writeln!(
            out,
            "  Total: {} difference(s) ({} added, {} removed, {} modified)",
            total.total(),
            total.added,
            total.removed,
            total.modified
        )?;
    }

    Ok(())
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use tablefuse::{DEFAULT_OUTPUT_FILENAME, DocumentKind, MergedResult, merged_to_csv, process};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "tablefuse",
    version,
    about = "Reconcile two tabular documents (XLSX/PDF) and render the merged table as a PDF"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Match rows of two documents on their shared columns and write the
    /// merged result.
    Merge(MergeArgs),
}

#[derive(Debug, Args)]
struct MergeArgs {
    /// First (left) input document.
    #[arg(short, long)]
    left: PathBuf,

    /// Second (right) input document; its values win on exact column collisions.
    #[arg(short, long)]
    right: PathBuf,

    /// Output PDF path.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILENAME)]
    output: PathBuf,

    /// Override the left document type (pdf or xlsx) instead of inferring it
    /// from the file extension.
    #[arg(long)]
    left_type: Option<String>,

    /// Override the right document type (pdf or xlsx).
    #[arg(long)]
    right_type: Option<String>,

    /// Also write the merged table to this path as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the merged records and the merge report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable verbose report output.
    #[arg(short, long)]
    verbose: bool,
}

fn document_kind(path: &Path, override_hint: Option<&str>) -> Result<DocumentKind> {
    let hint = override_hint
        .map(str::to_string)
        .or_else(|| {
            path.extension()
                .map(|extension| extension.to_string_lossy().into_owned())
        })
        .ok_or_else(|| {
            anyhow!(
                "cannot infer the document type of '{}'; pass --left-type/--right-type",
                path.display()
            )
        })?;
    DocumentKind::from_hint(&hint)
        .ok_or_else(|| anyhow!("unsupported document type '{hint}' for '{}'", path.display()))
}

fn run_merge(args: &MergeArgs) -> Result<MergedResult> {
    let left_kind = document_kind(&args.left, args.left_type.as_deref())?;
    let right_kind = document_kind(&args.right, args.right_type.as_deref())?;

    let left = fs::read(&args.left)
        .with_context(|| format!("failed to read '{}'", args.left.display()))?;
    let right = fs::read(&args.right)
        .with_context(|| format!("failed to read '{}'", args.right.display()))?;

    let result = process(&left, left_kind, &right, right_kind)
        .context("failed to merge the two documents")?;

    fs::write(&args.output, &result.pdf)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;

    if let Some(csv_path) = &args.csv {
        let csv = merged_to_csv(&result.records)?;
        fs::write(csv_path, csv)
            .with_context(|| format!("failed to write '{}'", csv_path.display()))?;
    }

    if args.json {
        let dump = serde_json::json!({
            "report": result.report,
            "records": result.records,
        });
        println!("{}", serde_json::to_string_pretty(&dump)?);
    }

    Ok(result)
}

fn log_report(result: &MergedResult, verbose: bool) {
    let report = &result.report;
    if report.merged_rows == 0 {
        eprintln!("warning: no rows were matched between the two documents");
    }
    if verbose {
        eprintln!(
            "left rows: {}, right rows: {}, merged rows: {}, shared columns: {:?}",
            report.left_rows, report.right_rows, report.merged_rows, report.common_columns
        );
    }
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tablefuse=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Merge(args) => match run_merge(&args) {
            Ok(result) => {
                log_report(&result, args.verbose);
                if result.report.merged_rows > 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}

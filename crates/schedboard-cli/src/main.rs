//! schedboard CLI - project schedule dashboard
//!
//! Loads a schedule spreadsheet, computes the derived views and progress
//! curve, and prints or exports the dashboard.

mod config;
mod diagnostics;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schedboard_core::{
    DashboardReport, Diagnostic, DiagnosticCode, DiagnosticEmitter, Renderer, ScheduleTable,
};
use schedboard_parser::{load_file, LoadError};
use schedboard_render::{ExcelExporter, PdfExporter, SvgCurveRenderer, TextSummaryRenderer};
use schedboard_solver::{progress_curve_from_tasks, DashboardCalculator};

use config::Config;
use diagnostics::{DiagnosticConfig, ExitCode, JsonEmitter, TerminalEmitter};

#[derive(Parser)]
#[command(name = "schedboard")]
#[command(author, version, about = "Project schedule dashboard", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./schedboard.toml when present)
    #[arg(short, long, env = "SCHEDBOARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Treat warnings as errors
    #[arg(long, global = true)]
    strict: bool,

    /// Only show errors
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DashboardArgs {
    /// Schedule spreadsheet (xlsx, xls, ods or csv)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Evaluation date, YYYY-MM-DD (defaults to the local date)
    #[arg(long, value_name = "DATE")]
    today: Option<NaiveDate>,

    /// Long-duration threshold in days
    #[arg(long, value_name = "DAYS")]
    long_duration: Option<u32>,

    /// Upcoming window in days (repeatable)
    #[arg(long = "window", value_name = "DAYS")]
    windows: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SummaryFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a schedule and report problems
    Check {
        /// Schedule spreadsheet
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print indicators and view counts
    Summary {
        #[command(flatten)]
        args: DashboardArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = SummaryFormat::Text)]
        format: SummaryFormat,
    },

    /// Write the dashboard as XLSX, PDF and/or SVG
    Export {
        #[command(flatten)]
        args: DashboardArgs,

        /// Excel workbook output path
        #[arg(long, value_name = "PATH")]
        xlsx: Option<PathBuf>,

        /// PDF priority report output path
        #[arg(long, value_name = "PATH")]
        pdf: Option<PathBuf>,

        /// SVG progress curve output path
        #[arg(long, value_name = "PATH")]
        svg: Option<PathBuf>,

        /// Report title
        #[arg(long)]
        title: Option<String>,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<process::ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = Config::discover(cli.config.as_deref())?;
    let diag = DiagnosticConfig {
        strict: cli.strict,
        quiet: cli.quiet,
    };

    let code = match cli.command {
        Commands::Check { file } => cmd_check(&file, &config, diag)?,
        Commands::Summary { args, format } => cmd_summary(&args, format, &config, diag)?,
        Commands::Export {
            args,
            xlsx,
            pdf,
            svg,
            title,
        } => {
            let outputs = ExportTargets { xlsx, pdf, svg };
            let title = title.unwrap_or_else(|| config.report.title.clone());
            cmd_export(&args, &outputs, title, &config, diag)?
        }
    };

    Ok(code.into())
}

// ============================================================================
// Pipeline
// ============================================================================

fn schema_diagnostic(missing: &[String], config: &Config) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::E001MissingColumns,
        format!("missing required column(s): {}", missing.join(", ")),
    )
    .with_note(format!(
        "required columns: {}",
        config.loader.columns.required().join(", ")
    ))
    .with_hint("map source headers under [loader.columns] in schedboard.toml")
}

/// Load the schedule; a missing-column failure becomes an E001 diagnostic
fn load(
    file: &Path,
    config: &Config,
    emitter: &mut impl DiagnosticEmitter,
) -> Result<Option<ScheduleTable>> {
    match load_file(file, &config.loader) {
        Ok(table) => {
            emitter.emit_all(table.diagnostics.iter().cloned());
            Ok(Some(table))
        }
        Err(LoadError::Schema { missing }) => {
            emitter.emit(schema_diagnostic(&missing, config));
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("failed to load {}", file.display())),
    }
}

/// Compute views, indicators and curve for one evaluation date
fn build_report(
    table: &ScheduleTable,
    args: &DashboardArgs,
    title: String,
    config: &Config,
    emitter: &mut impl DiagnosticEmitter,
) -> DashboardReport {
    // The only clock read in the program
    let today = args.today.unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut options = config.views.clone();
    if let Some(days) = args.long_duration {
        options.long_duration_threshold = days;
    }
    if !args.windows.is_empty() {
        options.upcoming_windows = args.windows.clone();
    }

    let dashboard = DashboardCalculator::with_options(options).compute(&table.tasks, today);
    emitter.emit_all(dashboard.empty_view_diagnostics());

    let curve = progress_curve_from_tasks(&table.tasks)
        .with_marker(today, dashboard.indicators.overall_progress);
    DashboardReport::new(title, dashboard, curve)
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_check(file: &Path, config: &Config, diag: DiagnosticConfig) -> Result<ExitCode> {
    let mut emitter = TerminalEmitter::new(std::io::stderr(), diag);
    let Some(table) = load(file, config, &mut emitter)? else {
        return Ok(emitter.exit_code());
    };

    if !diag.quiet {
        println!(
            "{}: {} task(s) from {} row(s), {} warning(s)",
            file.display(),
            table.tasks.len(),
            table.source_rows,
            table.warning_count()
        );
    }
    Ok(emitter.exit_code())
}

fn cmd_summary(
    args: &DashboardArgs,
    format: SummaryFormat,
    config: &Config,
    diag: DiagnosticConfig,
) -> Result<ExitCode> {
    let title = config.report.title.clone();
    match format {
        SummaryFormat::Text => {
            let mut emitter = TerminalEmitter::new(std::io::stderr(), diag);
            let Some(table) = load(&args.file, config, &mut emitter)? else {
                return Ok(emitter.exit_code());
            };
            let report = build_report(&table, args, title, config, &mut emitter);
            print!("{}", TextSummaryRenderer.render(&report)?);
            Ok(emitter.exit_code())
        }
        SummaryFormat::Json => {
            let mut emitter = JsonEmitter::new(diag);
            let report = match load(&args.file, config, &mut emitter)? {
                Some(table) => Some(build_report(&table, args, title, config, &mut emitter)),
                None => None,
            };
            let output = serde_json::json!({
                "report": report,
                "diagnostics": emitter.to_json_value(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(emitter.exit_code())
        }
    }
}

struct ExportTargets {
    xlsx: Option<PathBuf>,
    pdf: Option<PathBuf>,
    svg: Option<PathBuf>,
}

fn write_output(path: &Path, bytes: &[u8], quiet: bool) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote output");
    if !quiet {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_export(
    args: &DashboardArgs,
    targets: &ExportTargets,
    title: String,
    config: &Config,
    diag: DiagnosticConfig,
) -> Result<ExitCode> {
    if targets.xlsx.is_none() && targets.pdf.is_none() && targets.svg.is_none() {
        bail!("nothing to export: pass --xlsx, --pdf or --svg");
    }

    let mut emitter = TerminalEmitter::new(std::io::stderr(), diag);
    let Some(table) = load(&args.file, config, &mut emitter)? else {
        return Ok(emitter.exit_code());
    };
    let report = build_report(&table, args, title, config, &mut emitter);

    if let Some(path) = &targets.xlsx {
        let bytes = ExcelExporter::new()
            .date_format(&config.report.excel_date_format)
            .render(&report)
            .context("failed to render Excel workbook")?;
        write_output(path, &bytes, diag.quiet)?;
    }
    if let Some(path) = &targets.pdf {
        let bytes = PdfExporter::new()
            .date_format(&config.report.pdf_date_format)
            .render(&report)
            .context("failed to render PDF report")?;
        write_output(path, &bytes, diag.quiet)?;
    }
    if let Some(path) = &targets.svg {
        let svg = SvgCurveRenderer::new()
            .render(&report)
            .context("failed to render SVG chart")?;
        write_output(path, svg.as_bytes(), diag.quiet)?;
    }

    Ok(emitter.exit_code())
}

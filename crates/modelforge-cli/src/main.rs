use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use modelforge_core::{Config, DepKind, ResolutionReport};
use modelforge_resolve::{resolve_model, ResolveOptions, ResolveRequest};

/// Modelforge - resolve a transformation model into runnable read-only SQL
#[derive(Parser)]
#[command(name = "modelforge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Model name or path
    #[arg(short, long)]
    model: String,

    /// Repository root (or any directory inside it)
    #[arg(long, default_value = ".")]
    repo_root: PathBuf,

    /// Path to config file (default: modelforge.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database holding external source tables
    #[arg(long)]
    external_database: Option<String>,

    /// Database holding transformation model tables
    #[arg(long)]
    transformation_database: Option<String>,

    /// Reference template used for external dependencies
    #[arg(long)]
    external_template: Option<String>,

    /// Network name
    #[arg(long)]
    network: Option<String>,

    /// Window start, epoch seconds (default: one hour ago)
    #[arg(long)]
    window_start: Option<i64>,

    /// Window end, epoch seconds (default: now)
    #[arg(long)]
    window_end: Option<i64>,

    /// Task start timestamp, epoch seconds (default: now)
    #[arg(long)]
    task_start: Option<i64>,

    /// Keep the INSERT INTO prefix (default is a read-only query)
    #[arg(long)]
    keep_insert: bool,

    /// Also write the JSON report to a file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) => std::process::exit(exit_code(&report)),
        Err(e) => {
            eprintln!("{} {e:#}", "ERROR:".red().bold());
            std::process::exit(1);
        }
    }
}

/// `0` when fully resolved; `2` when the report carries unresolved
/// fragments, so the caller can ask a follow-up question instead of running
/// a broken query.
fn exit_code(report: &ResolutionReport) -> i32 {
    if report.is_runnable() {
        0
    } else {
        2
    }
}

fn run(cli: &Cli) -> Result<ResolutionReport> {
    let config = load_config(cli)?;

    let now = chrono::Utc::now().timestamp();
    let options = ResolveOptions {
        external_database: cli
            .external_database
            .clone()
            .unwrap_or(config.databases.external),
        transformation_database: cli
            .transformation_database
            .clone()
            .unwrap_or(config.databases.transformation),
        external_template: cli
            .external_template
            .clone()
            .unwrap_or(config.external_template),
        network: cli.network.clone().unwrap_or(config.network),
        window_start: cli.window_start.unwrap_or(now - 3600),
        window_end: cli.window_end.unwrap_or(now),
        task_start: cli.task_start.unwrap_or(now),
        keep_insert: cli.keep_insert,
    };

    if cli.verbose {
        eprintln!("{} {}", "Resolving model:".cyan(), cli.model);
    }

    let request = ResolveRequest {
        model: cli.model.clone(),
        repo_root: cli.repo_root.clone(),
        options,
    };

    let report = resolve_model(&request)?;

    let payload = report.to_json()?;
    if let Some(path) = &cli.output {
        std::fs::write(path, format!("{payload}\n"))?;
        if cli.verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }
    println!("{payload}");

    print_report_summary(&report);

    Ok(report)
}

fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        return Ok(Config::from_file(config_path)?);
    }

    let default_path = std::path::Path::new("modelforge.toml");
    if default_path.exists() {
        return Ok(Config::from_file(default_path)?);
    }

    if cli.verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// Print the human summary to stderr; stdout carries the JSON contract
fn print_report_summary(report: &ResolutionReport) {
    eprintln!("\n{}", "=".repeat(60).bright_blue());
    eprintln!("{}", "Model Resolution Report".bold().bright_blue());
    eprintln!("{}", "=".repeat(60).bright_blue());
    eprintln!();

    eprintln!("{} {}", "Model:".bold(), report.summary.model);
    eprintln!(
        "{} {} (max {})",
        "Interval:".bold(),
        report.summary.interval.interval_type,
        report.summary.interval.max
    );
    eprintln!();

    eprintln!("{}", "Dependencies:".bold());
    if report.dependencies.is_empty() {
        eprintln!("  (none)");
    }
    for dep in &report.dependencies {
        let kind = match dep.kind {
            DepKind::External => dep.kind.as_str().cyan(),
            DepKind::Transformation => dep.kind.as_str().green(),
            DepKind::Unknown => dep.kind.as_str().yellow().bold(),
        };
        eprintln!("  {} [{}] via {}", dep.table, kind, dep.provenance.join(", "));
    }
    eprintln!();

    let counts = &report.summary.dependency_counts;
    eprintln!(
        "External: {}  Transformation: {}  Unknown: {}",
        counts.external, counts.transformation, counts.unknown
    );
    eprintln!();

    for diag in &report.diagnostics {
        eprintln!(
            "  [{}] {}: {}",
            diag.severity.to_string().yellow().bold(),
            diag.code,
            diag.message
        );
    }
    if !report.diagnostics.is_empty() {
        eprintln!();
    }

    if report.is_runnable() {
        eprintln!("{}", "✓ Fully resolved - query is runnable".green().bold());
    } else {
        eprintln!(
            "{} {} unresolved fragment(s):",
            "⚠".yellow(),
            report.summary.unresolved_count
        );
        for fragment in &report.unresolved_fragments {
            eprintln!("  {}", fragment.yellow());
        }
    }

    eprintln!();
    eprintln!("{}", "=".repeat(60).bright_blue());
}

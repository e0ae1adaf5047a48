use anyhow::{Context, Result};
use clap::Parser;
use entry_finder::cli::{Cli, Commands, OutputFormat, ScanArgs};
use entry_finder::config::ScanConfig;
use entry_finder::logging;
use entry_finder::output::{prepare_output, write_listing};
use entry_finder::scan::{FailedLocation, scan};
use entry_finder::unit::UnitHeader;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = parse_cli()?;
    let _guard = logging::init(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Scan(args) => run_scan(&args)?,
        Commands::Inspect { class_file } => {
            let report = inspect(&class_file)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn parse_cli() -> Result<Cli> {
    let args: Vec<String> = std::env::args().collect();
    Ok(Cli::parse_from(rewrite_args_for_implicit_scan(args)))
}

/// Top-level flags that print and exit instead of running a command.
const INFO_FLAGS: [&str; 4] = ["-h", "--help", "-V", "--version"];

/// Inserts `scan` after the global options unless a subcommand is named, so
/// scan options and paths may follow the binary name directly.
fn rewrite_args_for_implicit_scan(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["scan", "inspect", "help"];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--log-file" {
            idx += 2;
            continue;
        }

        if a.starts_with("--log-file=") {
            idx += 1;
            continue;
        }

        if INFO_FLAGS.contains(&a) {
            return args;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) {
            args.insert(idx, "scan".to_string());
        }
    }

    args
}

#[derive(Debug, Serialize)]
struct ScanReport {
    classpath: Vec<String>,
    include: String,
    output: String,
    discovered: Vec<String>,
    failed_locations: Vec<FailedLocation>,
    duration_ms: u64,
}

fn run_scan(args: &ScanArgs) -> Result<()> {
    let config = ScanConfig::resolve(args)?;
    let start = Instant::now();

    prepare_output(&config.output).context("Failed to clear output file, see log.")?;
    let outcome = scan(&config.classpath, &config.options).context("Couldn't walk classpath, see log.")?;
    write_listing(&config.output, &outcome.discovered)
        .context("Failed to write output file, see log.")?;

    let report = ScanReport {
        classpath: config
            .classpath
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect(),
        include: config.options.include.clone(),
        output: config.output.to_string_lossy().to_string(),
        discovered: outcome.discovered,
        failed_locations: outcome.failed_locations,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    print_report(&report, args.format)?;

    if !report.failed_locations.is_empty() {
        anyhow::bail!(
            "{} classpath location(s) failed, see log.",
            report.failed_locations.len()
        );
    }
    Ok(())
}

fn print_report(report: &ScanReport, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("output: {}\n", report.output));
            out.push_str(&format!("discovered: {}\n", report.discovered.len()));
            out.push_str(&format!("duration_ms: {}\n", report.duration_ms));
            for name in &report.discovered {
                out.push_str(&format!("- {name}\n"));
            }
            for failed in &report.failed_locations {
                out.push_str(&format!("! {}: {}\n", failed.location, failed.error));
            }
            out
        }
    };

    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct InspectReport {
    #[serde(flatten)]
    header: UnitHeader,
    declares_entry_point: bool,
}

fn inspect(class_file: &Path) -> Result<InspectReport> {
    let bytes = std::fs::read(class_file)
        .with_context(|| format!("Failed to read class file: {}", class_file.display()))?;
    let header = UnitHeader::parse(&bytes)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to parse class file: {}", class_file.display()))?;
    Ok(InspectReport {
        declares_entry_point: header.declares_entry_point(),
        header,
    })
}

//! Batch processing command for multiple media plan workbooks.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use mplan_core::{CalamineReader, MediaPlan, MediaPlanParser};

use super::parse::{build_parser, format_plan, OutputFormat};

/// Workbook extensions picked up from the glob.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input workbooks
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Date used for the default year and month (YYYY-MM-DD, default: today)
    #[arg(long)]
    reference_date: Option<NaiveDate>,
}

/// Result of processing a single file.
struct ParseResult {
    path: PathBuf,
    plan: Option<MediaPlan>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            WORKBOOK_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(output_dir) = &args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(build_parser(&config, args.reference_date));
    let permits = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.iter().cloned().enumerate() {
        let parser = Arc::clone(&parser);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let result = tokio::task::spawn_blocking(move || parse_single_file(path, &parser)).await?;
            anyhow::Ok((index, result))
        });
    }

    let mut results: Vec<Option<ParseResult>> = files.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined??;
        overall_pb.inc(1);

        if let Some(message) = &result.error {
            if args.continue_on_error {
                warn!("Failed to parse {}: {}", result.path.display(), message);
            } else {
                error!("Failed to parse {}: {}", result.path.display(), message);
                tasks.abort_all();
                overall_pb.abandon();
                anyhow::bail!("Processing failed: {}", message);
            }
        }
        results[index] = Some(result);
    }

    overall_pb.finish_with_message("Complete");

    let results: Vec<ParseResult> = results.into_iter().flatten().collect();
    let successful: Vec<_> = results.iter().filter(|r| r.plan.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        let paths: Vec<&Path> = successful.iter().map(|r| r.path.as_path()).collect();
        let names = output_names(&paths, args.format.extension());
        for (result, output_name) in successful.iter().zip(names) {
            let Some(plan) = &result.plan else {
                continue;
            };
            let output_path = output_dir.join(output_name);

            fs::write(&output_path, format_plan(plan, args.format, &config.output)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Output file name per input, in input order. Inputs sharing a file stem
/// get `-2`, `-3`, ... suffixes so no output overwrites another.
fn output_names(paths: &[&Path], extension: &str) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(paths.len());

    for path in paths {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("plan")
            .to_string();

        let count = seen.entry(stem.clone()).or_insert(0);
        let mut name = format!("{}.{}", stem, extension);
        while !taken.insert(name.clone()) {
            *count += 1;
            name = format!("{}-{}.{}", stem, *count + 1, extension);
        }
        if *count > 0 {
            warn!(
                "Output for {} renamed to {} to avoid overwriting another file",
                path.display(),
                name
            );
        }
        names.push(name);
    }

    names
}

fn parse_single_file(path: PathBuf, parser: &MediaPlanParser) -> ParseResult {
    let file_start = Instant::now();
    let outcome = parser.parse_path(&CalamineReader::new(), &path);
    let processing_time_ms = file_start.elapsed().as_millis() as u64;

    match outcome {
        Ok(plan) => ParseResult {
            path,
            plan: Some(plan),
            error: None,
            processing_time_ms,
        },
        Err(e) => ParseResult {
            path,
            plan: None,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}

fn write_summary(path: &Path, results: &[ParseResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "sheets",
        "rows_scanned",
        "placement_lines",
        "placement_days",
        "total_insertions",
        "pieces",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(plan) = &result.plan {
            let summary = plan.summary();
            wtr.write_record([
                filename,
                "success",
                &plan.sheets.len().to_string(),
                &plan.total_rows.to_string(),
                &summary.placement_lines.to_string(),
                &summary.placement_days.to_string(),
                &summary.total_insertions.to_string(),
                &plan.pieces.len().to_string(),
                &plan.warnings().join("; "),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

//! Parse command - extract placements from a single media plan workbook.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use mplan_core::{
    CalamineReader, MediaPlan, MediaPlanParser, MplanConfig, OutputConfig, ParsedPlacementRow,
    PlanSummary, SheetDetection,
};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input workbook (xlsx, xlsm, xlsb, xls, ods)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Print plan totals to stderr
    #[arg(long)]
    summary: bool,

    /// Date used for the default year and month (YYYY-MM-DD, default: today)
    #[arg(long)]
    reference_date: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full plan as JSON
    Json,
    /// One line per placement day
    Csv,
    /// Detection report and placement list
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ParseArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Parsing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Reading {}...", args.input.display()));

    let parser = build_parser(&config, args.reference_date);
    let input = args.input.clone();
    let plan = tokio::task::spawn_blocking(move || parser.parse_path(&CalamineReader::new(), &input))
        .await??;

    pb.finish_and_clear();

    for warning in plan.warnings() {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output_config = OutputConfig {
        pretty_json: args.pretty || config.output.pretty_json,
        ..config.output.clone()
    };
    let output = format_plan(&plan, args.format, &output_config)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.summary {
        eprintln!();
        eprint!("{}", format_summary(&plan.summary()));
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Parser configured from the config file and an optional reference date.
pub fn build_parser(config: &MplanConfig, reference_date: Option<NaiveDate>) -> MediaPlanParser {
    let parser = MediaPlanParser::new().with_config(config.parser.clone());
    match reference_date {
        Some(date) => parser.with_reference_date(date),
        None => parser,
    }
}

/// Render a parsed plan in the requested format.
pub fn format_plan(
    plan: &MediaPlan,
    format: OutputFormat,
    options: &OutputConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if options.pretty_json => Ok(serde_json::to_string_pretty(plan)?),
        OutputFormat::Json => Ok(serde_json::to_string(plan)?),
        OutputFormat::Csv => format_csv(plan),
        OutputFormat::Text => Ok(format_text(plan, options.include_detection)),
    }
}

const CSV_HEADER: [&str; 16] = [
    "sheet",
    "row",
    "media_type",
    "media_channel",
    "market",
    "channel",
    "program",
    "property_text",
    "format_text",
    "duration_sec",
    "external_ref",
    "start_date",
    "end_date",
    "date",
    "insertions",
    "piece_codes",
];

fn format_csv(plan: &MediaPlan) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;

    for row in &plan.rows {
        if row.days.is_empty() {
            wtr.write_record(placement_record(row, None))?;
        }
        for day in &row.days {
            wtr.write_record(placement_record(row, Some(day)))?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn placement_record(row: &ParsedPlacementRow, day: Option<&(NaiveDate, u32)>) -> Vec<String> {
    let fields = &row.fields;
    vec![
        row.sheet.clone(),
        row.row.to_string(),
        row.media_type.to_string(),
        row.media_channel.to_string(),
        fields.market.clone(),
        fields.channel.clone(),
        fields.program.clone(),
        fields.property_text.clone(),
        fields.format_text.clone(),
        fields.duration_sec.map(|d| d.to_string()).unwrap_or_default(),
        fields.external_ref.clone(),
        format_datetime(fields.start_date),
        format_datetime(fields.end_date),
        day.map(|(date, _)| date.to_string()).unwrap_or_default(),
        day.map(|(_, n)| n.to_string()).unwrap_or_default(),
        row.piece_codes.join(" "),
    ]
}

fn format_datetime(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn format_text(plan: &MediaPlan, include_detection: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Sheets: {}\n", plan.sheets.len()));
    output.push_str(&format!("Rows scanned: {}\n", plan.total_rows));

    if include_detection {
        output.push_str("\nDetection:\n");
        for name in &plan.sheets {
            if let Some(detection) = plan.detection(name) {
                output.push_str(&format!("  {}\n", describe_detection(name, detection)));
            }
        }
    }

    output.push_str("\nPlacements:\n");
    for row in &plan.rows {
        let label = [&row.fields.market, &row.fields.channel, &row.fields.program]
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(" / ");
        output.push_str(&format!(
            "  {} R{}: {} ({} days, {} insertions)",
            row.sheet,
            row.row,
            label,
            row.days.len(),
            row.total_insertions()
        ));
        if !row.piece_codes.is_empty() {
            output.push_str(&format!(" [{}]", row.piece_codes.join(", ")));
        }
        output.push('\n');
    }

    if !plan.pieces.is_empty() {
        output.push_str("\nPieces:\n");
        for piece in &plan.pieces {
            let duration = piece
                .duration_sec
                .map(|d| format!("{}s", d))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!("  {}: {} ({})\n", piece.code, piece.title, duration));
        }
    }

    output.push('\n');
    output.push_str(&format_summary(&plan.summary()));

    output
}

pub fn describe_detection(name: &str, detection: &SheetDetection) -> String {
    let media = format!("{}/{}", detection.media_type, detection.media_channel);
    let Some(header_row) = detection.header_row else {
        return format!(
            "{} [{}]: {}",
            name,
            media,
            detection.error.as_deref().unwrap_or("not detected")
        );
    };

    let day_row = detection
        .day_row
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    let year = detection
        .year_hint
        .map(|y| y.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "{} [{}]: header row {}, day row {}, year {}, {} columns, {} date columns",
        name,
        media,
        header_row,
        day_row,
        year,
        detection.column_map.len(),
        detection.date_columns.len()
    );
    for warning in &detection.warnings {
        line.push_str(&format!("; {}", warning));
    }
    line
}

/// Totals block shared by the text output and `--summary`.
pub fn format_summary(summary: &PlanSummary) -> String {
    let mut output = String::new();

    output.push_str("Summary:\n");
    output.push_str(&format!("  Placement lines: {}\n", summary.placement_lines));
    output.push_str(&format!("  Placement days:  {}\n", summary.placement_days));
    output.push_str(&format!("  Insertions:      {}\n", summary.total_insertions));
    if !summary.piece_codes.is_empty() {
        output.push_str(&format!("  Piece codes:     {}\n", summary.piece_codes.join(", ")));
    }
    for (channel, lines) in &summary.lines_by_channel {
        output.push_str(&format!("  {:<16} {}\n", format!("{}:", channel), lines));
    }

    output
}

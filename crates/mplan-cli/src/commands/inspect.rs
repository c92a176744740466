//! Inspect command - dump the raw cells the detector sees.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use mplan_core::{CalamineReader, Cell, PlanParser, Sheet, Workbook, WorkbookReader};

use super::parse::{build_parser, describe_detection};

/// Longest cell value shown before truncation.
const MAX_VALUE_CHARS: usize = 35;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input workbook
    #[arg(required = true)]
    input: PathBuf,

    /// Number of rows to show per sheet
    #[arg(short, long, default_value = "30")]
    rows: usize,

    /// Also show what the detector found in each sheet
    #[arg(long)]
    detect: bool,
}

pub async fn run(args: InspectArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let input = args.input.clone();
    let workbook = tokio::task::spawn_blocking(move || CalamineReader::new().read_path(&input)).await??;

    print!("{}", format_workbook(&workbook, args.rows));

    if args.detect {
        let config = super::load_config(config_path)?;
        let plan = build_parser(&config, None).parse(&workbook);
        println!("{}", style("=== DETECTION ===").bold());
        for name in &plan.sheets {
            if let Some(detection) = plan.detection(name) {
                println!("  {}", describe_detection(name, detection));
            }
        }
    }

    Ok(())
}

fn format_workbook(workbook: &Workbook, rows: usize) -> String {
    let mut output = String::from("=== SHEETS ===\n");
    for sheet in workbook.sheets() {
        output.push_str(&format!("  - {}\n", sheet.name()));
    }
    output.push('\n');

    for sheet in workbook.sheets() {
        output.push_str(&format_sheet(sheet, rows));
        output.push('\n');
    }

    output
}

fn format_sheet(sheet: &Sheet, rows: usize) -> String {
    let mut output = format!("=== SHEET: {} ===\n", sheet.name());
    output.push_str(&format!(
        "Rows: {}, Cols: {}\n",
        sheet.max_row(),
        sheet.max_column()
    ));
    output.push_str(&format!("First {} rows:\n", rows));

    for row in 1..=sheet.max_row().min(rows) {
        let values: Vec<String> = sheet
            .row(row)
            .filter(|(_, cell)| !cell.is_blank())
            .map(|(column, cell)| format!("C{}:{}", column, truncate(cell)))
            .collect();
        if !values.is_empty() {
            output.push_str(&format!("  R{}: {}\n", row, values.join(", ")));
        }
    }

    output
}

fn truncate(cell: &Cell) -> String {
    cell.display_text().chars().take(MAX_VALUE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sheet() {
        let sheet = Sheet::new("TV")
            .with_row(1, ["Plano de mídia com um título bem comprido demais"])
            .with_row(3, ["Market", "Channel"])
            .with_cell(4, 3, 15.0);

        let text = format_sheet(&sheet, 3);

        assert!(text.starts_with("=== SHEET: TV ===\nRows: 4, Cols: 3\n"));
        assert!(text.contains("  R1: C1:Plano de mídia com um título bem co\n"));
        assert!(!text.contains("R2:"));
        assert!(text.contains("  R3: C1:Market, C2:Channel\n"));
        assert!(!text.contains("R4:"));
    }

    #[test]
    fn test_format_workbook_lists_sheets() {
        let workbook = Workbook::new()
            .with_sheet(Sheet::new("TV"))
            .with_sheet(Sheet::new("Notas"));

        let text = format_workbook(&workbook, 30);

        assert!(text.starts_with("=== SHEETS ===\n  - TV\n  - Notas\n"));
        assert!(text.contains("=== SHEET: Notas ===\nRows: 0, Cols: 0\n"));
    }
}

use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use bond_pricer_core::report::{self, CellMode, ReportRenderer};
use bond_pricer_core::types::ComputationOutput;

use crate::input;
use crate::output::report_csv::CsvReportWriter;

/// Arguments for pricing report generation
#[derive(Args)]
pub struct ReportArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Directory the sheet CSV files are written to
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Write cross-sheet formulas instead of computed values. The formulas
    /// only resolve once the sheets are loaded into a single workbook.
    #[arg(long)]
    pub formulas: bool,
}

impl ReportArgs {
    fn cell_mode(&self) -> CellMode {
        if self.formulas {
            CellMode::Formulas
        } else {
            CellMode::Values
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportWritten {
    pub directory: String,
    pub files: Vec<String>,
    pub sheets: Vec<String>,
}

pub fn run_report(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = input::read_request(args.input.as_deref(), "report")?;
    let generated = report::generate_report(&request)?;

    let files =
        CsvReportWriter::new(&args.out_dir, args.cell_mode()).render(&generated.result)?;

    let written = ReportWritten {
        directory: args.out_dir.display().to_string(),
        files: files.iter().map(|p| p.display().to_string()).collect(),
        sheets: generated.result.sheets.iter().map(|s| s.name.clone()).collect(),
    };
    let output = ComputationOutput {
        result: written,
        methodology: generated.methodology,
        assumptions: generated.assumptions,
        warnings: generated.warnings,
        metadata: generated.metadata,
    };
    Ok(serde_json::to_value(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        args: ReportArgs,
    }

    #[test]
    fn test_values_by_default() {
        let cli = Cli::parse_from(["bondpx", "--out-dir", "out"]);
        assert_eq!(cli.args.cell_mode(), CellMode::Values);
    }

    #[test]
    fn test_formulas_opt_in() {
        let cli = Cli::parse_from(["bondpx", "--out-dir", "out", "--formulas"]);
        assert_eq!(cli.args.cell_mode(), CellMode::Formulas);
    }
}

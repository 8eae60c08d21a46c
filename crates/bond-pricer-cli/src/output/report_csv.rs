//! Writes a pricing report as one CSV file per sheet.

use std::fs;
use std::path::{Path, PathBuf};

use bond_pricer_core::report::{a1, CellMode, Report, ReportRenderer, Sheet};
use bond_pricer_core::{PricerError, PricerResult};

pub struct CsvReportWriter {
    dir: PathBuf,
    mode: CellMode,
}

impl CsvReportWriter {
    pub fn new(dir: impl Into<PathBuf>, mode: CellMode) -> Self {
        Self {
            dir: dir.into(),
            mode,
        }
    }

    fn write_sheet(&self, sheet: &Sheet) -> PricerResult<PathBuf> {
        let path = self.dir.join(file_name(&sheet.name));
        let target = path.display().to_string();
        let fail = |reason: String| PricerError::ReportWrite {
            target: target.clone(),
            reason,
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(|e| fail(e.to_string()))?;
        wtr.write_record(&sheet.header)
            .map_err(|e| fail(e.to_string()))?;
        for row in &sheet.rows {
            let record: Vec<String> = row.iter().map(|c| a1::cell_text(c, self.mode)).collect();
            wtr.write_record(&record).map_err(|e| fail(e.to_string()))?;
        }
        wtr.flush().map_err(|e| fail(e.to_string()))?;

        tracing::debug!(sheet = %sheet.name, rows = sheet.rows.len(), path = %target, "sheet written");
        Ok(path)
    }
}

impl ReportRenderer for CsvReportWriter {
    type Output = Vec<PathBuf>;

    fn render(&self, report: &Report) -> PricerResult<Vec<PathBuf>> {
        ensure_dir(&self.dir)?;
        report.sheets.iter().map(|s| self.write_sheet(s)).collect()
    }
}

fn ensure_dir(dir: &Path) -> PricerResult<()> {
    fs::create_dir_all(dir).map_err(|e| PricerError::ReportWrite {
        target: dir.display().to_string(),
        reason: e.to_string(),
    })
}

/// `Cash Flow Table` → `cash_flow_table.csv`
fn file_name(sheet: &str) -> String {
    let stem: String = sheet
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bond_pricer_core::fixed_income::terms::PricingRequest;
    use bond_pricer_core::report::generate_report;

    fn request() -> PricingRequest {
        serde_json::from_value(serde_json::json!({
            "bond_type": "fixed",
            "issue_date": "2021-06-09",
            "maturity_date": "2024-06-09",
            "face_value": "100000",
            "coupon_rate": "10.5",
            "frequency": 1,
            "num_periods": 3,
            "bought_date": "2022-01-01",
            "sold_date": "2023-12-01",
            "client_type": "Individual",
            "product_type": "Outright",
            "discount_method": "Coupon"
        }))
        .unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_name("Cash Flow Table"), "cash_flow_table.csv");
        assert_eq!(file_name("PV Table"), "pv_table.csv");
    }

    #[test]
    fn test_writes_one_file_per_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let report = generate_report(&request()).unwrap().result;
        let writer = CsvReportWriter::new(dir.path().join("out"), CellMode::Formulas);

        let files = writer.render(&report).unwrap();
        assert_eq!(files.len(), 6);
        assert!(files.iter().all(|p| p.exists()));

        let pv = fs::read_to_string(dir.path().join("out").join("pv_table.csv")).unwrap();
        let mut lines = pv.lines();
        assert_eq!(lines.next().unwrap().split(',').count(), 7);
        assert!(lines.next().unwrap().contains("='Cash Flow Table'!A2"));
    }

    #[test]
    fn test_values_mode_has_no_formulas() {
        let dir = tempfile::tempdir().unwrap();
        let report = generate_report(&request()).unwrap().result;
        CsvReportWriter::new(dir.path(), CellMode::Values)
            .render(&report)
            .unwrap();

        let summary = fs::read_to_string(dir.path().join("investment_summary.csv")).unwrap();
        assert!(!summary.contains('='));
    }

    #[test]
    fn test_unwritable_target_reports_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let report = generate_report(&request()).unwrap().result;
        let err = CsvReportWriter::new(file.path().join("nested"), CellMode::Values)
            .render(&report)
            .unwrap_err();
        assert!(matches!(err, PricerError::ReportWrite { .. }));
    }
}

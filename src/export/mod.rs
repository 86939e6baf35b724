mod sheet;
mod xlsx;

pub use sheet::{build_report_sheet, ReportSheet, SheetRow, HEADERS, REPORT_FILE_NAME, SHEET_NAME};
pub use xlsx::write_report_xlsx;

use std::path::{Path, PathBuf};
use tracing::error;

use crate::error::Result;
use crate::report::EnrichedReportRow;

/// Export the full filtered result set to `SalaryReports.xlsx` in `output_dir`
pub fn export_report(rows: &[&EnrichedReportRow], output_dir: &Path) -> Result<PathBuf> {
    let sheet = build_report_sheet(rows)?;
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(REPORT_FILE_NAME);
    write_report_xlsx(&sheet, &path).inspect_err(|e| {
        error!(error = %e, "failed to export report");
    })?;
    Ok(path)
}

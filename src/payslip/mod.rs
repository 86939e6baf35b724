mod layout;
mod words;

pub use layout::{
    build_payslip, format_inr, group_indian, payslip_file_name, IdentityBlock, PayslipDocument,
    PayslipHeader, PayslipLine, PayslipTotals,
};
pub use words::to_words;

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::api::{decode, staff_detail_path, Backend};
use crate::error::{Result, SalaryGenError};
use crate::pdf::generate_payslip_pdf;
use crate::report::{EnrichedReportRow, StaffRecord};

/// Fetch the detail record of the staff member owning `row`
pub fn fetch_staff_detail(backend: &dyn Backend, row: &EnrichedReportRow) -> Result<StaffRecord> {
    let staff_id = row.staff_id().ok_or(SalaryGenError::MissingStaff)?;
    let path = staff_detail_path(staff_id.as_str())?;
    decode(&path, backend.get(&path)?)
}

/// Fetch the staff detail, lay out the payslip and write it into `output_dir`.
///
/// Nothing is written unless the fetch and layout succeed.
pub fn export_payslip(
    backend: &dyn Backend,
    row: &EnrichedReportRow,
    company: &str,
    logo: Option<&Path>,
    output_dir: &Path,
) -> Result<PathBuf> {
    let staff = fetch_staff_detail(backend, row).inspect_err(|e| {
        error!(error = %e, staff_id = ?row.staff_id(), "failed to fetch staff details");
    })?;

    let doc = build_payslip(row, &staff, company, logo.is_some());
    std::fs::create_dir_all(output_dir)?;
    let pdf_path = output_dir.join(&doc.file_name);

    generate_payslip_pdf(&doc, logo, &pdf_path).inspect_err(|e| {
        error!(error = %e, "failed to generate payslip");
    })?;

    info!(path = %pdf_path.display(), "payslip written");
    Ok(pdf_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::RecordingBackend;
    use crate::report::{enrich_row, SalaryTransaction, StaffDirectory};
    use serde_json::json;
    use tempfile::TempDir;

    fn row(value: serde_json::Value) -> EnrichedReportRow {
        let tx: SalaryTransaction = serde_json::from_value(value).unwrap();
        enrich_row(&tx, &StaffDirectory::default())
    }

    #[test]
    fn staff_detail_comes_from_the_rows_owner() {
        let backend = RecordingBackend::default()
            .with("/api/staff/4", json!({"id": 4, "department": "Maths"}));
        let staff = fetch_staff_detail(&backend, &row(json!({"staff": {"id": 4}}))).unwrap();
        assert_eq!(staff.department.as_deref(), Some("Maths"));
        assert_eq!(*backend.calls.borrow(), vec!["GET /api/staff/4".to_string()]);
    }

    #[test]
    fn failed_staff_fetch_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let backend = RecordingBackend::default();

        let err = export_payslip(
            &backend,
            &row(json!({"staffId": 4, "salaryMonth": "2025-03"})),
            "SalaryGen",
            None,
            &out,
        )
        .unwrap_err();

        assert!(matches!(err, SalaryGenError::Status { status: 404, .. }));
        assert!(!out.exists());
    }
}

use crate::error::{Result, SalaryGenError};
use crate::report::EnrichedReportRow;

pub const SHEET_NAME: &str = "Reports";
pub const REPORT_FILE_NAME: &str = "SalaryReports.xlsx";

pub const HEADERS: [&str; 7] = [
    "Employee Name",
    "Employee ID",
    "Salary Month",
    "Basic Salary",
    "Allowances",
    "Deductions",
    "Net Salary",
];

/// Column widths in characters, in header order
pub const COLUMN_WIDTHS: [u16; 7] = [25, 12, 15, 15, 15, 15, 15];

/// Columns holding rupee amounts
pub const MONEY_COLUMNS: std::ops::Range<usize> = 3..7;

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub employee_name: String,
    pub employee_id: String,
    pub salary_month: String,
    pub basic_salary: Option<f64>,
    pub allowances: f64,
    pub deductions: Option<f64>,
    pub net_salary: Option<f64>,
}

impl SheetRow {
    /// Amounts in header order, starting at "Basic Salary"
    pub fn amounts(&self) -> [Option<f64>; 4] {
        [
            self.basic_salary,
            Some(self.allowances),
            self.deductions,
            self.net_salary,
        ]
    }
}

/// The bulk report as it will be written to the workbook
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    pub rows: Vec<SheetRow>,
}

/// Lay out the whole filtered result set. An empty set is an error so that
/// no empty file is written.
pub fn build_report_sheet(rows: &[&EnrichedReportRow]) -> Result<ReportSheet> {
    if rows.is_empty() {
        return Err(SalaryGenError::NoReports);
    }

    let rows = rows
        .iter()
        .map(|row| {
            let tx = &row.transaction;
            SheetRow {
                employee_name: row.staff_name.clone(),
                employee_id: row.staff_id().map(|id| id.to_string()).unwrap_or_default(),
                salary_month: row.salary_month().to_string(),
                basic_salary: tx.basic_pay,
                allowances: tx.gross_salary.unwrap_or(0.0) - tx.basic_pay.unwrap_or(0.0),
                deductions: tx.total_deductions,
                net_salary: row.net_salary,
            }
        })
        .collect();

    Ok(ReportSheet { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{enrich, SalaryTransaction, StaffDirectory};
    use serde_json::json;

    #[test]
    fn empty_result_set_is_rejected() {
        let err = build_report_sheet(&[]).unwrap_err();
        assert_eq!(err.to_string(), "No reports to export");
    }

    #[test]
    fn allowances_are_gross_minus_basic() {
        let raw: Vec<SalaryTransaction> = vec![serde_json::from_value(json!({
            "id": 1,
            "staffId": 12,
            "staffName": "Irfan",
            "salaryMonth": "2025-04",
            "basicPay": 25000,
            "grossSalary": 31000,
            "totalDeductions": 1200,
            "amount": 29800
        }))
        .unwrap()];
        let rows = enrich(&raw, &StaffDirectory::default());
        let refs: Vec<&_> = rows.iter().collect();

        let sheet = build_report_sheet(&refs).unwrap();
        let row = &sheet.rows[0];
        assert_eq!(row.employee_name, "Irfan");
        assert_eq!(row.employee_id, "12");
        assert_eq!(row.allowances, 6000.0);
        assert_eq!(row.net_salary, Some(29800.0));
        assert_eq!(
            row.amounts(),
            [Some(25000.0), Some(6000.0), Some(1200.0), Some(29800.0)]
        );
    }
}

use serde::Serialize;

use super::words::to_words;
use crate::report::{is_deduction, EnrichedReportRow, StaffRecord};

const MISSING: &str = "-";

/// Group digits the Indian way: last three, then pairs (12,34,567)
pub fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Format an amount with Indian grouping and two decimals
pub fn format_inr(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_indian(&(cents / 100).to_string());
    let formatted = format!("{whole}.{:02}", cents % 100);
    if negative {
        format!("-{formatted}")
    } else {
        formatted
    }
}

fn money(amount: Option<f64>) -> String {
    amount.map(format_inr).unwrap_or_else(|| MISSING.to_string())
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayslipHeader {
    pub company: String,
    pub has_logo: bool,
    pub staff_name: String,
    pub salary_month: String,
    pub employee_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityBlock {
    pub department: String,
    pub joining_date: String,
    /// Relieved date, or `Working`
    pub relieved_date: String,
    pub bank_name: String,
    pub ifsc_code: String,
    pub account_number: String,
}

/// One row of the two-column earnings/deductions table; blank cells pad the
/// shorter column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayslipLine {
    pub earning: String,
    pub earning_amount: String,
    pub deduction: String,
    pub deduction_amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayslipTotals {
    pub gross: String,
    pub deductions: String,
    pub net: String,
}

/// Everything printed on a payslip, top to bottom
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayslipDocument {
    pub file_name: String,
    pub header: PayslipHeader,
    pub identity: IdentityBlock,
    pub lines: Vec<PayslipLine>,
    pub totals: PayslipTotals,
    pub amount_in_words: String,
    pub footer: Vec<String>,
}

/// `Payslip_<staffId>_<salaryMonth>.pdf`
pub fn payslip_file_name(row: &EnrichedReportRow) -> String {
    let staff = row
        .staff_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "Staff".to_string());
    let month = text_or(row.transaction.salary_month.as_deref(), "Month");
    format!(
        "Payslip_{}_{}.pdf",
        file_name_part(&staff),
        file_name_part(&month)
    )
}

/// Keep a server-provided value inside one path component
fn file_name_part(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect()
}

fn earnings_and_deductions(row: &EnrichedReportRow) -> Vec<PayslipLine> {
    let mut earnings: Vec<(String, String)> = Vec::new();
    let mut deductions: Vec<(String, String)> = Vec::new();

    if let Some(basic) = row.transaction.basic_pay {
        earnings.push(("Basic Salary".to_string(), format_inr(basic)));
    }
    for (name, amount) in row.transaction.components() {
        let entry = (name.to_string(), format_inr(amount));
        if is_deduction(name) {
            deductions.push(entry);
        } else {
            earnings.push(entry);
        }
    }

    let rows = earnings.len().max(deductions.len());
    let mut earnings = earnings.into_iter();
    let mut deductions = deductions.into_iter();
    (0..rows)
        .map(|_| {
            let (earning, earning_amount) = earnings.next().unwrap_or_default();
            let (deduction, deduction_amount) = deductions.next().unwrap_or_default();
            PayslipLine {
                earning,
                earning_amount,
                deduction,
                deduction_amount,
            }
        })
        .collect()
}

/// Lay out the payslip for `row` using the staff member's detail record
pub fn build_payslip(
    row: &EnrichedReportRow,
    staff: &StaffRecord,
    company: &str,
    has_logo: bool,
) -> PayslipDocument {
    let tx = &row.transaction;
    let details = staff.salary_details.clone().unwrap_or_default();
    let net_whole = row.net_salary.unwrap_or(0.0).max(0.0).round() as u64;

    PayslipDocument {
        file_name: payslip_file_name(row),
        header: PayslipHeader {
            company: company.to_string(),
            has_logo,
            staff_name: row.staff_name.clone(),
            salary_month: text_or(tx.salary_month.as_deref(), MISSING),
            employee_number: row
                .staff_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| MISSING.to_string()),
        },
        identity: IdentityBlock {
            department: text_or(staff.department.as_deref(), MISSING),
            joining_date: text_or(staff.joining_date.as_deref(), MISSING),
            relieved_date: text_or(staff.relieved_date.as_deref(), "Working"),
            bank_name: text_or(details.bank_name.as_deref(), MISSING),
            ifsc_code: text_or(details.ifsc_code.as_deref(), MISSING),
            account_number: text_or(details.bank_account_number.as_deref(), MISSING),
        },
        lines: earnings_and_deductions(row),
        totals: PayslipTotals {
            gross: money(tx.gross_salary),
            deductions: money(tx.total_deductions),
            net: money(row.net_salary),
        },
        amount_in_words: to_words(net_whole),
        footer: vec![
            "This is a system-generated payslip and does not require a signature.".to_string(),
            format!("Generated by {company}"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{enrich_row, SalaryTransaction, StaffDirectory};
    use serde_json::json;

    fn row(value: serde_json::Value) -> EnrichedReportRow {
        let tx: SalaryTransaction = serde_json::from_value(value).unwrap();
        enrich_row(&tx, &StaffDirectory::default())
    }

    #[test]
    fn indian_grouping_of_amounts() {
        assert_eq!(group_indian("999"), "999");
        assert_eq!(group_indian("1000"), "1,000");
        assert_eq!(group_indian("1234567"), "12,34,567");
        assert_eq!(group_indian("123456789"), "12,34,56,789");
        assert_eq!(format_inr(1234567.5), "12,34,567.50");
        assert_eq!(format_inr(0.0), "0.00");
        assert_eq!(format_inr(-1500.0), "-1,500.00");
    }

    #[test]
    fn file_name_uses_staff_and_month() {
        assert_eq!(
            payslip_file_name(&row(json!({"staffId": 4, "salaryMonth": "2025-03"}))),
            "Payslip_4_2025-03.pdf"
        );
        assert_eq!(payslip_file_name(&row(json!({}))), "Payslip_Staff_Month.pdf");
    }

    #[test]
    fn file_name_stays_inside_the_output_dir() {
        let name = payslip_file_name(&row(json!({"staffId": 4, "salaryMonth": "../../evil"})));
        assert_eq!(name, "Payslip_4_..-..-evil.pdf");
        let out = std::path::Path::new("/out");
        assert_eq!(out.join(&name).parent(), Some(out));

        let label = payslip_file_name(&row(json!({"staffId": "a\\b", "salaryMonth": "03/2025"})));
        assert_eq!(label, "Payslip_a-b_03-2025.pdf");
    }

    #[test]
    fn breakdown_splits_into_two_columns() {
        let r = row(json!({
            "staffId": 4,
            "staffName": "Nisha",
            "salaryMonth": "2025-03",
            "basicPay": 30000,
            "grossSalary": 42000,
            "totalDeductions": 2000,
            "netSalary": 40000,
            "componentBreakdown": {"HRA": 8000, "pf": 1800, "DA": 4000, "PT": 200}
        }));
        let staff: StaffRecord = serde_json::from_value(json!({
            "id": 4,
            "department": "Physics",
            "joiningDate": "2021-06-01",
            "salaryDetails": {"bankName": "Canara", "ifscCode": "CNRB0001", "bankAccountNumber": "998877"}
        }))
        .unwrap();

        let doc = build_payslip(&r, &staff, "SalaryGen", false);

        let earnings: Vec<&str> = doc.lines.iter().map(|l| l.earning.as_str()).collect();
        let deductions: Vec<&str> = doc.lines.iter().map(|l| l.deduction.as_str()).collect();
        assert_eq!(earnings, vec!["Basic Salary", "HRA", "DA"]);
        assert_eq!(deductions, vec!["pf", "PT", ""]);
        assert_eq!(doc.lines[0].earning_amount, "30,000.00");
        assert_eq!(doc.lines[2].deduction_amount, "");

        assert_eq!(doc.header.staff_name, "Nisha");
        assert_eq!(doc.header.employee_number, "4");
        assert_eq!(doc.identity.relieved_date, "Working");
        assert_eq!(doc.identity.account_number, "998877");
        assert_eq!(doc.totals.net, "40,000.00");
        assert_eq!(doc.amount_in_words, "Forty Thousand Rupees Only /-");
        assert_eq!(doc.footer[1], "Generated by SalaryGen");
    }

    #[test]
    fn missing_details_render_as_dashes() {
        let r = row(json!({"staffId": 9}));
        let doc = build_payslip(&r, &StaffRecord::default(), "Acme", true);
        assert!(doc.header.has_logo);
        assert_eq!(doc.identity.department, "-");
        assert_eq!(doc.identity.bank_name, "-");
        assert_eq!(doc.totals.gross, "-");
        assert!(doc.lines.is_empty());
        assert_eq!(doc.amount_in_words, "Zero Rupees Only /-");
    }
}

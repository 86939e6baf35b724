use serde_json::Value;
use std::collections::HashMap;

use super::model::{EmploymentStatus, EnrichedReportRow, SalaryTransaction, StaffRecord};

/// Keys whose presence says whether a staff member has been relieved.
/// The backend has shipped both spellings.
const RELIEVED_KEYS: [&str; 8] = [
    "relieved",
    "relievedDate",
    "relievedAt",
    "relievedOn",
    "relived",
    "relivedDate",
    "relivedAt",
    "relivedOn",
];

/// Staff records indexed by id
#[derive(Debug, Default, Clone)]
pub struct StaffDirectory {
    by_id: HashMap<String, StaffRecord>,
}

impl StaffDirectory {
    pub fn new(records: Vec<StaffRecord>) -> Self {
        let by_id = records
            .into_iter()
            .filter_map(|record| record.id.clone().map(|id| (id.to_string(), record)))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&StaffRecord> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Name of the staff member owning `tx`. Never empty.
pub fn resolve_staff_name(tx: &SalaryTransaction, directory: &StaffDirectory) -> String {
    if let Some(name) = non_blank(tx.staff_name.as_deref())
        .or_else(|| non_blank(tx.employee_name.as_deref()))
        .or_else(|| non_blank(tx.nested_staff_name()))
    {
        return name.to_string();
    }

    let owner = tx.owner_id();
    if let Some(name) = owner
        .as_ref()
        .and_then(|id| directory.get(id.as_str()))
        .and_then(StaffRecord::display_name)
    {
        return name;
    }

    match owner {
        Some(id) => format!("({id})"),
        None => "(unknown)".to_string(),
    }
}

/// Classify a free-text status. `None` for blank input.
pub fn classify_status(raw: &str) -> Option<EmploymentStatus> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_lowercase();
    let status = if lower.contains("reliev")
        || lower.contains("resign")
        || lower == "left"
        || lower == "inactive"
    {
        EmploymentStatus::Relieved
    } else if matches!(lower.as_str(), "active" | "working" | "employed") {
        EmploymentStatus::Active
    } else {
        EmploymentStatus::Other(capitalize(trimmed))
    };
    Some(status)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Employment status of the staff member owning `tx`. Falls through to
/// `Unknown` rather than failing.
pub fn resolve_status(tx: &SalaryTransaction) -> EmploymentStatus {
    if let Some(status) = tx.status.as_ref().and_then(Value::as_str).and_then(classify_status) {
        return status;
    }

    // Mixed spellings happen; any set key wins over present-but-empty ones
    let mut present = RELIEVED_KEYS
        .iter()
        .filter_map(|key| tx.extra.get(*key))
        .peekable();
    if present.peek().is_some() {
        return if present.any(relieved_value_is_set) {
            EmploymentStatus::Relieved
        } else {
            EmploymentStatus::Active
        };
    }

    match tx.active.as_ref().and_then(Value::as_bool) {
        Some(true) => EmploymentStatus::Active,
        Some(false) => EmploymentStatus::Relieved,
        None => EmploymentStatus::Unknown,
    }
}

fn relieved_value_is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Bool(b) => *b,
        _ => true,
    }
}

/// Employment status of a directory record
pub fn staff_status(staff: &StaffRecord) -> EmploymentStatus {
    if let Some(status) = staff
        .status
        .as_ref()
        .and_then(Value::as_str)
        .and_then(classify_status)
    {
        return status;
    }
    if non_blank(staff.relieved_date.as_deref()).is_some() {
        EmploymentStatus::Relieved
    } else {
        EmploymentStatus::Active
    }
}

/// Explicit `netSalary`, else `amount`, else gross minus deductions
pub fn resolve_net_salary(tx: &SalaryTransaction) -> Option<f64> {
    tx.net_salary.or(tx.amount).or_else(|| {
        tx.gross_salary
            .zip(tx.total_deductions)
            .map(|(gross, deductions)| gross - deductions)
    })
}

pub fn enrich_row(tx: &SalaryTransaction, directory: &StaffDirectory) -> EnrichedReportRow {
    EnrichedReportRow {
        staff_name: resolve_staff_name(tx, directory),
        status: resolve_status(tx),
        net_salary: resolve_net_salary(tx),
        transaction: tx.clone(),
    }
}

/// Enrich every row against the directory
pub fn enrich(rows: &[SalaryTransaction], directory: &StaffDirectory) -> Vec<EnrichedReportRow> {
    rows.iter().map(|tx| enrich_row(tx, directory)).collect()
}
